//! crates/kinderplan_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like file storage or
//! generative-AI APIs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::AgeGroup;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., the
/// filesystem or the generative backend).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Storage backend error: {0}")]
    Storage(String),
    #[error("Invalid backup: {0}")]
    InvalidBackup(String),
    #[error("Activity generation failed: {0}")]
    Generation(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Port
//=========================================================================================

/// Durable key-value storage: one JSON string per named slot.
///
/// Models the browser `localStorage` the planner was designed around. The
/// store and the suggestion cache are built on top of this; tests inject an
/// in-memory implementation instead of touching real storage.
///
/// The system assumes a single active writer; implementations only need to
/// serialize individual reads and writes, not coordinate across processes.
pub trait StorageBackend: Send + Sync {
    /// Returns the raw value stored in `slot`, or `None` if the slot is absent.
    fn read(&self, slot: &str) -> PortResult<Option<String>>;

    /// Writes `value` into `slot`, replacing any previous value.
    fn write(&self, slot: &str, value: &str) -> PortResult<()>;

    /// Removes `slot` entirely. Removing an absent slot is not an error.
    fn remove(&self, slot: &str) -> PortResult<()>;
}

//=========================================================================================
// Suggestion Generator Port
//=========================================================================================

/// The parameters of one suggestion request.
#[derive(Debug, Clone)]
pub struct SuggestionRequest {
    pub age_group: AgeGroup,
    pub theme: String,
    /// Free-text materials the educator already has on hand.
    pub materials: String,
}

/// One activity-shaped item as returned by the generative backend, before
/// the suggestion service mints ids and stamps the age group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedActivity {
    pub title: String,
    pub objective: String,
    pub description: String,
    pub materials: String,
    /// Free-form category label; parsed leniently downstream.
    #[serde(rename = "type")]
    pub type_label: String,
}

/// The opaque remote generative capability.
///
/// Implementations may fail however they like; the suggestion service
/// absorbs every error and falls through to the offline tier.
#[async_trait]
pub trait ActivityGenerator: Send + Sync {
    async fn generate(&self, request: &SuggestionRequest) -> PortResult<Vec<GeneratedActivity>>;
}
