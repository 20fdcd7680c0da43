//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use kinderplan_core::store::PlannerStore;
use kinderplan_core::suggest::SuggestionService;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PlannerStore>,
    pub suggestions: Arc<SuggestionService>,
    pub config: Arc<Config>,
}
