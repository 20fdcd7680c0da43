//! services/api/src/lib.rs
//!
//! The library half of the `api` service: configuration, the storage and
//! LLM adapters, and the axum web layer. The `api` binary wires these
//! together at startup.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
