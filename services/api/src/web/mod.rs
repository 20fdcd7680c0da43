pub mod rest;
pub mod state;

// Re-export the OpenAPI definition so the `openapi` binary can dump it
// without reaching into the handler module.
pub use rest::ApiDoc;
