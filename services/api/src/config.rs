//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Directory holding the storage slot files.
    pub data_dir: PathBuf,
    pub log_level: Level,
    /// Optional: without it the suggestion service never attempts the
    /// remote tier and runs on cache + offline templates only.
    pub openai_api_key: Option<String>,
    pub suggest_model: String,
    /// Forces the suggestion service to skip the remote tier entirely,
    /// e.g. for air-gapped deployments.
    pub offline_mode: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Storage Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load API Key (as optional) ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        // --- Load Suggestion Settings ---
        let suggest_model =
            std::env::var("SUGGEST_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let offline_mode = match std::env::var("OFFLINE_MODE") {
            Ok(raw) => raw.parse::<bool>().map_err(|_| {
                ConfigError::InvalidValue(
                    "OFFLINE_MODE".to_string(),
                    format!("'{}' is not a boolean", raw),
                )
            })?,
            Err(_) => false,
        };

        Ok(Config {
            bind_address,
            data_dir,
            log_level,
            openai_api_key,
            suggest_model,
            offline_mode,
        })
    }
}
