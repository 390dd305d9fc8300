//! services/agent/src/config.rs
//!
//! Defines the agent's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// Base URL of the document store. Without it only the local cache is used.
    pub firebase_db_url: Option<String>,
    pub local_cache_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub trivia_model: String,
    pub image_model: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Storage Settings ---
        let firebase_db_url = lookup("FIREBASE_DB_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        let local_cache_url = lookup("LOCAL_CACHE_URL")
            .unwrap_or_else(|| "sqlite://velotrivia_cache.db?mode=rwc".to_string());
        if !local_cache_url.starts_with("sqlite:") {
            return Err(ConfigError::InvalidValue(
                "LOCAL_CACHE_URL".to_string(),
                format!("'{}' is not an sqlite URL", local_cache_url),
            ));
        }

        // --- Generator Settings (the key is optional, calls fail upstream without it) ---
        let gemini_api_key = lookup("GEMINI_API_KEY").or_else(|| lookup("API_KEY"));
        let gemini_api_base = lookup("GEMINI_API_BASE")
            .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        let trivia_model =
            lookup("TRIVIA_MODEL").unwrap_or_else(|| "gemini-3-flash-preview".to_string());
        let image_model =
            lookup("IMAGE_MODEL").unwrap_or_else(|| "gemini-2.5-flash-image".to_string());

        Ok(Self {
            bind_address,
            log_level,
            firebase_db_url,
            local_cache_url,
            gemini_api_key,
            gemini_api_base,
            trivia_model,
            image_model,
        })
    }
}
