//! Configuration management for the intake client
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with POS__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Inventory REST API configuration
    pub api: ApiConfig,

    /// Intake defaults
    #[serde(default)]
    pub intake: IntakeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the POS REST API, e.g. https://pos.example.com/api/v1
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Bearer token for the signed-in shop user
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct IntakeConfig {
    /// Shop owner whose vendors are offered
    #[serde(default)]
    pub owner_id: Option<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("POS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("api.base_url", "http://localhost:8080/api/v1")?
            .set_default("api.timeout_secs", 30)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (POS__API__BASE_URL, ...)
            .add_source(
                Environment::with_prefix("POS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
