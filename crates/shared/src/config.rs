//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// File name of the persisted session inside the data directory.
const TOKEN_FILE: &str = "session.json";

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Remote backend configuration.
    #[serde(default)]
    pub api: ApiConfig,
    /// Local storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Remote backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the budget backend, without a trailing `/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Local storage configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Overrides where the bearer token is persisted.
    pub token_path: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolves the token file: the configured override, else the platform
    /// data directory.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if no home directory can be determined.
    pub fn resolve_token_path(&self) -> AppResult<PathBuf> {
        if let Some(path) = &self.token_path {
            return Ok(path.clone());
        }
        directories::ProjectDirs::from("", "", "budgetly")
            .map(|dirs| dirs.data_dir().join(TOKEN_FILE))
            .ok_or_else(|| AppError::Config("could not determine a data directory".to_string()))
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("BUDGETLY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
