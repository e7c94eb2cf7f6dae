//! API configuration

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Prefix of environment overrides, e.g. `SENSOR_API_PORT`
pub const ENV_PREFIX: &str = "SENSOR_API";

/// Optional config file, relative to the working directory
pub const CONFIG_FILE: &str = "config/api";

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Explicit store path. Overrides `SENSOR_DB_PATH` when set.
    pub database_path: Option<PathBuf>,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            database_path: None,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:5500".to_string(),
                "http://localhost:8000".to_string(),
                "null".to_string(),
            ],
            log_level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Load defaults, then `config/api.{toml,yaml,json}` if present, then
    /// `SENSOR_API_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Same as [`ApiConfig::load`] with a custom config file base name
    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("cors_origins", defaults.cors_origins)?
            .set_default("log_level", defaults.log_level)?
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_origins"),
            )
            .build()?
            .try_deserialize()
    }

    /// `host:port` string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
