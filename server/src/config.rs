use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use database::StoreOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const DEFAULTS: &str = include_str!("../config/default.toml");

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    /// Optional database URL. If not provided, a per-user data path is used
    pub url: Option<String>,
    /// Maximum number of database connections in the pool
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub connection_timeout: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (pretty, json, compact)
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
    Compact,
}

impl Config {
    /// Load configuration from the embedded defaults, `CONFIG_FILE` if set,
    /// and environment variables
    pub fn from_env() -> Result<Self> {
        let config_file = env::var("CONFIG_FILE").ok();
        Self::load(config_file.as_deref(), false)
    }

    /// Load configuration with a specific file layered over the defaults.
    /// The file must exist.
    pub fn from_file(path: &str) -> Result<Self> {
        Self::load(Some(path), true)
    }

    fn load(config_file: Option<&str>, required: bool) -> Result<Self> {
        let mut builder =
            ConfigBuilder::builder().add_source(File::from_str(DEFAULTS, FileFormat::Toml));

        if let Some(path) = config_file {
            builder = builder.add_source(
                File::with_name(path)
                    .required(required)
                    .format(FileFormat::Toml),
            );
        }

        // TRACKER_DATABASE__MAX_CONNECTIONS=10 sets database.max_connections
        builder = builder.add_source(
            Environment::with_prefix("TRACKER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut result: Config = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Self::apply_standard_env_vars(&mut result);
        Ok(result)
    }

    /// Apply standard environment variables (DATABASE_URL, LOG_LEVEL)
    fn apply_standard_env_vars(config: &mut Config) {
        if let Ok(database_url) = env::var("DATABASE_URL") {
            config.database.url = Some(database_url);
        }

        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.logging.level = log_level;
        }
    }

    /// Get the database URL with the per-user default as fallback
    pub fn database_url(&self) -> String {
        match &self.database.url {
            Some(url) => url.clone(),
            None => Self::default_database_url(),
        }
    }

    pub fn default_database_url() -> String {
        if let Ok(xdg_data) = env::var("XDG_DATA_HOME") {
            return format!("sqlite://{xdg_data}/tracker/tracker.sqlite");
        }

        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        format!("sqlite://{home}/.local/share/tracker/tracker.sqlite")
    }

    /// Pool settings for the store
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            max_connections: self.database.max_connections,
            connection_timeout: Duration::from_secs(self.database.connection_timeout),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(anyhow::anyhow!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                ));
            }
        }

        let database_url = self.database_url();
        if !database_url.starts_with("sqlite://") {
            return Err(anyhow::anyhow!(
                "Only SQLite databases are supported. URL must start with 'sqlite://'. Got: {}",
                database_url
            ));
        }

        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!(
                "Database max_connections must be greater than 0"
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
            },
            logging: LoggingConfig {
                level: "warn".to_string(),
                format: LogFormat::Compact,
            },
        }
    }
}
