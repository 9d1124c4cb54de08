//! Application settings and configuration structures.

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::events::PublishStrategy;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// Notification dispatch configuration
    pub events: EventSettings,

    /// File storage configuration
    pub storage: StorageSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,
}

/// Notification dispatch configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EventSettings {
    /// Strategy used by `publish` calls that do not pick one explicitly.
    /// An unrecognized tag fails configuration loading with the offending
    /// name rather than falling back to a default.
    pub default_strategy: PublishStrategy,
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Root directory uploaded files are stored under
    pub root: PathBuf,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("database.url", "postgres://localhost:5432/modulith")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("events.default_strategy", "sequential_continue_on_error")?
            .set_default("storage.root", "storage")?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__EVENTS__DEFAULT_STRATEGY=concurrent_wait_all -> events.default_strategy
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("storage.root", std::env::var("STORAGE_ROOT").ok())?
            .build()?
            .try_deserialize()
    }
}
