//! Configuration management for the review roster
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (ROSTER_*)
//! 3. Config file (~/.config/roster/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Database-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path to the SQLite database file
    pub path: PathBuf,

    /// Maximum number of pooled connections
    pub max_connections: u32,

    /// How long a transaction waits for the write lock
    #[serde(with = "humantime_serde")]
    pub busy_timeout: Duration,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("roster")
                .join("roster.db"),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Engine behaviour
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deadline applied to every operation; `None` means no deadline
    #[serde(with = "humantime_serde")]
    pub operation_timeout: Option<Duration>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseSettings,
    pub engine: EngineConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&contents).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/roster/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("roster").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - ROSTER_DATABASE_PATH: SQLite file
    /// - ROSTER_MAX_CONNECTIONS: pool size
    /// - ROSTER_BUSY_TIMEOUT: write-lock wait, e.g. "5s"
    /// - ROSTER_OPERATION_TIMEOUT: per-operation deadline, e.g. "10s"
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(path) = var("ROSTER_DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = var("ROSTER_MAX_CONNECTIONS") {
            self.database.max_connections = max.parse().map_err(|e| {
                Error::Config(format!("ROSTER_MAX_CONNECTIONS must be a number: {}", e))
            })?;
        }

        if let Some(timeout) = var("ROSTER_BUSY_TIMEOUT") {
            self.database.busy_timeout = parse_duration("ROSTER_BUSY_TIMEOUT", &timeout)?;
        }

        if let Some(timeout) = var("ROSTER_OPERATION_TIMEOUT") {
            self.engine.operation_timeout =
                Some(parse_duration("ROSTER_OPERATION_TIMEOUT", &timeout)?);
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        database_path: Option<PathBuf>,
        operation_timeout: Option<Duration>,
    ) -> Self {
        if let Some(path) = database_path {
            self.database.path = path;
        }

        if let Some(timeout) = operation_timeout {
            self.engine.operation_timeout = Some(timeout);
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        database_path: Option<PathBuf>,
        operation_timeout: Option<Duration>,
    ) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()?
            .with_cli_overrides(database_path, operation_timeout))
    }
}

/// Parse a humantime duration such as "250ms" or "1m 30s"
pub fn parse_duration(name: &str, value: &str) -> Result<Duration> {
    humantime_serde::re::humantime::parse_duration(value)
        .map_err(|e| Error::Config(format!("{} is not a duration: {}", name, e)))
}
