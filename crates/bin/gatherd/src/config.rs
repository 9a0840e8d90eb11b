//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `gather.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database settings.
    pub database: DatabaseConfig,
    /// Lifecycle scanner settings.
    pub scanner: ScannerConfig,
    /// Notification bus settings.
    pub bus: BusConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Scanner cadence.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Milliseconds between two scans.
    pub interval_ms: u64,
}

/// Notification bus sizing.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Notifications buffered per subscriber before it lags.
    pub capacity: usize,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `gather.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("gather.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("GATHER_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("GATHER_SCAN_INTERVAL_MS")
            && let Ok(ms) = val.parse()
        {
            self.scanner.interval_ms = ms;
        }
        if let Ok(val) = std::env::var("GATHER_BUS_CAPACITY")
            && let Ok(capacity) = val.parse()
        {
            self.bus.capacity = capacity;
        }
        if let Ok(val) = std::env::var("GATHER_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scanner.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "scanner interval must be non-zero".to_string(),
            ));
        }
        if self.bus.capacity == 0 {
            return Err(ConfigError::Validation(
                "bus capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Time between two scans.
    #[must_use]
    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scanner.interval_ms)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:gather.db?mode=rwc".to_string(),
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "gatherd=info,gather=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
