use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat, Map};
use database::ConnectionSettings;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");
const PRODUCTION_CONFIG: &str = include_str!("../config/production.toml");

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Config {
    pub environment: Profile,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// SQLite URL (`sqlite://path` or `sqlite::memory:`)
    pub url: String,
    /// Reconnect attempts made when the connection is found dead
    pub reconnect_attempts: u32,
    /// Pause between reconnect attempts in milliseconds
    pub reconnect_delay_ms: u64,
    /// How long SQLite waits on a locked database in milliseconds
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address for the HTTP server
    pub listen_addr: String,
    /// Port number to listen on
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Application log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log level of the storage layer
    pub db_level: String,
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

/// Deployment profile selected through `APP_ENV`
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Development,
    Production,
}

impl Profile {
    /// `production` selects the production overlay, anything else is development
    pub fn from_app_env(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("production") => Profile::Production,
            _ => Profile::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Development => "development",
            Profile::Production => "production",
        }
    }
}

/// Builds a [`Config`] out of the layered sources.
///
/// Layers, lowest priority first: embedded defaults, the production overlay,
/// an optional config file and `TASKS_`-prefixed environment variables
/// (`TASKS_SERVER__PORT=9000`).
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    profile: Profile,
    config_file: Option<PathBuf>,
    env_source: Option<Map<String, String>>,
}

impl ConfigLoader {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    /// Loader for the profile named by `APP_ENV`
    pub fn from_env() -> Self {
        Self::new(Profile::from_app_env(env::var("APP_ENV").ok().as_deref()))
    }

    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Read `TASKS_` variables from this map instead of the process environment
    pub fn with_env_source(mut self, source: Map<String, String>) -> Self {
        self.env_source = Some(source);
        self
    }

    pub fn load(self) -> Result<Config> {
        let mut builder = ConfigBuilder::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if self.profile == Profile::Production {
            builder = builder.add_source(File::from_str(PRODUCTION_CONFIG, FileFormat::Toml));
        }

        if let Some(path) = &self.config_file {
            builder = builder.add_source(
                File::with_name(&path.to_string_lossy())
                    .format(FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder
            .add_source(
                Environment::with_prefix("TASKS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(self.env_source),
            )
            .set_override("environment", self.profile.as_str())
            .context("Failed to set environment profile")?;

        let config = builder
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

/// Values given on the command line; each one replaces the loaded value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database_url: Option<String>,
    pub listen_addr: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration for the `APP_ENV` profile, optionally layering a
    /// config file, then apply `DATABASE_URL`, `LISTEN_ADDR` and `LOG_LEVEL`.
    pub fn from_env(config_file: Option<&str>) -> Result<Self> {
        let mut loader = ConfigLoader::from_env();
        if let Some(path) = config_file {
            loader = loader.with_config_file(path);
        }

        let mut config = loader.load()?;
        config.apply_standard_env_vars(|key| env::var(key).ok());
        Ok(config)
    }

    /// Apply standard environment variables (DATABASE_URL, LISTEN_ADDR, LOG_LEVEL)
    pub fn apply_standard_env_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(database_url) = lookup("DATABASE_URL") {
            self.database.url = database_url;
        }

        if let Some(listen_addr) = lookup("LISTEN_ADDR") {
            self.server.listen_addr = listen_addr;
        }

        if let Some(log_level) = lookup("LOG_LEVEL") {
            self.logging.level = log_level;
        }
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(database_url) = &overrides.database_url {
            self.database.url = database_url.clone();
        }

        if let Some(listen_addr) = &overrides.listen_addr {
            self.server.listen_addr = listen_addr.clone();
        }

        if let Some(port) = overrides.port {
            self.server.port = port;
        }

        if let Some(log_level) = &overrides.log_level {
            self.logging.level = log_level.clone();
        }
    }

    /// Get the server socket address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.listen_addr, self.server.port)
    }

    /// Connection parameters for the database crate
    pub fn to_connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings::new(self.database.url.clone())
            .with_reconnect_attempts(self.database.reconnect_attempts)
            .with_reconnect_delay(Duration::from_millis(self.database.reconnect_delay_ms))
            .with_busy_timeout(Duration::from_millis(self.database.busy_timeout_ms))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_level("log level", &self.logging.level)?;
        validate_level("database log level", &self.logging.db_level)?;

        if !self.database.url.starts_with("sqlite:") {
            return Err(anyhow::anyhow!(
                "Only SQLite databases are supported. URL must start with 'sqlite:'. Got: {}",
                self.database.url
            ));
        }

        if self.database.reconnect_attempts == 0 {
            return Err(anyhow::anyhow!(
                "Database reconnect_attempts must be greater than 0"
            ));
        }

        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        Ok(())
    }
}

fn validate_level(name: &str, level: &str) -> Result<()> {
    if LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "Invalid {name}: {level}. Must be one of: {}",
            LOG_LEVELS.join(", ")
        ))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Profile::Development,
            database: DatabaseConfig {
                url: "sqlite://tasks.db".to_string(),
                reconnect_attempts: 3,
                reconnect_delay_ms: 100,
                busy_timeout_ms: 5000,
            },
            server: ServerConfig {
                listen_addr: "127.0.0.1".to_string(),
                port: 8000,
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                db_level: "debug".to_string(),
                format: LogFormat::Pretty,
            },
        }
    }
}
