//! Application settings and configuration management

use crate::error::{AppError, Result};
use crate::profile::Profile;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub retry: RetryConfig,
    pub limits: LimitsConfig,
    pub logging: LoggingConfig,
    /// Profiles every new session starts with
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    600
}

/// Per-call timeouts for outbound provider traffic
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_generation_timeout() -> u64 {
    120
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_fetch_timeout() -> u64 {
    10
}

impl HttpConfig {
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Retry policy for generation calls
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Attempt k waits k of these before the next try
    #[serde(default = "default_backoff_unit")]
    pub backoff_unit_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_unit() -> u64 {
    2000
}

/// Session store bounds and request limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    #[serde(default = "default_max_favorites")]
    pub max_favorites: usize,
    #[serde(default = "default_max_batch")]
    pub max_batch: u32,
    #[serde(default = "default_min_dimension")]
    pub min_dimension: u32,
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

fn default_max_history() -> usize {
    15
}

fn default_max_favorites() -> usize {
    30
}

fn default_max_batch() -> u32 {
    4
}

fn default_min_dimension() -> u32 {
    256
}

fn default_max_dimension() -> u32 {
    2048
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            generation_timeout_secs: default_generation_timeout(),
            probe_timeout_secs: default_probe_timeout(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_unit_ms: default_backoff_unit(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            max_favorites: default_max_favorites(),
            max_batch: default_max_batch(),
            min_dimension: default_min_dimension(),
            max_dimension: default_max_dimension(),
        }
    }
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("server.request_timeout_secs", default_request_timeout() as i64)?
            .set_default("http.generation_timeout_secs", default_generation_timeout() as i64)?
            .set_default("http.probe_timeout_secs", default_probe_timeout() as i64)?
            .set_default("http.fetch_timeout_secs", default_fetch_timeout() as i64)?
            .set_default("retry.max_attempts", default_max_attempts() as i64)?
            .set_default("retry.backoff_unit_ms", default_backoff_unit() as i64)?
            .set_default("limits.max_history", default_max_history() as i64)?
            .set_default("limits.max_favorites", default_max_favorites() as i64)?
            .set_default("limits.max_batch", default_max_batch() as i64)?
            .set_default("limits.min_dimension", default_min_dimension() as i64)?
            .set_default("limits.max_dimension", default_max_dimension() as i64)?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            // Load from configuration file
            .add_source(File::with_name(path.as_ref().to_str().unwrap_or("config/default")).required(false))
            // Override with environment variables (IMAGEGEN__SECTION__KEY)
            .add_source(
                Environment::with_prefix("IMAGEGEN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(invalid("Server port cannot be 0"));
        }

        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts must be at least 1"));
        }

        let limits = &self.limits;
        if limits.max_history == 0 || limits.max_favorites == 0 || limits.max_batch == 0 {
            return Err(invalid("history, favorites and batch limits must be positive"));
        }
        if limits.min_dimension == 0 || limits.min_dimension > limits.max_dimension {
            return Err(invalid(format!(
                "Invalid dimension range {}..={}",
                limits.min_dimension, limits.max_dimension
            )));
        }

        let mut seen = HashSet::new();
        for profile in &self.profiles {
            if profile.name.trim().is_empty() {
                return Err(invalid("Profile name cannot be empty"));
            }
            if !seen.insert(profile.name.as_str()) {
                return Err(invalid(format!("Duplicate profile name '{}'", profile.name)));
            }
        }

        Ok(())
    }

    /// Profiles a fresh session is seeded with, none of them validated yet
    pub fn seed_profiles(&self) -> Vec<Profile> {
        if self.profiles.is_empty() {
            return vec![Profile::default()];
        }
        self.profiles
            .iter()
            .cloned()
            .map(|mut profile| {
                profile.validated = false;
                profile
            })
            .collect()
    }
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::Config(config::ConfigError::Message(message.into()))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                request_timeout_secs: default_request_timeout(),
            },
            http: HttpConfig::default(),
            retry: RetryConfig::default(),
            limits: LimitsConfig::default(),
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
            profiles: vec![],
        }
    }
}
