//! Configuration module - layered settings loading

pub mod settings;

pub use settings::{HttpConfig, LimitsConfig, LoggingConfig, RetryConfig, ServerConfig, Settings};
