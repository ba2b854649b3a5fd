//! Configuration management for the chat agent
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default.*`, `config/{env}.*`)
//! - Environment variables (`CHAT_AGENT__SECTION__KEY`)

pub mod assistant;
pub mod settings;

pub use assistant::{AssistantConfig, FeatureFlags};
pub use settings::{
    load_settings, load_settings_from, EffectConfig, ObservabilityConfig, RuntimeEnvironment,
    ServerConfig, Settings, StoreConfig, TransportConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    /// Settings were read but rejected by validation
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ConfigError::MissingField(_) | ConfigError::InvalidValue { .. }
        )
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
