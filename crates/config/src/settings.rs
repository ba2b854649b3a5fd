//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{AssistantConfig, ConfigError, FeatureFlags};

/// Shortest idle TTL that cannot lose a same-day `last_menu_date`
const MIN_IDLE_TTL_SECONDS: u64 = 25 * 60 * 60;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Dialogue configuration
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Feature flags
    #[serde(default)]
    pub features: FeatureFlags,

    /// Effect execution
    #[serde(default)]
    pub effects: EffectConfig,

    /// Conversation store bounds
    #[serde(default)]
    pub store: StoreConfig,

    /// Messaging transport
    #[serde(default)]
    pub transport: TransportConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret expected in the `x-api-key` header of webhook calls
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// Effect execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectConfig {
    /// Upper bound for a single transport call; a timeout counts as a failed delivery
    #[serde(default = "default_effect_timeout")]
    pub timeout_ms: u64,
}

fn default_effect_timeout() -> u64 {
    10_000
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_effect_timeout(),
        }
    }
}

/// Conversation store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Conversations idle for longer than this are evicted
    #[serde(default = "default_idle_ttl")]
    pub idle_ttl_seconds: u64,

    /// Hard cap on remembered conversations
    #[serde(default = "default_max_conversations")]
    pub max_conversations: usize,

    /// How often the eviction sweep runs
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

fn default_idle_ttl() -> u64 {
    2 * 24 * 60 * 60
}
fn default_max_conversations() -> usize {
    100_000
}
fn default_cleanup_interval() -> u64 {
    300
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            idle_ttl_seconds: default_idle_ttl(),
            max_conversations: default_max_conversations(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

/// Messaging transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Only conversation ids ending with this suffix are answered (private chats)
    #[serde(default = "default_private_suffix")]
    pub private_suffix: Option<String>,

    /// Messaging gateway base URL; the in-memory outbox is used when unset
    #[serde(default)]
    pub gateway_url: Option<String>,

    /// Bearer token for the gateway
    #[serde(default)]
    pub gateway_token: Option<String>,
}

fn default_private_suffix() -> Option<String> {
    Some("@c.us".to_string())
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            private_suffix: default_private_suffix(),
            gateway_url: None,
            gateway_token: None,
        }
    }
}

impl TransportConfig {
    /// Whether a conversation id belongs to a private chat
    pub fn accepts(&self, conversation_id: &str) -> bool {
        match &self.private_suffix {
            Some(suffix) if !suffix.is_empty() => conversation_id.ends_with(suffix.as_str()),
            _ => true,
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub log_json: bool,

    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_metrics_enabled() -> bool {
    true
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_assistant()?;
        self.validate_store()?;

        if self.effects.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "effects.timeout_ms".to_string(),
                message: "Timeout must be at least 1ms".to_string(),
            });
        }

        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if server.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.request_timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if self.environment.is_production() && server.api_key.is_none() {
            return Err(ConfigError::MissingField("server.api_key".to_string()));
        }

        if self.environment.is_strict() && self.transport.gateway_url.is_none() {
            tracing::warn!(
                "No transport.gateway_url configured; outbound messages only reach the in-memory outbox"
            );
        }

        Ok(())
    }

    fn validate_assistant(&self) -> Result<(), ConfigError> {
        self.assistant.tz()?;

        if self.assistant.schedule_document.trim().is_empty() {
            return Err(ConfigError::MissingField(
                "assistant.schedule_document".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_store(&self) -> Result<(), ConfigError> {
        let store = &self.store;

        if store.max_conversations == 0 {
            return Err(ConfigError::InvalidValue {
                field: "store.max_conversations".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if store.idle_ttl_seconds < MIN_IDLE_TTL_SECONDS {
            return Err(ConfigError::InvalidValue {
                field: "store.idle_ttl_seconds".to_string(),
                message: format!(
                    "Must be at least {} so an evicted conversation cannot be greeted twice on the same day",
                    MIN_IDLE_TTL_SECONDS
                ),
            });
        }

        if store.cleanup_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "store.cleanup_interval_seconds".to_string(),
                message: "Must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }
}

/// Load settings from `config/` and the environment
///
/// Priority: env vars > config/{env}.* > config/default.* > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from a specific config directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    let default_path = dir.join("default");
    builder = builder.add_source(File::with_name(&default_path.to_string_lossy()).required(false));

    if let Some(env_name) = env {
        let env_path = dir.join(env_name);
        builder =
            builder.add_source(File::with_name(&env_path.to_string_lossy()).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("CHAT_AGENT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
