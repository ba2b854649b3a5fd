//! Assistant configuration

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Dialogue-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// IANA timezone the daily menu reset follows
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Name used in the welcome text when the contact has none
    #[serde(default = "default_fallback_name")]
    pub fallback_name: String,

    /// File name of the schedule document
    #[serde(default = "default_schedule_document")]
    pub schedule_document: String,

    /// Directory the schedule document is read from
    #[serde(default = "default_attachments_dir")]
    pub attachments_dir: String,
}

fn default_timezone() -> String {
    "America/Sao_Paulo".to_string()
}
fn default_fallback_name() -> String {
    "amigo".to_string()
}
fn default_schedule_document() -> String {
    "horarios.pdf".to_string()
}
fn default_attachments_dir() -> String {
    ".".to_string()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            fallback_name: default_fallback_name(),
            schedule_document: default_schedule_document(),
            attachments_dir: default_attachments_dir(),
        }
    }
}

impl AssistantConfig {
    /// Parse the configured timezone
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "assistant.timezone".to_string(),
                message: format!("{}", e),
            })
    }
}

/// Feature flags for best-effort effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Show "typing..." before longer replies
    #[serde(default = "default_true")]
    pub typing_indicator: bool,

    /// Mark conversations unread when staff should follow up
    #[serde(default = "default_true")]
    pub mark_unread: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            typing_indicator: true,
            mark_unread: true,
        }
    }
}
