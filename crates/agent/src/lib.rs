//! Menu-driven chat assistant
//!
//! Features:
//! - Fixed-pattern intent matchers (menu keyword, yes/no, digits, plan names)
//! - Pure dialogue state machine with a once-per-day welcome gate
//! - Per-conversation store with serialized turns and idle eviction
//! - Effect executor with per-call timeouts and feature-flagged best-effort effects
//! - Cached attachment lookup for the schedule document

pub mod agent;
pub mod attachments;
pub mod clock;
pub mod engine;
pub mod executor;
pub mod intent;
pub mod replies;
pub mod store;

pub use agent::{AgentEvent, MenuAgent, TurnReport};
pub use attachments::{AttachmentCache, FileAttachmentSource};
pub use clock::{Clock, FixedClock, ZonedClock};
pub use engine::{DialogueEngine, Turn, TurnOutcome};
pub use executor::{EffectExecutor, EffectFailure, ExecutionReport, ExecutorConfig};
pub use intent::Confirmation;
pub use replies::{Plan, ReplyCatalog};
pub use store::{ConversationGuard, ConversationStore};

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] chat_agent_core::Error),
}

impl From<chat_agent_config::ConfigError> for AgentError {
    fn from(err: chat_agent_config::ConfigError) -> Self {
        AgentError::Config(err.to_string())
    }
}
