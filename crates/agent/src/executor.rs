//! Effect executor
//!
//! Runs the effects of one turn in order against the transport. Every call
//! is bounded by a timeout; a failed or timed-out call is logged and the
//! remaining effects are still attempted. Nothing is retried.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use chat_agent_config::{EffectConfig, FeatureFlags};
use chat_agent_core::{ConversationId, Effect, Error, MessageTransport, Result};

use crate::attachments::AttachmentCache;
use crate::replies::ReplyCatalog;

/// Executor settings
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub typing_indicator: bool,
    pub mark_unread: bool,
    /// Bound for each transport call
    pub timeout: Duration,
    /// Document sent for `SendSchedule`
    pub schedule_document: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            typing_indicator: true,
            mark_unread: true,
            timeout: Duration::from_secs(10),
            schedule_document: "horarios.pdf".to_string(),
        }
    }
}

impl ExecutorConfig {
    pub fn from_settings(
        features: &FeatureFlags,
        effects: &EffectConfig,
        schedule_document: impl Into<String>,
    ) -> Self {
        Self {
            typing_indicator: features.typing_indicator,
            mark_unread: features.mark_unread,
            timeout: Duration::from_millis(effects.timeout_ms),
            schedule_document: schedule_document.into(),
        }
    }
}

/// A single effect that did not go through
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectFailure {
    /// Position in the turn's effect list
    pub index: usize,
    pub effect: &'static str,
    pub error: String,
}

/// Outcome of running one turn's effects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub attempted: usize,
    /// Disabled by feature flag
    pub skipped: usize,
    pub failed: Vec<EffectFailure>,
}

impl ExecutionReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Performs effects against a transport
pub struct EffectExecutor {
    transport: Arc<dyn MessageTransport>,
    attachments: Arc<AttachmentCache>,
    replies: ReplyCatalog,
    config: ExecutorConfig,
}

impl EffectExecutor {
    pub fn new(
        transport: Arc<dyn MessageTransport>,
        attachments: Arc<AttachmentCache>,
        replies: ReplyCatalog,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            transport,
            attachments,
            replies,
            config,
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn transport(&self) -> &Arc<dyn MessageTransport> {
        &self.transport
    }

    pub fn attachments(&self) -> &Arc<AttachmentCache> {
        &self.attachments
    }

    /// Run `effects` in order for one conversation
    pub async fn execute(&self, to: &ConversationId, effects: &[Effect]) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        for (index, effect) in effects.iter().enumerate() {
            if !self.enabled(effect) {
                report.skipped += 1;
                continue;
            }

            report.attempted += 1;
            if let Err(e) = self.perform(to, effect).await {
                tracing::warn!(
                    conversation_id = %to,
                    transport = self.transport.name(),
                    effect = effect.kind(),
                    error = %e,
                    "Effect failed"
                );
                report.failed.push(EffectFailure {
                    index,
                    effect: effect.kind(),
                    error: e.to_string(),
                });
            }
        }

        report
    }

    fn enabled(&self, effect: &Effect) -> bool {
        match effect {
            Effect::Typing => self.config.typing_indicator,
            Effect::MarkUnread => self.config.mark_unread,
            Effect::Text(_) | Effect::SendSchedule => true,
        }
    }

    async fn perform(&self, to: &ConversationId, effect: &Effect) -> Result<()> {
        match effect {
            Effect::Typing => self.bounded("set_typing", self.transport.set_typing(to)).await,
            Effect::Text(text) => {
                self.bounded("send_text", self.transport.send_text(to, text)).await
            },
            Effect::MarkUnread => self.bounded("mark_unread", self.transport.mark_unread(to)).await,
            Effect::SendSchedule => self.send_schedule(to).await,
        }
    }

    /// Send the schedule document, or the warning text when it can't be had
    async fn send_schedule(&self, to: &ConversationId) -> Result<()> {
        let name = self.config.schedule_document.as_str();
        let lookup = self.bounded("fetch_attachment", self.attachments.get(name)).await;

        match lookup {
            Ok(Some(attachment)) => {
                let caption = self.replies.schedule_caption();
                self.bounded(
                    "send_attachment",
                    self.transport.send_attachment(to, &attachment, caption),
                )
                .await
            },
            Ok(None) => {
                tracing::warn!(
                    conversation_id = %to,
                    document = name,
                    "Schedule document not found"
                );
                self.send_missing(to).await
            },
            Err(e) => {
                tracing::warn!(
                    conversation_id = %to,
                    document = name,
                    error = %e,
                    "Schedule document lookup failed"
                );
                self.send_missing(to).await
            },
        }
    }

    async fn send_missing(&self, to: &ConversationId) -> Result<()> {
        let text = self.replies.schedule_missing();
        self.bounded("send_text", self.transport.send_text(to, text)).await
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.config.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                operation,
                after: self.config.timeout,
            }),
        }
    }
}
