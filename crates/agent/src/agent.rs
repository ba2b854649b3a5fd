//! Menu agent
//!
//! Coordinates one turn per inbound message: check out the conversation,
//! decide, commit, then run the effects while still holding the
//! conversation so its replies go out in order.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::broadcast;

use chat_agent_config::Settings;
use chat_agent_core::{
    ContactDirectory, ConversationId, ConversationState, DialogueMode, Effect, InboundMessage,
    MessageTransport,
};

use crate::attachments::{AttachmentCache, FileAttachmentSource};
use crate::clock::{Clock, ZonedClock};
use crate::engine::{DialogueEngine, TurnOutcome};
use crate::executor::{EffectExecutor, ExecutionReport, ExecutorConfig};
use crate::replies::ReplyCatalog;
use crate::store::ConversationStore;
use crate::AgentError;

/// Agent events
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// A turn finished, effects included
    TurnCompleted {
        conversation_id: ConversationId,
        outcome: TurnOutcome,
        mode: DialogueMode,
    },
    /// An effect of a finished turn did not go through
    EffectFailed {
        conversation_id: ConversationId,
        effect: &'static str,
        error: String,
    },
}

/// Result of handling one inbound message
#[derive(Debug, Clone, Serialize)]
pub struct TurnReport {
    pub conversation_id: ConversationId,
    pub outcome: TurnOutcome,
    pub state: ConversationState,
    pub effects: Vec<Effect>,
    pub execution: ExecutionReport,
    pub elapsed_ms: u64,
}

/// Menu assistant serving any number of conversations
pub struct MenuAgent {
    engine: DialogueEngine,
    store: Arc<ConversationStore>,
    executor: EffectExecutor,
    clock: Arc<dyn Clock>,
    contacts: Arc<dyn ContactDirectory>,
    event_tx: broadcast::Sender<AgentEvent>,
}

impl MenuAgent {
    pub fn new(
        engine: DialogueEngine,
        store: Arc<ConversationStore>,
        executor: EffectExecutor,
        clock: Arc<dyn Clock>,
        contacts: Arc<dyn ContactDirectory>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            engine,
            store,
            executor,
            clock,
            contacts,
            event_tx,
        }
    }

    /// Wire an agent from settings: zoned clock, file attachments, bounded store
    pub fn from_settings(
        settings: &Settings,
        transport: Arc<dyn MessageTransport>,
        contacts: Arc<dyn ContactDirectory>,
    ) -> Result<Self, AgentError> {
        let tz = settings.assistant.tz()?;
        let replies = ReplyCatalog::new(settings.assistant.fallback_name.clone());

        let source = FileAttachmentSource::new(PathBuf::from(&settings.assistant.attachments_dir));
        let attachments = Arc::new(AttachmentCache::new(Arc::new(source)));

        let executor = EffectExecutor::new(
            transport,
            attachments,
            replies.clone(),
            ExecutorConfig::from_settings(
                &settings.features,
                &settings.effects,
                settings.assistant.schedule_document.clone(),
            ),
        );

        Ok(Self::new(
            DialogueEngine::new(replies),
            Arc::new(ConversationStore::from_config(&settings.store)),
            executor,
            Arc::new(ZonedClock::new(tz)),
            contacts,
        ))
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn executor(&self) -> &EffectExecutor {
        &self.executor
    }

    pub fn engine(&self) -> &DialogueEngine {
        &self.engine
    }

    /// Subscribe to agent events
    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.event_tx.subscribe()
    }

    /// Load the schedule document ahead of the first request
    pub async fn warm_up(&self) -> bool {
        let name = self.executor.config().schedule_document.clone();
        self.executor.attachments().preload(&name).await
    }

    /// Handle one inbound message. Bad input and failed deliveries are
    /// reported, never returned as errors.
    pub async fn handle(&self, message: InboundMessage) -> TurnReport {
        let started = Instant::now();
        let mut conversation = self.store.checkout(&message.conversation_id).await;
        let id = conversation.id().clone();
        let current = conversation.state();
        let today = self.clock.today();

        let display_name = if current.needs_daily_menu(today) {
            self.display_name(&message).await
        } else {
            None
        };

        let turn = self
            .engine
            .decide(&current, &message.body, today, display_name.as_deref());
        conversation.commit(turn.state);

        tracing::debug!(
            conversation_id = %id,
            from = %current.mode,
            to = %turn.state.mode,
            outcome = turn.outcome.as_str(),
            "Turn decided"
        );

        let execution = self.executor.execute(&id, &turn.effects).await;
        drop(conversation);

        for failure in &execution.failed {
            let _ = self.event_tx.send(AgentEvent::EffectFailed {
                conversation_id: id.clone(),
                effect: failure.effect,
                error: failure.error.clone(),
            });
        }
        let _ = self.event_tx.send(AgentEvent::TurnCompleted {
            conversation_id: id.clone(),
            outcome: turn.outcome,
            mode: turn.state.mode,
        });

        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            conversation_id = %id,
            outcome = turn.outcome.as_str(),
            mode = %turn.state.mode,
            effects = turn.effects.len(),
            failed = execution.failed.len(),
            elapsed_ms,
            "Turn completed"
        );

        TurnReport {
            conversation_id: id,
            outcome: turn.outcome,
            state: turn.state,
            effects: turn.effects,
            execution,
            elapsed_ms,
        }
    }

    async fn display_name(&self, message: &InboundMessage) -> Option<String> {
        if let Some(name) = message.sender_name.as_ref().filter(|n| !n.trim().is_empty()) {
            return Some(name.clone());
        }

        let timeout = self.executor.config().timeout;
        match tokio::time::timeout(timeout, self.contacts.display_name(&message.conversation_id))
            .await
        {
            Ok(name) => name,
            Err(_) => {
                tracing::warn!(
                    conversation_id = %message.conversation_id,
                    "Display name lookup timed out"
                );
                None
            },
        }
    }
}
