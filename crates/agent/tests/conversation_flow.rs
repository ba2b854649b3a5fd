//! Integration tests for full conversations (inbound text -> state -> outbound effects)
//!
//! A recording transport stands in for the chat gateway and a fixed clock
//! pins the local date.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;

use chat_agent_agent::{
    AttachmentCache, ConversationStore, DialogueEngine, EffectExecutor, ExecutorConfig,
    FileAttachmentSource, FixedClock, MenuAgent, ReplyCatalog, TurnOutcome,
};
use chat_agent_config::Settings;
use chat_agent_core::{
    Attachment, ContactDirectory, ConversationId, DialogueMode, InboundMessage, MessageTransport,
    PlanKind, Result,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Sent {
    Text(String, String),
    Attachment(String, String),
    Typing(String),
    Unread(String),
}

/// Records every outbound call, optionally slowing text sends down
#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    text_delay: Option<Duration>,
}

impl RecordingTransport {
    fn texts_to(&self, to: &str) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|sent| match sent {
                Sent::Text(id, text) if id == to => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn count(&self, predicate: impl Fn(&Sent) -> bool) -> usize {
        self.sent.lock().iter().filter(|sent| predicate(sent)).count()
    }
}

#[async_trait]
impl MessageTransport for RecordingTransport {
    async fn send_text(&self, to: &ConversationId, text: &str) -> Result<()> {
        if let Some(delay) = self.text_delay {
            tokio::time::sleep(delay).await;
        }
        self.sent
            .lock()
            .push(Sent::Text(to.to_string(), text.to_string()));
        Ok(())
    }

    async fn send_attachment(
        &self,
        to: &ConversationId,
        attachment: &Attachment,
        _caption: &str,
    ) -> Result<()> {
        self.sent
            .lock()
            .push(Sent::Attachment(to.to_string(), attachment.file_name.clone()));
        Ok(())
    }

    async fn set_typing(&self, to: &ConversationId) -> Result<()> {
        self.sent.lock().push(Sent::Typing(to.to_string()));
        Ok(())
    }

    async fn mark_unread(&self, to: &ConversationId) -> Result<()> {
        self.sent.lock().push(Sent::Unread(to.to_string()));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

struct NoContacts;

#[async_trait]
impl ContactDirectory for NoContacts {
    async fn display_name(&self, _id: &ConversationId) -> Option<String> {
        None
    }
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

fn build_agent(transport: Arc<RecordingTransport>, attachments_dir: &Path) -> MenuAgent {
    let replies = ReplyCatalog::default();
    let source = FileAttachmentSource::new(attachments_dir);
    let executor = EffectExecutor::new(
        transport,
        Arc::new(AttachmentCache::new(Arc::new(source))),
        replies.clone(),
        ExecutorConfig::default(),
    );
    MenuAgent::new(
        DialogueEngine::new(replies),
        Arc::new(ConversationStore::default()),
        executor,
        Arc::new(FixedClock::new(day())),
        Arc::new(NoContacts),
    )
}

/// Scenarios A to D in one conversation, with the schedule on disk
#[tokio::test]
async fn test_plan_purchase_flow() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("horarios.pdf"), b"%PDF-1.4 schedule").unwrap();

    let transport = Arc::new(RecordingTransport::default());
    let agent = build_agent(transport.clone(), dir.path());
    let from = "5534999990000@c.us";

    let welcome = agent
        .handle(InboundMessage::new(from, "oi").with_sender_name("Rafaela Costa"))
        .await;
    assert_eq!(welcome.outcome, TurnOutcome::DailyWelcome);
    assert_eq!(welcome.state.mode, DialogueMode::AwaitingOption);
    assert_eq!(welcome.state.last_menu_date, Some(day()));

    let plans = agent.handle(InboundMessage::new(from, "3")).await;
    assert_eq!(plans.state.mode, DialogueMode::AwaitingPlan);

    let pick = agent.handle(InboundMessage::new(from, "quero o campeão")).await;
    assert_eq!(pick.state.mode, DialogueMode::ConfirmingPlan(PlanKind::Champion));

    let confirm = agent.handle(InboundMessage::new(from, "sim")).await;
    assert_eq!(confirm.outcome, TurnOutcome::PlanConfirmed(PlanKind::Champion));
    assert_eq!(confirm.state.mode, DialogueMode::Normal);
    assert!(confirm.execution.is_clean());

    let texts = transport.texts_to(from);
    assert_eq!(texts.len(), 4);
    assert!(texts[0].starts_with("Olá Rafaela,"));
    assert!(texts[1].contains("*Planos Disponíveis*"));
    assert!(texts[2].contains("*Campeão*"));
    assert!(texts[3].contains("CNPJ"));

    assert_eq!(
        transport.count(|s| matches!(s, Sent::Attachment(_, name) if name == "horarios.pdf")),
        1
    );
    assert_eq!(transport.count(|s| matches!(s, Sent::Unread(_))), 1);

    // idle again: chatter is ignored until the menu keyword
    let idle = agent.handle(InboundMessage::new(from, "valeu!")).await;
    assert_eq!(idle.outcome, TurnOutcome::Ignored);
    assert!(idle.effects.is_empty());
}

#[tokio::test]
async fn test_schedule_missing_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(RecordingTransport::default());
    let agent = build_agent(transport.clone(), dir.path());
    let from = "a@c.us";

    agent.handle(InboundMessage::new(from, "oi")).await;
    let report = agent.handle(InboundMessage::new(from, "4")).await;

    assert_eq!(report.state.mode, DialogueMode::Normal);
    assert!(report.execution.is_clean());
    assert_eq!(
        transport.texts_to(from).last().map(String::as_str),
        Some("⚠️ Arquivo de horários não encontrado no servidor.")
    );
    assert_eq!(transport.count(|s| matches!(s, Sent::Attachment(..))), 0);
}

#[tokio::test]
async fn test_welcome_sent_once_per_conversation_per_day() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(RecordingTransport::default());
    let agent = build_agent(transport.clone(), dir.path());

    for from in ["a@c.us", "b@c.us"] {
        for body in ["oi", "oi", "menu", "oi"] {
            agent.handle(InboundMessage::new(from, body)).await;
        }
    }

    for from in ["a@c.us", "b@c.us"] {
        let welcomes = transport
            .texts_to(from)
            .iter()
            .filter(|text| text.starts_with("Olá "))
            .count();
        assert_eq!(welcomes, 1, "{from}");
    }
}

/// Concurrent messages of one conversation are handled in arrival order
#[tokio::test]
async fn test_same_conversation_is_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(RecordingTransport {
        text_delay: Some(Duration::from_millis(10)),
        ..Default::default()
    });
    let agent = Arc::new(build_agent(transport.clone(), dir.path()));
    let from = "a@c.us";

    let (first, second) = tokio::join!(
        agent.handle(InboundMessage::new(from, "oi")),
        agent.handle(InboundMessage::new(from, "3")),
    );

    assert_eq!(first.outcome, TurnOutcome::DailyWelcome);
    assert_eq!(second.state.mode, DialogueMode::AwaitingPlan);

    let texts = transport.texts_to(from);
    assert!(texts[0].starts_with("Olá "));
    assert!(texts[1].contains("*Planos Disponíveis*"));
}

#[tokio::test]
async fn test_agent_from_settings() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("horarios.pdf"), b"pdf").unwrap();

    let mut settings = Settings::default();
    settings.assistant.attachments_dir = dir.path().display().to_string();
    settings.features.typing_indicator = false;

    let transport = Arc::new(RecordingTransport::default());
    let agent =
        MenuAgent::from_settings(&settings, transport.clone(), Arc::new(NoContacts)).unwrap();
    assert!(agent.warm_up().await);

    let report = agent.handle(InboundMessage::new("a@c.us", "oi")).await;
    assert_eq!(report.execution.skipped, 1);
    assert_eq!(transport.count(|s| matches!(s, Sent::Typing(_))), 0);
}

#[tokio::test]
async fn test_invalid_timezone_is_rejected() {
    let mut settings = Settings::default();
    settings.assistant.timezone = "Nowhere/Land".to_string();

    let result = MenuAgent::from_settings(
        &settings,
        Arc::new(RecordingTransport::default()),
        Arc::new(NoContacts),
    );
    assert!(result.is_err());
}
