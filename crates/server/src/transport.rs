//! Outbound transports
//!
//! `OutboxTransport` keeps every outbound call in memory, per conversation,
//! for inspection over HTTP. `GatewayTransport` forwards calls to a chat
//! gateway as JSON POSTs.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use reqwest::Client;
use serde::Serialize;
use uuid::Uuid;

use chat_agent_core::{Attachment, ConversationId, Error, MessageTransport, Result};

/// Messages kept per conversation by the outbox
const OUTBOX_CAPACITY: usize = 200;

/// What was sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundKind {
    Text {
        text: String,
    },
    Attachment {
        file_name: String,
        mime_type: String,
        size: usize,
        caption: String,
    },
    Typing,
    MarkUnread,
}

/// One recorded outbound call
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    pub id: Uuid,
    #[serde(flatten)]
    pub kind: OutboundKind,
    pub sent_at: DateTime<Utc>,
}

/// In-memory transport recording outbound calls
#[derive(Default)]
pub struct OutboxTransport {
    messages: DashMap<ConversationId, VecDeque<OutboundMessage>>,
}

impl OutboxTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, to: &ConversationId, kind: OutboundKind) {
        let mut queue = self.messages.entry(to.clone()).or_default();
        if queue.len() >= OUTBOX_CAPACITY {
            queue.pop_front();
        }
        queue.push_back(OutboundMessage {
            id: Uuid::new_v4(),
            kind,
            sent_at: Utc::now(),
        });
    }

    /// Recorded calls for a conversation, oldest first
    pub fn messages(&self, id: &ConversationId) -> Option<Vec<OutboundMessage>> {
        self.messages
            .get(id)
            .map(|queue| queue.iter().cloned().collect())
    }

    /// Text bodies sent to a conversation, oldest first
    pub fn texts(&self, id: &ConversationId) -> Vec<String> {
        self.messages(id)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|message| match message.kind {
                OutboundKind::Text { text } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self, id: &ConversationId) -> bool {
        self.messages.remove(id).is_some()
    }

    /// Conversations with recorded calls
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[async_trait]
impl MessageTransport for OutboxTransport {
    async fn send_text(&self, to: &ConversationId, text: &str) -> Result<()> {
        self.record(
            to,
            OutboundKind::Text {
                text: text.to_string(),
            },
        );
        Ok(())
    }

    async fn send_attachment(
        &self,
        to: &ConversationId,
        attachment: &Attachment,
        caption: &str,
    ) -> Result<()> {
        self.record(
            to,
            OutboundKind::Attachment {
                file_name: attachment.file_name.clone(),
                mime_type: attachment.mime_type.clone(),
                size: attachment.len(),
                caption: caption.to_string(),
            },
        );
        Ok(())
    }

    async fn set_typing(&self, to: &ConversationId) -> Result<()> {
        self.record(to, OutboundKind::Typing);
        Ok(())
    }

    async fn mark_unread(&self, to: &ConversationId) -> Result<()> {
        self.record(to, OutboundKind::MarkUnread);
        Ok(())
    }

    fn name(&self) -> &str {
        "outbox"
    }
}

#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    to: &'a str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct AttachmentRequest<'a> {
    to: &'a str,
    file_name: &'a str,
    mime_type: &'a str,
    /// Base64-encoded document
    data: String,
    caption: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    to: &'a str,
}

/// Chat gateway reached over HTTP
pub struct GatewayTransport {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GatewayTransport {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<()> {
        let mut request = self.client.post(self.endpoint(path)).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(format!("{}: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::transport(format!(
                "{}: HTTP {}: {}",
                path, status, error_text
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl MessageTransport for GatewayTransport {
    async fn send_text(&self, to: &ConversationId, text: &str) -> Result<()> {
        self.post(
            "send-text",
            &TextRequest {
                to: to.as_str(),
                text,
            },
        )
        .await
    }

    async fn send_attachment(
        &self,
        to: &ConversationId,
        attachment: &Attachment,
        caption: &str,
    ) -> Result<()> {
        self.post(
            "send-attachment",
            &AttachmentRequest {
                to: to.as_str(),
                file_name: &attachment.file_name,
                mime_type: &attachment.mime_type,
                data: STANDARD.encode(&attachment.bytes),
                caption,
            },
        )
        .await
    }

    async fn set_typing(&self, to: &ConversationId) -> Result<()> {
        self.post("typing", &ChatRequest { to: to.as_str() }).await
    }

    async fn mark_unread(&self, to: &ConversationId) -> Result<()> {
        self.post("mark-unread", &ChatRequest { to: to.as_str() })
            .await
    }

    fn name(&self) -> &str {
        "gateway"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_outbox_records_in_order() {
        let outbox = OutboxTransport::new();
        let id = ConversationId::new("a@c.us");
        let attachment = Attachment::new("horarios.pdf", "application/pdf", vec![1, 2, 3]);

        outbox.set_typing(&id).await.unwrap();
        outbox.send_text(&id, "Menu:").await.unwrap();
        outbox.send_attachment(&id, &attachment, "Horários").await.unwrap();
        outbox.mark_unread(&id).await.unwrap();

        let messages = outbox.messages(&id).unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].kind, OutboundKind::Typing);
        assert_eq!(outbox.texts(&id), vec!["Menu:".to_string()]);
        assert!(matches!(
            &messages[2].kind,
            OutboundKind::Attachment { size: 3, .. }
        ));

        assert!(outbox.messages(&ConversationId::new("other")).is_none());
    }

    #[tokio::test]
    async fn test_outbox_is_bounded() {
        let outbox = OutboxTransport::new();
        let id = ConversationId::new("a");
        for n in 0..(OUTBOX_CAPACITY + 5) {
            outbox.send_text(&id, &n.to_string()).await.unwrap();
        }

        let texts = outbox.texts(&id);
        assert_eq!(texts.len(), OUTBOX_CAPACITY);
        assert_eq!(texts[0], "5");
    }

    #[test]
    fn test_outbound_json_shape() {
        let message = OutboundMessage {
            id: Uuid::new_v4(),
            kind: OutboundKind::Text {
                text: "oi".to_string(),
            },
            sent_at: Utc::now(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"], "oi");
    }

    #[test]
    fn test_gateway_endpoints() {
        let gateway =
            GatewayTransport::new("http://gateway:3000/", None, Duration::from_secs(5)).unwrap();
        assert_eq!(gateway.base_url(), "http://gateway:3000");
        assert_eq!(gateway.endpoint("send-text"), "http://gateway:3000/send-text");
    }

    #[tokio::test]
    async fn test_gateway_unreachable_is_transport_error() {
        let gateway =
            GatewayTransport::new("http://127.0.0.1:9", None, Duration::from_millis(500)).unwrap();
        let result = gateway.send_text(&ConversationId::new("a"), "oi").await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
