//! Outbound effects requested by the dialogue engine
//!
//! An effect is decided together with the state transition but executed
//! afterwards, against whatever transport is plugged in.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A requested outbound action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum Effect {
    /// Show the "typing..." indicator (best effort)
    Typing,
    /// Send a plain text message
    Text(String),
    /// Look up the schedule document and send it, or a warning text if missing
    SendSchedule,
    /// Flag the conversation as unread so staff notice it (best effort)
    MarkUnread,
}

impl Effect {
    pub fn text(text: impl Into<String>) -> Self {
        Effect::Text(text.into())
    }

    /// Best-effort effects never produce a user-visible message
    pub fn is_best_effort(&self) -> bool {
        matches!(self, Effect::Typing | Effect::MarkUnread)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Effect::Typing => "typing",
            Effect::Text(_) => "text",
            Effect::SendSchedule => "send_schedule",
            Effect::MarkUnread => "mark_unread",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Effect::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Binary document sent as a chat attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Guess the MIME type from the file extension
    pub fn mime_type_for(file_name: &str) -> &'static str {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => "application/pdf",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "txt" => "text/plain",
            _ => "application/octet-stream",
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
