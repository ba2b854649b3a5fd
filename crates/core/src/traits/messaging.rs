//! Messaging transport and lookup traits

use async_trait::async_trait;

use crate::conversation::ConversationId;
use crate::effect::Attachment;
use crate::error::Result;

/// Outbound side of a chat transport
///
/// Every method is a suspension point against an external service and may
/// fail; callers treat failures as lost deliveries, not as state errors.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Send a plain text message
    async fn send_text(&self, to: &ConversationId, text: &str) -> Result<()>;

    /// Send a document with a caption
    async fn send_attachment(
        &self,
        to: &ConversationId,
        attachment: &Attachment,
        caption: &str,
    ) -> Result<()>;

    /// Show the typing indicator
    async fn set_typing(&self, to: &ConversationId) -> Result<()>;

    /// Mark the conversation unread on the operator's side
    async fn mark_unread(&self, to: &ConversationId) -> Result<()>;

    /// Transport name for logs
    fn name(&self) -> &str;
}

/// Storage of static documents sent to users
#[async_trait]
pub trait AttachmentSource: Send + Sync {
    /// Fetch a document by name. `Ok(None)` means it does not exist.
    async fn fetch(&self, name: &str) -> Result<Option<Attachment>>;
}

/// Lookup of the display name behind a conversation
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    async fn display_name(&self, id: &ConversationId) -> Option<String>;
}
