//! Collaborator traits for the chat agent
//!
//! The dialogue core never talks to a messaging network directly. Everything
//! outside the state machine is reached through these traits so that:
//! - transports can be swapped (gateway, in-memory outbox, test recorder)
//! - tests run without a network
//!
//! ```text
//! Outbound:
//!   - MessageTransport: send text / attachment, typing indicator, mark unread
//!
//! Lookups:
//!   - AttachmentSource: fetch a stored document by name
//!   - ContactDirectory: display name of the person behind a conversation
//! ```

mod messaging;

pub use messaging::{AttachmentSource, ContactDirectory, MessageTransport};
