//! Core traits and types for the chat menu agent
//!
//! This crate provides foundational types used across all other crates:
//! - Conversation identifiers, dialogue modes and per-conversation state
//! - Outbound effect vocabulary and attachments
//! - Collaborator traits for transports and lookups
//! - Error types

pub mod conversation;
pub mod effect;
pub mod error;
pub mod traits;

pub use conversation::{
    ConversationId, ConversationState, DialogueMode, InboundMessage, MenuOption, PlanKind,
};
pub use effect::{Attachment, Effect};
pub use error::{Error, Result};

pub use traits::{AttachmentSource, ContactDirectory, MessageTransport};
