//! Contact book
//!
//! Display names announced by the gateway on inbound messages, remembered
//! per conversation so the daily welcome can greet by name.

use async_trait::async_trait;
use dashmap::DashMap;

use chat_agent_core::{ContactDirectory, ConversationId};

#[derive(Debug, Default)]
pub struct ContactBook {
    names: DashMap<ConversationId, String>,
}

impl ContactBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the latest non-blank name for a conversation
    pub fn remember(&self, id: &ConversationId, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.names.insert(id.clone(), name.to_string());
        }
    }

    pub fn forget(&self, id: &ConversationId) {
        self.names.remove(id);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[async_trait]
impl ContactDirectory for ContactBook {
    async fn display_name(&self, id: &ConversationId) -> Option<String> {
        self.names.get(id).map(|name| name.value().clone())
    }
}
