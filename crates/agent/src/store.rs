//! Conversation State Store
//!
//! One slot per conversation, each behind its own async mutex. A turn checks
//! the slot out for its whole duration, so messages of one conversation are
//! handled strictly one after another while other conversations proceed in
//! parallel.
//!
//! Idle slots are swept by a background task; when the store is full the
//! least recently active idle slot is evicted. A slot that is checked out is
//! never evicted. Removal hooks hear about every conversation the store
//! drops, so per-conversation data kept elsewhere can follow it out.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::{watch, Mutex, OwnedMutexGuard};

use chat_agent_config::StoreConfig;
use chat_agent_core::{ConversationId, ConversationState};

#[derive(Debug)]
struct ConversationEntry {
    state: ConversationState,
    last_activity: Instant,
}

impl ConversationEntry {
    fn new() -> Self {
        Self {
            state: ConversationState::default(),
            last_activity: Instant::now(),
        }
    }
}

type Slot = Arc<Mutex<ConversationEntry>>;

/// Called with the id of every conversation dropped from the store
pub type RemovalHook = Arc<dyn Fn(&ConversationId) + Send + Sync>;

/// Exclusive access to one conversation for the duration of a turn
#[derive(Debug)]
pub struct ConversationGuard {
    id: ConversationId,
    entry: OwnedMutexGuard<ConversationEntry>,
}

impl ConversationGuard {
    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    pub fn state(&self) -> ConversationState {
        self.entry.state
    }

    /// Store the new state and refresh the activity timestamp
    pub fn commit(&mut self, state: ConversationState) {
        self.entry.state = state;
        self.entry.last_activity = Instant::now();
    }
}

/// Per-conversation dialogue state, keyed by conversation id
pub struct ConversationStore {
    slots: DashMap<ConversationId, Slot>,
    max_conversations: usize,
    idle_ttl: Duration,
    cleanup_interval: Duration,
    removal_hooks: RwLock<Vec<RemovalHook>>,
}

impl ConversationStore {
    pub fn new(max_conversations: usize, idle_ttl: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            max_conversations: max_conversations.max(1),
            idle_ttl,
            cleanup_interval: Duration::from_secs(300),
            removal_hooks: RwLock::new(Vec::new()),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(
            config.max_conversations,
            Duration::from_secs(config.idle_ttl_seconds),
        )
        .with_cleanup_interval(Duration::from_secs(config.cleanup_interval_seconds))
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Register a hook run after a conversation is evicted, expired or removed
    pub fn on_removal(&self, hook: impl Fn(&ConversationId) + Send + Sync + 'static) {
        self.removal_hooks.write().push(Arc::new(hook));
    }

    /// Lock the conversation's slot, creating a default one if absent.
    ///
    /// Waits while another turn of the same conversation is in flight.
    pub async fn checkout(&self, id: &ConversationId) -> ConversationGuard {
        let slot = self.slot(id);
        ConversationGuard {
            id: id.clone(),
            entry: slot.lock_owned().await,
        }
    }

    /// Current state, default if the conversation is unknown
    pub async fn get(&self, id: &ConversationId) -> ConversationState {
        self.checkout(id).await.state()
    }

    pub async fn set(&self, id: &ConversationId, state: ConversationState) {
        self.checkout(id).await.commit(state);
    }

    /// State of a known conversation without creating it
    pub async fn snapshot(&self, id: &ConversationId) -> Option<ConversationState> {
        let slot = self.slots.get(id).map(|slot| Arc::clone(slot.value()))?;
        let entry = slot.lock().await;
        Some(entry.state)
    }

    /// Forget a conversation; its next message starts from scratch.
    ///
    /// Waits for an in-flight turn to finish. When other turns are already
    /// queued on the slot it is reset in place instead of unlinked, so they
    /// stay serialized behind each other.
    pub async fn remove(&self, id: &ConversationId) -> bool {
        let Some(slot) = self.slots.get(id).map(|slot| Arc::clone(slot.value())) else {
            return false;
        };

        let mut entry = slot.lock().await;
        // map + this clone
        let unlinked = self
            .slots
            .remove_if(id, |_, current| {
                Arc::ptr_eq(current, &slot) && Arc::strong_count(current) == 2
            })
            .is_some();
        if !unlinked {
            entry.state = ConversationState::default();
            entry.last_activity = Instant::now();
        }
        drop(entry);

        self.notify_removed(id);
        true
    }

    pub fn contains(&self, id: &ConversationId) -> bool {
        self.slots.contains_key(id)
    }

    pub fn ids(&self) -> Vec<ConversationId> {
        self.slots.iter().map(|slot| slot.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_conversations
    }

    /// Drop slots idle for longer than the TTL. Returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let ttl = self.idle_ttl;
        let mut expired = Vec::new();
        self.slots.retain(|id, slot| {
            let keep = !Self::is_expired(slot, ttl);
            if !keep {
                expired.push(id.clone());
            }
            keep
        });

        for id in &expired {
            self.notify_removed(id);
        }
        expired.len()
    }

    /// Start a background task that periodically sweeps idle conversations.
    ///
    /// Returns a shutdown sender; send `true` to stop the task.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let store = Arc::clone(self);
        let interval = store.cleanup_interval;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let removed = store.cleanup_expired();
                        if removed > 0 {
                            tracing::info!(
                                removed,
                                remaining = store.len(),
                                "Evicted idle conversations"
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("Conversation cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    fn slot(&self, id: &ConversationId) -> Slot {
        if let Some(slot) = self.slots.get(id).map(|slot| Arc::clone(slot.value())) {
            return slot;
        }

        if self.slots.len() >= self.max_conversations {
            self.make_room();
        }

        let slot = self
            .slots
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(ConversationEntry::new())));
        Arc::clone(slot.value())
    }

    fn make_room(&self) {
        if self.cleanup_expired() > 0 && self.slots.len() < self.max_conversations {
            return;
        }

        while self.slots.len() >= self.max_conversations {
            let Some(victim) = self.least_recently_active() else {
                tracing::warn!(
                    conversations = self.slots.len(),
                    max = self.max_conversations,
                    "Conversation store full and every slot is busy"
                );
                return;
            };

            let evicted = self
                .slots
                .remove_if(&victim, |_, slot| Self::is_idle(slot))
                .is_some();
            if evicted {
                self.notify_removed(&victim);
                tracing::info!(
                    conversation_id = %victim,
                    "Evicted least recently active conversation"
                );
            }
        }
    }

    fn least_recently_active(&self) -> Option<ConversationId> {
        self.slots
            .iter()
            .filter_map(|slot| {
                if Arc::strong_count(slot.value()) != 1 {
                    return None;
                }
                let entry = slot.value().try_lock().ok()?;
                Some((entry.last_activity, slot.key().clone()))
            })
            .min_by_key(|(last_activity, _)| *last_activity)
            .map(|(_, id)| id)
    }

    fn notify_removed(&self, id: &ConversationId) {
        let hooks = self.removal_hooks.read().clone();
        for hook in hooks {
            hook(id);
        }
    }

    /// Not checked out and nobody waiting on it
    fn is_idle(slot: &Slot) -> bool {
        Arc::strong_count(slot) == 1 && slot.try_lock().is_ok()
    }

    fn is_expired(slot: &Slot, ttl: Duration) -> bool {
        if Arc::strong_count(slot) != 1 {
            return false;
        }
        match slot.try_lock() {
            Ok(entry) => entry.last_activity.elapsed() > ttl,
            Err(_) => false,
        }
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}
