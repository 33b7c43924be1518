//! Assistant Traits
//!
//! The contract between the session engine and a conversational provider,
//! plus the per-conversation state table every adapter keeps.
//!
//! # Design Philosophy
//!
//! A talk call is an atomic request/response exchange. It never returns an
//! error: a failed call still produces a [`Message`] whose `error` field is set,
//! so the caller can render and record the failed turn like any other.
//!
//! Provider-side state (chat transcripts, remote session handles) lives in an
//! explicit [`SessionTable`] keyed by [`ConversationId`]. Deleting a
//! conversation evicts its entry through [`Assistant::forget`].

use async_trait::async_trait;
use dashmap::DashMap;

use crate::messages::{ConversationId, Message};

/// A conversational assistant backend
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Display label used as the role of replies
    fn name(&self) -> &str;

    /// Produce a reply to `message` given the prior `history`
    ///
    /// The returned message belongs to conversation `id`. Failures are carried
    /// in [`Message::error`].
    async fn talk(&self, id: ConversationId, history: &[Message], message: &Message) -> Message;

    /// Drop any per-conversation state (idempotent)
    fn forget(&self, id: &ConversationId);

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool {
        true
    }
}

/// Per-conversation state owned by an assistant adapter
#[derive(Debug)]
pub struct SessionTable<H> {
    sessions: DashMap<ConversationId, H>,
}

impl<H> Default for SessionTable<H> {
    fn default() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }
}

impl<H> SessionTable<H> {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the session for `id`, creating it with `init` if absent
    pub fn get_or_insert_with(&self, id: ConversationId, init: impl FnOnce() -> H) -> H
    where
        H: Clone,
    {
        self.sessions.entry(id).or_insert_with(init).value().clone()
    }

    /// Mutate an existing session; returns false if it was evicted
    pub fn update(&self, id: &ConversationId, f: impl FnOnce(&mut H)) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut session) => {
                f(&mut session);
                true
            }
            None => false,
        }
    }

    /// Remove the session for `id`; returns whether one existed
    pub fn evict(&self, id: &ConversationId) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Whether a session exists
    #[must_use]
    pub fn contains(&self, id: &ConversationId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Number of live sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether there are no live sessions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
