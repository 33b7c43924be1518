//! Mock Assistant
//!
//! Deterministic, offline assistant for tests and demo mode. Replies are
//! scripted per prompt, with an optional artificial delay to widen race
//! windows in concurrency tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::traits::{Assistant, SessionTable};
use crate::messages::{ConversationId, Message};

/// Scripted assistant
pub struct MockAssistant {
    name: String,
    replies: HashMap<String, String>,
    default_reply: Option<String>,
    failure: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_history: Mutex<Vec<Message>>,
    evicted: Mutex<Vec<ConversationId>>,
    sessions: SessionTable<usize>,
}

impl Default for MockAssistant {
    fn default() -> Self {
        Self {
            name: "Mock".to_string(),
            replies: HashMap::new(),
            default_reply: None,
            failure: None,
            delay: None,
            calls: AtomicUsize::new(0),
            last_history: Mutex::new(Vec::new()),
            evicted: Mutex::new(Vec::new()),
            sessions: SessionTable::new(),
        }
    }
}

impl MockAssistant {
    /// Echoing assistant (`echo: <prompt>`)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assistant whose every turn fails with `error`
    #[must_use]
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            failure: Some(error.into()),
            ..Self::default()
        }
    }

    /// Reply with `text` to any prompt without a scripted answer
    #[must_use]
    pub fn with_reply(mut self, text: impl Into<String>) -> Self {
        self.default_reply = Some(text.into());
        self
    }

    /// Scripted answers keyed by exact prompt text
    #[must_use]
    pub fn with_replies<P, R>(mut self, replies: impl IntoIterator<Item = (P, R)>) -> Self
    where
        P: Into<String>,
        R: Into<String>,
    {
        self.replies
            .extend(replies.into_iter().map(|(p, r)| (p.into(), r.into())));
        self
    }

    /// Wait this long before answering
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Display name used on replies
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of talk calls received
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// History passed to the most recent talk call
    #[must_use]
    pub fn last_history(&self) -> Vec<Message> {
        self.last_history.lock().clone()
    }

    /// Conversations evicted through `forget`, in order
    #[must_use]
    pub fn evicted(&self) -> Vec<ConversationId> {
        self.evicted.lock().clone()
    }

    /// Whether session state is held for `id`
    #[must_use]
    pub fn has_session(&self, id: &ConversationId) -> bool {
        self.sessions.contains(id)
    }

    fn answer(&self, prompt: &str) -> String {
        self.replies
            .get(prompt)
            .or(self.default_reply.as_ref())
            .cloned()
            .unwrap_or_else(|| format!("echo: {prompt}"))
    }
}

#[async_trait]
impl Assistant for MockAssistant {
    fn name(&self) -> &str {
        &self.name
    }

    async fn talk(&self, id: ConversationId, history: &[Message], message: &Message) -> Message {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_history.lock() = history.to_vec();
        self.sessions.get_or_insert_with(id, || history.len());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = &self.failure {
            return Message::failed(id, &self.name, error.clone());
        }

        self.sessions.update(&id, |turns| *turns += 2);
        Message::assistant(id, &self.name, self.answer(&message.content))
    }

    fn forget(&self, id: &ConversationId) {
        self.sessions.evict(id);
        self.evicted.lock().push(*id);
    }
}
