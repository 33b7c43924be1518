//! Session Orchestrator
//!
//! The hub between the interface and the three adapters (store, renderer,
//! assistant). It issues conversation identities and sequences every
//! persistence, rendering and assistant call.
//!
//! # Design Philosophy
//!
//! The store is the source of truth. Every operation loads the current record,
//! changes it in memory and writes the whole record back. Nothing is cached
//! here, so a failed write leaves no in-memory state to roll back.
//!
//! `talk` is the only slow operation. It runs on a background task while the
//! interface keeps handling input, so two rules keep the store consistent:
//!
//! - **One talk per conversation.** A second `talk` for a conversation with a
//!   reply outstanding is rejected with [`SessionError::Busy`]. A caller that
//!   runs the talk on another task takes a [`TalkReservation`] first, so the
//!   rejection happens before any work is scheduled.
//! - **No resurrection.** Store mutations are serialized, and the post-reply
//!   save re-checks that the record still exists. A reply that arrives after
//!   the conversation was deleted is discarded with [`SessionError::Deleted`].
//!
//! # Failed Turns
//!
//! A failed assistant call is always recorded: the user's message and the
//! error-carrying reply are appended and persisted, the error is rendered in
//! place, and [`SessionError::Assistant`] is returned so the interface can
//! surface it. Failed turns are left out of the history sent to the assistant.

use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::Assistant;
use crate::error::{SessionError, SessionResult};
use crate::messages::{Conversation, ConversationId, Message, DEFAULT_TITLE};
use crate::render::{render_all, Renderer};
use crate::store::ConversationStore;

type InFlight = Arc<Mutex<HashSet<ConversationId>>>;

/// Exclusive right to talk on one conversation
///
/// Obtained from [`SessionOrchestrator::reserve`] and consumed by
/// [`SessionOrchestrator::talk_reserved`]. The conversation is released when
/// the reservation is dropped, including when it is never used.
#[derive(Debug)]
pub struct TalkReservation {
    in_flight: InFlight,
    id: ConversationId,
}

impl TalkReservation {
    /// Conversation this reservation holds
    #[must_use]
    pub fn id(&self) -> ConversationId {
        self.id
    }
}

impl Drop for TalkReservation {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.id);
    }
}

/// Conversation CRUD and the talk operation
pub struct SessionOrchestrator {
    store: Arc<dyn ConversationStore>,
    renderer: Arc<dyn Renderer>,
    assistant: Arc<dyn Assistant>,
    default_title: String,
    in_flight: InFlight,
    /// Serializes load-modify-save sequences and deletes
    write_lock: Mutex<()>,
}

impl SessionOrchestrator {
    /// Create an orchestrator over the given adapters
    pub fn new(
        store: Arc<dyn ConversationStore>,
        renderer: Arc<dyn Renderer>,
        assistant: Arc<dyn Assistant>,
    ) -> Self {
        Self {
            store,
            renderer,
            assistant,
            default_title: DEFAULT_TITLE.to_string(),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            write_lock: Mutex::new(()),
        }
    }

    /// Title given to new conversations
    #[must_use]
    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// Display name of the assistant
    #[must_use]
    pub fn assistant_name(&self) -> &str {
        self.assistant.name()
    }

    /// Whether the assistant backend is reachable
    pub async fn check_assistant(&self) -> bool {
        let healthy = self.assistant.health_check().await;
        if !healthy {
            tracing::warn!(assistant = self.assistant.name(), "Assistant health check failed");
        }
        healthy
    }

    /// Whether a reply for `id` is outstanding
    #[must_use]
    pub fn is_talking(&self, id: &ConversationId) -> bool {
        self.in_flight.lock().contains(id)
    }

    /// Create and persist an empty conversation
    pub fn create_conversation(&self) -> SessionResult<Conversation> {
        let conversation = Conversation::new(self.default_title.clone());
        self.store.save(&conversation)?;
        tracing::info!(conversation = %conversation.id, "Created conversation");
        Ok(conversation)
    }

    /// All persisted conversations, in store order
    pub fn list_conversations(&self) -> SessionResult<Vec<Conversation>> {
        let conversations = self.store.load_all()?;
        tracing::debug!(count = conversations.len(), "Listed conversations");
        Ok(conversations)
    }

    /// One conversation with its full history
    pub fn get_conversation(&self, id: &ConversationId) -> SessionResult<Conversation> {
        self.store
            .load(id)?
            .ok_or(SessionError::NotFound(*id))
    }

    /// Change a conversation's title; history is untouched
    pub fn rename_conversation(&self, id: &ConversationId, title: &str) -> SessionResult<()> {
        let _write = self.write_lock.lock();
        let mut conversation = self.get_conversation(id)?;
        conversation.rename(title);
        self.store.save(&conversation)?;
        tracing::info!(conversation = %id, title = %title, "Renamed conversation");
        Ok(())
    }

    /// Remove the persisted record
    ///
    /// Views and assistant session state are the caller's to clean up
    /// afterwards (see [`Self::forget_session`]).
    pub fn delete_conversation(&self, id: &ConversationId) -> SessionResult<()> {
        let _write = self.write_lock.lock();
        if !self.store.delete(id)? {
            return Err(SessionError::NotFound(*id));
        }
        tracing::info!(conversation = %id, "Deleted conversation");
        Ok(())
    }

    /// Drop the assistant's per-conversation state (idempotent)
    pub fn forget_session(&self, id: &ConversationId) {
        self.assistant.forget(id);
        tracing::debug!(conversation = %id, "Forgot assistant session");
    }

    /// Render a conversation's history for a fresh view
    #[must_use]
    pub fn render_history(&self, conversation: &Conversation) -> Vec<u8> {
        render_all(self.renderer.as_ref(), &conversation.messages)
    }

    /// Send `prompt` to the assistant and record the turn
    ///
    /// The user's message is rendered to `sink` before the assistant is
    /// called; the reply is rendered once it has been persisted. Returns the
    /// assistant's reply.
    pub async fn talk(
        &self,
        id: ConversationId,
        sink: &mut (dyn Write + Send),
        prompt: &str,
    ) -> SessionResult<Message> {
        let reservation = self.reserve(id)?;
        self.talk_reserved(reservation, sink, prompt).await
    }

    /// Mark `id` as talking before any work is scheduled
    ///
    /// Fails with [`SessionError::Busy`] while another reservation for the
    /// same conversation is alive.
    pub fn reserve(&self, id: ConversationId) -> SessionResult<TalkReservation> {
        let mut in_flight = self.in_flight.lock();
        if !in_flight.insert(id) {
            tracing::debug!(conversation = %id, "Rejected overlapping talk");
            return Err(SessionError::Busy(id));
        }
        Ok(TalkReservation {
            in_flight: Arc::clone(&self.in_flight),
            id,
        })
    }

    /// [`Self::talk`] for a conversation already reserved
    pub async fn talk_reserved(
        &self,
        reservation: TalkReservation,
        sink: &mut (dyn Write + Send),
        prompt: &str,
    ) -> SessionResult<Message> {
        let id = reservation.id();
        let conversation = self.get_conversation(&id)?;
        let user = Message::user(id, prompt);
        self.renderer.render(sink, &user);

        tracing::debug!(
            conversation = %id,
            history = conversation.len(),
            "Waiting for assistant"
        );
        let history = conversation.history_for_prompt();
        let mut reply = self.assistant.talk(id, &history, &user).await;
        reply.conversation_id = id;

        {
            let _write = self.write_lock.lock();
            let Some(mut current) = self.store.load(&id)? else {
                tracing::warn!(
                    conversation = %id,
                    "Conversation deleted during talk, discarding reply"
                );
                // The adapter may have recreated its session after the delete
                self.assistant.forget(&id);
                return Err(SessionError::Deleted(id));
            };
            current.push(user);
            current.push(reply.clone());
            self.store.save(&current)?;
        }

        self.renderer.render(sink, &reply);

        match &reply.error {
            Some(error) => {
                tracing::warn!(conversation = %id, error = %error, "Assistant turn failed");
                Err(SessionError::Assistant {
                    id,
                    message: error.clone(),
                })
            }
            None => {
                tracing::debug!(conversation = %id, "Assistant replied");
                Ok(reply)
            }
        }
    }
}
