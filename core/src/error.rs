//! Error Types
//!
//! Every failure in the session engine is recoverable: callers surface it to
//! the user and return to browsing. Nothing here should terminate the process.

use thiserror::Error;

use crate::messages::ConversationId;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// The embedded database reported an error
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A conversation could not be serialized
    #[error("Failed to encode conversation {id}: {source}")]
    Encode {
        /// Conversation being written
        id: ConversationId,
        /// Underlying serializer error
        source: serde_json::Error,
    },

    /// A stored record could not be deserialized
    #[error("Failed to decode stored record {key}: {source}")]
    Decode {
        /// Key of the unreadable record
        key: String,
        /// Underlying deserializer error
        source: serde_json::Error,
    },

    /// Filesystem error preparing the store location
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by session orchestrator operations
#[derive(Debug, Error)]
pub enum SessionError {
    /// No stored record for this conversation
    #[error("Conversation {0} not found")]
    NotFound(ConversationId),

    /// Persistence failed; in-memory state was left unchanged
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The assistant could not answer this turn (already rendered and recorded)
    #[error("Assistant error in {id}: {message}")]
    Assistant {
        /// Conversation of the failed turn
        id: ConversationId,
        /// Error text carried by the failed turn
        message: String,
    },

    /// A reply for this conversation is still outstanding
    #[error("Conversation {0} is still waiting for a reply")]
    Busy(ConversationId),

    /// The conversation was deleted while a reply was in flight
    #[error("Conversation {0} was deleted before the reply arrived")]
    Deleted(ConversationId),
}

impl SessionError {
    /// Conversation the error refers to, if any
    #[must_use]
    pub fn conversation_id(&self) -> Option<ConversationId> {
        match self {
            Self::NotFound(id) | Self::Busy(id) | Self::Deleted(id) => Some(*id),
            Self::Assistant { id, .. } => Some(*id),
            Self::Store(_) => None,
        }
    }

    /// Whether the interface can carry on after this error
    ///
    /// Always true: every session failure is surfaced and control returns to
    /// browsing.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Whether the failure only concerns a single assistant turn
    #[must_use]
    pub fn is_assistant_failure(&self) -> bool {
        matches!(self, Self::Assistant { .. })
    }
}

/// Result alias for orchestrator operations
pub type SessionResult<T> = Result<T, SessionError>;
