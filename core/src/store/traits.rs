//! Store Trait
//!
//! The capability the orchestrator needs from persistence. Implementations
//! read and write whole records; there is no partial-field update.

use crate::error::StoreError;
use crate::messages::{Conversation, ConversationId};

/// Durable storage for conversations
///
/// Implementations must be safe to share between the UI loop and background
/// talk tasks.
pub trait ConversationStore: Send + Sync {
    /// Load one conversation; `Ok(None)` when no record exists
    fn load(&self, id: &ConversationId) -> Result<Option<Conversation>, StoreError>;

    /// Load every stored conversation (order is store-defined)
    fn load_all(&self) -> Result<Vec<Conversation>, StoreError>;

    /// Write the whole record, replacing any previous version
    fn save(&self, conversation: &Conversation) -> Result<(), StoreError>;

    /// Remove a record; returns whether one existed
    fn delete(&self, id: &ConversationId) -> Result<bool, StoreError>;

    /// Whether a record exists
    fn contains(&self, id: &ConversationId) -> Result<bool, StoreError> {
        Ok(self.load(id)?.is_some())
    }
}
