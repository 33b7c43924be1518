//! Conversation Persistence
//!
//! Durable load/save/delete/list of whole conversation records.
//!
//! # Key Space
//!
//! Records live under [`KEY_PREFIX`] followed by the conversation ID. Listing
//! is a range scan restricted to that prefix, so other data sharing the same
//! database is never picked up.
//!
//! # Available Stores
//!
//! - [`SqliteStore`]: single-file embedded key-value table (default)
//! - [`MemoryStore`]: in-process map for tests and ephemeral sessions

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::ConversationStore;

use crate::messages::ConversationId;

/// Prefix for all conversation keys
pub const KEY_PREFIX: &str = "conversation:";

/// Build the store key for a conversation
#[must_use]
pub fn conversation_key(id: &ConversationId) -> String {
    format!("{KEY_PREFIX}{id}")
}

/// Exclusive upper bound for a prefix range scan
fn prefix_end(prefix: &str) -> String {
    let mut bytes = prefix.as_bytes().to_vec();
    while let Some(last) = bytes.pop() {
        if last < u8::MAX {
            bytes.push(last + 1);
            break;
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_key_has_prefix() {
        let id = ConversationId::new();
        let key = conversation_key(&id);
        assert!(key.starts_with(KEY_PREFIX));
        assert!(key.ends_with(&id.to_string()));
    }

    #[test]
    fn test_prefix_end_bounds_prefix() {
        let end = prefix_end(KEY_PREFIX);
        assert_eq!(end, "conversation;");

        let key = conversation_key(&ConversationId::new());
        assert!(key.as_str() >= KEY_PREFIX);
        assert!(key.as_str() < end.as_str());
        assert!("conversations" >= end.as_str());
    }
}
