//! In-Memory Store
//!
//! Same key scheme as the SQLite store, kept in an ordered map. Nothing
//! survives the process.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::traits::ConversationStore;
use super::{conversation_key, KEY_PREFIX};
use crate::error::StoreError;
use crate::messages::{Conversation, ConversationId};

/// Conversation store held entirely in memory
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, Conversation>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored conversations
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl ConversationStore for MemoryStore {
    fn load(&self, id: &ConversationId) -> Result<Option<Conversation>, StoreError> {
        Ok(self.records.read().get(&conversation_key(id)).cloned())
    }

    fn load_all(&self) -> Result<Vec<Conversation>, StoreError> {
        Ok(self
            .records
            .read()
            .range(KEY_PREFIX.to_string()..)
            .take_while(|(key, _)| key.starts_with(KEY_PREFIX))
            .map(|(_, conv)| conv.clone())
            .collect())
    }

    fn save(&self, conversation: &Conversation) -> Result<(), StoreError> {
        self.records
            .write()
            .insert(conversation_key(&conversation.id), conversation.clone());
        Ok(())
    }

    fn delete(&self, id: &ConversationId) -> Result<bool, StoreError> {
        Ok(self.records.write().remove(&conversation_key(id)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_crud() {
        let store = MemoryStore::new();
        let conv = Conversation::new("Memo");

        store.save(&conv).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.load(&conv.id).unwrap().unwrap().title, "Memo");

        assert!(store.delete(&conv.id).unwrap());
        assert!(store.is_empty());
        assert!(store.load(&conv.id).unwrap().is_none());
    }

    #[test]
    fn test_memory_store_load_all() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            store.save(&Conversation::default()).unwrap();
        }
        assert_eq!(store.load_all().unwrap().len(), 3);
    }
}
