//! SQLite Key-Value Store
//!
//! An ordered key-value table in a single SQLite file. Each conversation is
//! one row whose value is the JSON-encoded record. SQLite's journaling gives
//! durable, crash-safe single-key writes; WAL mode keeps readers off the
//! writer's back.

use std::path::Path;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use super::traits::ConversationStore;
use super::{conversation_key, prefix_end, KEY_PREFIX};
use crate::error::StoreError;
use crate::messages::{Conversation, ConversationId};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
    key   TEXT PRIMARY KEY NOT NULL,
    value BLOB NOT NULL
) WITHOUT ROWID;";

/// Conversation store backed by an embedded SQLite database
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the database at `path`, creating parent directories
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        let mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;

        tracing::info!(path = %path.display(), journal = %mode, "Opened conversation store");
        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn decode(key: &str, value: &[u8]) -> Result<Conversation, StoreError> {
        serde_json::from_slice(value).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })
    }
}

impl ConversationStore for SqliteStore {
    fn load(&self, id: &ConversationId) -> Result<Option<Conversation>, StoreError> {
        let key = conversation_key(id);
        let value: Option<Vec<u8>> = self
            .conn
            .lock()
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;

        value.map(|v| Self::decode(&key, &v)).transpose()
    }

    fn load_all(&self) -> Result<Vec<Conversation>, StoreError> {
        let rows: Vec<(String, Vec<u8>)> = {
            let conn = self.conn.lock();
            let mut stmt = conn.prepare(
                "SELECT key, value FROM kv WHERE key >= ?1 AND key < ?2 ORDER BY key",
            )?;
            let rows = stmt
                .query_map(params![KEY_PREFIX, prefix_end(KEY_PREFIX)], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let mut conversations = Vec::with_capacity(rows.len());
        for (key, value) in rows {
            match Self::decode(&key, &value) {
                Ok(conversation) => conversations.push(conversation),
                Err(e) => tracing::warn!(key = %key, error = %e, "Skipping unreadable record"),
            }
        }
        Ok(conversations)
    }

    fn save(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let value = serde_json::to_vec(conversation).map_err(|source| StoreError::Encode {
            id: conversation.id,
            source,
        })?;

        self.conn.lock().execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![conversation_key(&conversation.id), value],
        )?;
        Ok(())
    }

    fn delete(&self, id: &ConversationId) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .lock()
            .execute("DELETE FROM kv WHERE key = ?1", params![conversation_key(id)])?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Message;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_save_and_load_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut conv = Conversation::new("Chat");
        conv.push(Message::user(conv.id, "hello"));
        conv.push(Message::assistant(conv.id, "Mock", "hi there"));

        store.save(&conv).unwrap();
        let loaded = store.load(&conv.id).unwrap().unwrap();
        assert_eq!(loaded, conv);
    }

    #[test]
    fn test_load_missing_is_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.load(&ConversationId::new()).unwrap().is_none());
    }

    #[test]
    fn test_save_overwrites_whole_record() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut conv = Conversation::default();
        store.save(&conv).unwrap();

        conv.rename("Second");
        store.save(&conv).unwrap();

        let all = store.load_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Second");
    }

    #[test]
    fn test_load_all_ignores_foreign_keys() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.save(&Conversation::default()).unwrap();
        store
            .conn
            .lock()
            .execute(
                "INSERT INTO kv (key, value) VALUES ('settings:theme', 'dark')",
                [],
            )
            .unwrap();

        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_load_all_skips_corrupt_records() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.save(&Conversation::default()).unwrap();
        store
            .conn
            .lock()
            .execute(
                "INSERT INTO kv (key, value) VALUES ('conversation:garbage', x'00ff')",
                [],
            )
            .unwrap();

        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_reports_existence() {
        let store = SqliteStore::open_in_memory().unwrap();
        let conv = Conversation::default();
        store.save(&conv).unwrap();

        assert!(store.delete(&conv.id).unwrap());
        assert!(!store.delete(&conv.id).unwrap());
        assert!(!store.contains(&conv.id).unwrap());
    }

    #[test]
    fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("parley.db");
        let conv = Conversation::new("Durable");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.save(&conv).unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        let loaded = reopened.load(&conv.id).unwrap().unwrap();
        assert_eq!(loaded.title, "Durable");
    }
}
