//! Conversation Model
//!
//! The records the rest of the engine moves around: a [`Message`] is one turn,
//! a [`Conversation`] is a titled, ordered history of turns under a single
//! [`ConversationId`].
//!
//! # Design Philosophy
//!
//! A Conversation is the unit of persistence. The store reads and writes the
//! whole record at once, so every mutation here is a plain in-memory change
//! followed by a full re-save by the orchestrator.
//!
//! Histories are not forced to alternate user/assistant. A failed assistant
//! call still produces a turn (with [`Message::error`] set), and records written
//! by older builds may be missing replies entirely; both must load fine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to a freshly created conversation
pub const DEFAULT_TITLE: &str = "Untitled";

/// Unique identifier for a conversation
///
/// Issued once by the orchestrator and never reused. The same value keys the
/// store record, the view table and the assistant session table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(Uuid);

impl ConversationId {
    /// Create a new unique conversation ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short form for logs and status lines (first 8 hex chars)
    #[must_use]
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ConversationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Who authored a message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person at the keyboard
    User,
    /// The assistant, carrying the adapter's display name
    Assistant(String),
}

impl Role {
    /// Header text shown above the message
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Role::User => "You",
            Role::Assistant(name) => name,
        }
    }

    /// Whether this is a user turn
    #[must_use]
    pub fn is_user(&self) -> bool {
        matches!(self, Role::User)
    }
}

/// Content type hint for rendering
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Plain text
    #[default]
    Text,
    /// Markdown-formatted text
    Markdown,
}

/// One turn of a conversation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Conversation this message belongs to
    pub conversation_id: ConversationId,
    /// Author of the turn
    pub role: Role,
    /// Rendering hint
    #[serde(default)]
    pub content_type: ContentType,
    /// The message text (empty for failed turns)
    pub content: String,
    /// Set when the assistant could not produce a reply for this turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the message was created
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a user message
    pub fn user(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self {
            conversation_id,
            role: Role::User,
            content_type: ContentType::Text,
            content: content.into(),
            error: None,
            created_at: Utc::now(),
        }
    }

    /// Create an assistant reply
    pub fn assistant(
        conversation_id: ConversationId,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id,
            role: Role::Assistant(name.into()),
            content_type: ContentType::Markdown,
            content: content.into(),
            error: None,
            created_at: Utc::now(),
        }
    }

    /// Create an assistant turn that failed
    pub fn failed(
        conversation_id: ConversationId,
        name: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id,
            role: Role::Assistant(name.into()),
            content_type: ContentType::Text,
            content: String::new(),
            error: Some(error.into()),
            created_at: Utc::now(),
        }
    }

    /// Whether this turn carries an error
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A titled, ordered history of messages
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Stable identifier
    pub id: ConversationId,
    /// User-visible title
    pub title: String,
    /// Turns in chronological order
    #[serde(default)]
    pub messages: Vec<Message>,
    /// When the conversation was created
    pub created_at: DateTime<Utc>,
    /// When the conversation last changed
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create an empty conversation with a fresh ID
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            title: title.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        debug_assert_eq!(
            message.conversation_id, self.id,
            "message appended to the wrong conversation"
        );
        self.messages.push(message);
        self.touch();
    }

    /// Change the title
    pub fn rename(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    /// Messages to send as assistant context (failed turns are left out)
    #[must_use]
    pub fn history_for_prompt(&self) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|m| !m.is_error())
            .cloned()
            .collect()
    }

    /// Number of messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the history is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_ids_are_unique() {
        let a = ConversationId::new();
        let b = ConversationId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_conversation_id_parse_display() {
        let id = ConversationId::new();
        let parsed: ConversationId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(id.short().len(), 8);
        assert!("not-a-uuid".parse::<ConversationId>().is_err());
    }

    #[test]
    fn test_new_conversation_defaults() {
        let conv = Conversation::default();
        assert_eq!(conv.title, DEFAULT_TITLE);
        assert!(conv.is_empty());
        assert_eq!(conv.created_at, conv.updated_at);
    }

    #[test]
    fn test_push_and_rename_touch_updated_at() {
        let mut conv = Conversation::new("Chat");
        let before = conv.updated_at;

        conv.push(Message::user(conv.id, "hello"));
        assert_eq!(conv.len(), 1);
        assert!(conv.updated_at >= before);

        conv.rename("Renamed");
        assert_eq!(conv.title, "Renamed");
        assert_eq!(conv.messages[0].content, "hello");
    }

    #[test]
    fn test_history_for_prompt_skips_failed_turns() {
        let mut conv = Conversation::default();
        conv.push(Message::user(conv.id, "first"));
        conv.push(Message::failed(conv.id, "Mock", "boom"));
        conv.push(Message::user(conv.id, "second"));
        conv.push(Message::assistant(conv.id, "Mock", "reply"));

        let history = conv.history_for_prompt();
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|m| !m.is_error()));
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::User.label(), "You");
        assert_eq!(Role::Assistant("Gemini Pro".into()).label(), "Gemini Pro");
        assert!(Role::User.is_user());
    }

    #[test]
    fn test_message_serde_shape() {
        let id = ConversationId::new();
        let msg = Message::failed(id, "Mock", "offline");
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["conversation_id"], id.to_string());
        assert_eq!(json["role"]["assistant"], "Mock");
        assert_eq!(json["error"], "offline");

        let ok = Message::user(id, "hi");
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("error").is_none());
    }
}
