//! UI Inbox
//!
//! Background work never touches widget state. A talk task reports through
//! this channel and the event loop applies each event on its next iteration.

use tokio::sync::mpsc;

use parley_core::{ConversationId, Message, SessionResult};

/// Work reported back to the UI loop
#[derive(Debug)]
pub enum UiEvent {
    /// Rendered bytes for one conversation's surface
    SurfaceOutput {
        /// Target conversation
        id: ConversationId,
        /// ANSI-formatted output
        bytes: Vec<u8>,
    },
    /// A talk task completed
    TalkFinished {
        /// Conversation the talk ran against
        id: ConversationId,
        /// The reply, or why there is none
        result: SessionResult<Message>,
    },
}

impl UiEvent {
    /// Conversation this event belongs to
    pub fn conversation_id(&self) -> ConversationId {
        match self {
            Self::SurfaceOutput { id, .. } | Self::TalkFinished { id, .. } => *id,
        }
    }
}

/// Sending half of the UI inbox
pub type UiSender = mpsc::UnboundedSender<UiEvent>;

/// Receiving half of the UI inbox
pub type UiReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Create the UI inbox
pub fn channel() -> (UiSender, UiReceiver) {
    mpsc::unbounded_channel()
}
