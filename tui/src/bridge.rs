//! Session Bridge
//!
//! Turns list actions into orchestrator calls and keeps the view table in
//! step with the store.
//!
//! # Ordering
//!
//! The store mutation always happens first. View and assistant-session
//! cleanup run only after it succeeds, and both are idempotent, so a failure
//! can leave nothing half-deleted that a retry would not fix.

use parley_core::{ConversationId, SessionError, SessionOrchestrator};

use crate::navigation::HistoryHandler;
use crate::views::ViewManager;

/// Borrowed orchestrator + view table for one key press
pub struct SessionBridge<'a> {
    orchestrator: &'a SessionOrchestrator,
    views: &'a mut ViewManager,
}

impl<'a> SessionBridge<'a> {
    pub fn new(orchestrator: &'a SessionOrchestrator, views: &'a mut ViewManager) -> Self {
        Self {
            orchestrator,
            views,
        }
    }

    /// Show `id`, materializing its surface from the store on first visit
    pub fn open(&mut self, id: ConversationId) -> Result<(), SessionError> {
        if self.views.switch_view(&id) {
            return Ok(());
        }
        let conversation = self.orchestrator.get_conversation(&id)?;
        let rendered = self.orchestrator.render_history(&conversation);
        self.views.new_view(&conversation, rendered);
        tracing::debug!(conversation = %id, messages = conversation.len(), "Opened view");
        Ok(())
    }
}

impl HistoryHandler for SessionBridge<'_> {
    fn on_conversation_selected(&mut self, id: ConversationId) -> Result<(), String> {
        self.open(id).map_err(|e| e.to_string())
    }

    fn on_delete_requested(&mut self, id: ConversationId) -> Result<(), String> {
        match self.orchestrator.delete_conversation(&id) {
            Ok(()) => {}
            Err(SessionError::NotFound(_)) => {
                tracing::warn!(conversation = %id, "Already gone from the store, cleaning up");
            }
            Err(e) => return Err(format!("Could not delete: {e}")),
        }
        self.views.delete_view(&id);
        self.orchestrator.forget_session(&id);
        Ok(())
    }

    fn on_rename_requested(&mut self, id: ConversationId, title: &str) -> Result<(), String> {
        self.orchestrator
            .rename_conversation(&id, title)
            .map_err(|e| format!("Could not rename: {e}"))?;
        self.views.retitle(&id, title);
        Ok(())
    }
}
