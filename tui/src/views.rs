//! View Manager
//!
//! One display surface per conversation opened during this run, plus the
//! notion of which one is visible.
//!
//! # Design Philosophy
//!
//! The surface table is owned by the UI loop and nothing else. A talk running
//! on a background task gets a [`SurfaceWriter`], which only knows a
//! conversation id and the UI inbox: every write becomes a
//! [`UiEvent::SurfaceOutput`] that the loop applies with
//! [`ViewManager::append`]. When the view has been deleted in the meantime,
//! `append` finds nothing and the bytes are dropped, so a late reply cannot
//! bring a view back.
//!
//! Surfaces are materialized lazily. [`ViewManager::switch_view`] only
//! succeeds for conversations already opened; the caller fetches the history
//! and calls [`ViewManager::new_view`] on a miss.

use std::collections::HashMap;
use std::io;

use ratatui::text::Line;

use parley_core::{Conversation, ConversationId};

use crate::events::{UiEvent, UiSender};
use crate::widgets::ansi;
use crate::widgets::TextBlockState;

/// An append-only, scrollable transcript of one conversation
#[derive(Debug)]
pub struct Surface {
    id: ConversationId,
    title: String,
    content: Vec<u8>,
    lines: Vec<Line<'static>>,
    dirty: bool,
    /// Scroll position, kept across switches
    pub scroll: TextBlockState,
}

impl Surface {
    fn new(id: ConversationId, title: String, content: Vec<u8>) -> Self {
        Self {
            id,
            title,
            content,
            lines: Vec::new(),
            dirty: true,
            scroll: TextBlockState::default(),
        }
    }

    /// Conversation shown here
    pub fn id(&self) -> ConversationId {
        self.id
    }

    /// Displayed title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Raw ANSI bytes received so far
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Content with escapes stripped, one `\n` per line
    pub fn plain_text(&mut self) -> String {
        self.refresh();
        self.lines
            .iter()
            .map(ansi::line_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Append rendered output
    pub fn append(&mut self, bytes: &[u8]) {
        self.content.extend_from_slice(bytes);
        self.dirty = true;
    }

    /// Styled lines plus the scroll state, for rendering
    pub fn parts_mut(&mut self) -> (&[Line<'static>], &mut TextBlockState) {
        self.refresh();
        (&self.lines, &mut self.scroll)
    }

    fn refresh(&mut self) {
        if self.dirty {
            self.lines = ansi::to_lines(&String::from_utf8_lossy(&self.content));
            self.dirty = false;
        }
    }
}

/// `io::Write` sink that forwards to one conversation's surface
#[derive(Clone, Debug)]
pub struct SurfaceWriter {
    id: ConversationId,
    tx: UiSender,
}

impl io::Write for SurfaceWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.tx
            .send(UiEvent::SurfaceOutput {
                id: self.id,
                bytes: buf.to_vec(),
            })
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "UI inbox closed"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Live surfaces keyed by conversation, and the active one
pub struct ViewManager {
    views: HashMap<ConversationId, Surface>,
    active: Option<ConversationId>,
    tx: UiSender,
}

impl ViewManager {
    /// Create an empty manager whose writers feed `tx`
    pub fn new(tx: UiSender) -> Self {
        Self {
            views: HashMap::new(),
            active: None,
            tx,
        }
    }

    /// Register a surface pre-filled with the rendered history and show it
    ///
    /// An existing surface for the same conversation is replaced.
    pub fn new_view(&mut self, conversation: &Conversation, rendered: Vec<u8>) {
        let surface = Surface::new(conversation.id, conversation.title.clone(), rendered);
        if self.views.insert(conversation.id, surface).is_some() {
            tracing::debug!(conversation = %conversation.id, "Replaced existing view");
        }
        self.active = Some(conversation.id);
    }

    /// Show an existing surface; `false` (and no change) if there is none
    pub fn switch_view(&mut self, id: &ConversationId) -> bool {
        if self.views.contains_key(id) {
            self.active = Some(*id);
            true
        } else {
            false
        }
    }

    /// Discard a surface; no-op if absent
    pub fn delete_view(&mut self, id: &ConversationId) -> bool {
        let removed = self.views.remove(id).is_some();
        if self.active == Some(*id) {
            self.active = None;
        }
        removed
    }

    /// Sink for the active surface
    pub fn active_writer(&self) -> Option<SurfaceWriter> {
        self.active.map(|id| SurfaceWriter {
            id,
            tx: self.tx.clone(),
        })
    }

    /// Retitle the active surface
    pub fn set_title(&mut self, title: &str) {
        if let Some(surface) = self.active_mut() {
            surface.title = title.to_string();
        }
    }

    /// Retitle a specific surface if it is open
    pub fn retitle(&mut self, id: &ConversationId, title: &str) -> bool {
        match self.views.get_mut(id) {
            Some(surface) => {
                surface.title = title.to_string();
                true
            }
            None => false,
        }
    }

    /// Append bytes to a surface; `false` when it no longer exists
    pub fn append(&mut self, id: &ConversationId, bytes: &[u8]) -> bool {
        match self.views.get_mut(id) {
            Some(surface) => {
                surface.append(bytes);
                true
            }
            None => false,
        }
    }

    /// Conversation currently shown
    pub fn active_id(&self) -> Option<ConversationId> {
        self.active
    }

    /// Active surface
    pub fn active(&self) -> Option<&Surface> {
        self.active.and_then(|id| self.views.get(&id))
    }

    /// Active surface, mutably
    pub fn active_mut(&mut self) -> Option<&mut Surface> {
        let id = self.active?;
        self.views.get_mut(&id)
    }

    /// Surface for `id`
    pub fn get_mut(&mut self, id: &ConversationId) -> Option<&mut Surface> {
        self.views.get_mut(id)
    }

    /// Whether a surface exists for `id`
    pub fn contains(&self, id: &ConversationId) -> bool {
        self.views.contains_key(id)
    }

    /// Number of open surfaces
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// No surfaces open
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Scroll the active surface (positive = down)
    pub fn scroll(&mut self, delta: i32) {
        if let Some(surface) = self.active_mut() {
            surface.scroll.scroll(delta);
        }
    }

    /// Jump the active surface to its newest output
    pub fn scroll_to_bottom(&mut self) {
        if let Some(surface) = self.active_mut() {
            surface.scroll.scroll_to_bottom();
        }
    }

    /// Jump the active surface to its beginning
    pub fn scroll_to_top(&mut self) {
        if let Some(surface) = self.active_mut() {
            surface.scroll.scroll_to_top();
        }
    }
}
