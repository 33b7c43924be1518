//! Navigation State Machine
//!
//! The conversation list and the modal flows layered over it.
//!
//! # States
//!
//! ```text
//!              Enter                 d / Delete          y / Enter
//!  Browsing ─────────▶ OptionMenu ─────────────▶ DeleteConfirm ──────▶ [delete] ─▶ Browsing
//!     ▲                   │  r / Rename                                    │ failure
//!     │ Esc / Cancel      ▼                                                ▼
//!     ◀──────────── RenameInput ──Enter──▶ [rename] ─▶ Browsing       ErrorDisplay
//!                                                                          │ Enter / Esc
//!                                                                          ▼
//!                                                                       Browsing
//! ```
//!
//! Exactly one state is active. The list widget and its [`ListState`] are
//! shared by all of them, so selection and scroll position survive every round
//! trip through a modal. Moving the selection while browsing notifies the
//! [`HistoryHandler`] so the chat surface follows the list.
//!
//! List entries change only after the handler reports success.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use parley_core::{Conversation, ConversationId};

use crate::theme;

/// Choices offered for one conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    Delete,
    Rename,
    Cancel,
}

impl MenuOption {
    /// Menu order
    pub const ALL: [MenuOption; 3] = [MenuOption::Delete, MenuOption::Rename, MenuOption::Cancel];

    pub fn label(self) -> &'static str {
        match self {
            Self::Delete => "Delete",
            Self::Rename => "Rename",
            Self::Cancel => "Cancel",
        }
    }
}

/// Interaction mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavState {
    /// List visible and selectable
    Browsing,
    /// Choices for one conversation
    OptionMenu {
        index: usize,
        id: ConversationId,
        cursor: usize,
    },
    /// Waiting for y/n
    DeleteConfirm { index: usize, id: ConversationId },
    /// Editing a new title
    RenameInput {
        index: usize,
        id: ConversationId,
        text: String,
    },
    /// A side effect failed
    ErrorDisplay { message: String },
}

/// Bridge from list actions to the session layer
///
/// Errors are shown to the user verbatim.
pub trait HistoryHandler {
    /// The selection moved to `id`
    fn on_conversation_selected(&mut self, id: ConversationId) -> Result<(), String>;

    /// Delete `id` everywhere
    fn on_delete_requested(&mut self, id: ConversationId) -> Result<(), String>;

    /// Rename `id`
    fn on_rename_requested(&mut self, id: ConversationId, title: &str) -> Result<(), String>;
}

/// One row in the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: ConversationId,
    pub title: String,
}

/// Conversation list plus the current mode
#[derive(Debug)]
pub struct HistoryPanel {
    entries: Vec<HistoryEntry>,
    list_state: ListState,
    state: NavState,
}

impl Default for HistoryPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryPanel {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            list_state: ListState::default(),
            state: NavState::Browsing,
        }
    }

    /// Build the list newest first
    pub fn from_conversations(mut conversations: Vec<Conversation>) -> Self {
        conversations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut panel = Self::new();
        panel.entries = conversations
            .into_iter()
            .map(|c| HistoryEntry {
                id: c.id,
                title: c.title,
            })
            .collect();
        if !panel.entries.is_empty() {
            panel.list_state.select(Some(0));
        }
        panel
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn is_browsing(&self) -> bool {
        self.state == NavState::Browsing
    }

    pub fn list_state(&self) -> &ListState {
        &self.list_state
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &ConversationId) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &ConversationId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == *id)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn selected_id(&self) -> Option<ConversationId> {
        self.selected_index()
            .and_then(|i| self.entries.get(i))
            .map(|e| e.id)
    }

    /// Select the entry for `id` without notifying anyone
    pub fn select(&mut self, id: &ConversationId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.list_state.select(Some(index));
                true
            }
            None => false,
        }
    }

    /// Add a conversation at the top and select it
    pub fn insert_front(&mut self, id: ConversationId, title: impl Into<String>) {
        self.entries.insert(
            0,
            HistoryEntry {
                id,
                title: title.into(),
            },
        );
        self.list_state.select(Some(0));
    }

    pub fn set_title(&mut self, id: &ConversationId, title: &str) -> bool {
        match self.entries.iter_mut().find(|e| e.id == *id) {
            Some(entry) => {
                entry.title = title.to_string();
                true
            }
            None => false,
        }
    }

    /// Drop an entry, keeping the selection on a neighbour
    pub fn remove(&mut self, id: &ConversationId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.entries.remove(index);

        let selected = match self.list_state.selected() {
            _ if self.entries.is_empty() => None,
            Some(s) if s > index => Some(s - 1),
            Some(s) => Some(s.min(self.entries.len() - 1)),
            None => None,
        };
        self.list_state.select(selected);
        true
    }

    /// Enter `ErrorDisplay` from outside the key flow
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.state = NavState::ErrorDisplay {
            message: message.into(),
        };
    }

    /// Back to `Browsing`, abandoning any modal
    pub fn reset(&mut self) {
        self.state = NavState::Browsing;
    }

    // ========================================================================
    // Key handling
    // ========================================================================

    /// Route a key press through the current state
    ///
    /// Returns `false` only when browsing and the key means nothing to the
    /// list, so the caller can use it.
    pub fn handle_key(&mut self, key: KeyEvent, handler: &mut impl HistoryHandler) -> bool {
        let state = std::mem::replace(&mut self.state, NavState::Browsing);
        let (next, consumed) = match state {
            NavState::Browsing => self.browse(key, handler),
            NavState::OptionMenu { index, id, cursor } => {
                (self.option_menu(key, index, id, cursor), true)
            }
            NavState::DeleteConfirm { index, id } => {
                (self.delete_confirm(key, index, id, handler), true)
            }
            NavState::RenameInput { index, id, text } => {
                (self.rename_input(key, index, id, text, handler), true)
            }
            NavState::ErrorDisplay { message } => {
                let next = match key.code {
                    KeyCode::Enter | KeyCode::Esc => NavState::Browsing,
                    _ => NavState::ErrorDisplay { message },
                };
                (next, true)
            }
        };
        self.state = next;
        consumed
    }

    fn browse(&mut self, key: KeyEvent, handler: &mut impl HistoryHandler) -> (NavState, bool) {
        let target = match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.step(-1),
            KeyCode::Down | KeyCode::Char('j') => self.step(1),
            KeyCode::Home | KeyCode::Char('g') => (!self.is_empty()).then_some(0),
            KeyCode::End | KeyCode::Char('G') => self.len().checked_sub(1),
            KeyCode::Enter => {
                let Some((index, id)) = self.selected_index().zip(self.selected_id()) else {
                    return (NavState::Browsing, true);
                };
                if let Err(message) = handler.on_conversation_selected(id) {
                    return (NavState::ErrorDisplay { message }, true);
                }
                return (
                    NavState::OptionMenu {
                        index,
                        id,
                        cursor: 0,
                    },
                    true,
                );
            }
            _ => return (NavState::Browsing, false),
        };

        let Some(index) = target else {
            return (NavState::Browsing, true);
        };
        if self.list_state.selected() == Some(index) {
            return (NavState::Browsing, true);
        }
        self.list_state.select(Some(index));
        let id = self.entries[index].id;
        match handler.on_conversation_selected(id) {
            Ok(()) => (NavState::Browsing, true),
            Err(message) => (NavState::ErrorDisplay { message }, true),
        }
    }

    fn step(&self, delta: isize) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let last = self.len() as isize - 1;
        Some((current + delta).clamp(0, last) as usize)
    }

    fn option_menu(
        &mut self,
        key: KeyEvent,
        index: usize,
        id: ConversationId,
        cursor: usize,
    ) -> NavState {
        let count = MenuOption::ALL.len();
        let choice = match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                return NavState::OptionMenu {
                    index,
                    id,
                    cursor: (cursor + count - 1) % count,
                }
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                return NavState::OptionMenu {
                    index,
                    id,
                    cursor: (cursor + 1) % count,
                }
            }
            KeyCode::Enter => MenuOption::ALL[cursor % count],
            KeyCode::Char('d') => MenuOption::Delete,
            KeyCode::Char('r') => MenuOption::Rename,
            KeyCode::Char('c') | KeyCode::Esc => MenuOption::Cancel,
            _ => return NavState::OptionMenu { index, id, cursor },
        };

        match choice {
            MenuOption::Delete => NavState::DeleteConfirm { index, id },
            MenuOption::Rename => {
                let text = self
                    .position(&id)
                    .map(|i| self.entries[i].title.clone())
                    .unwrap_or_default();
                NavState::RenameInput { index, id, text }
            }
            MenuOption::Cancel => NavState::Browsing,
        }
    }

    fn delete_confirm(
        &mut self,
        key: KeyEvent,
        index: usize,
        id: ConversationId,
        handler: &mut impl HistoryHandler,
    ) -> NavState {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Err(message) = handler.on_delete_requested(id) {
                    return NavState::ErrorDisplay { message };
                }
                self.remove(&id);
                // The view follows the neighbour that inherited the selection
                match self.selected_id().map(|next| handler.on_conversation_selected(next)) {
                    Some(Err(message)) => NavState::ErrorDisplay { message },
                    _ => NavState::Browsing,
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => NavState::Browsing,
            _ => NavState::DeleteConfirm { index, id },
        }
    }

    fn rename_input(
        &mut self,
        key: KeyEvent,
        index: usize,
        id: ConversationId,
        mut text: String,
        handler: &mut impl HistoryHandler,
    ) -> NavState {
        match key.code {
            KeyCode::Enter => {
                let title = text.trim();
                if title.is_empty() {
                    return NavState::ErrorDisplay {
                        message: "Title cannot be empty".to_string(),
                    };
                }
                match handler.on_rename_requested(id, title) {
                    Ok(()) => {
                        self.set_title(&id, title);
                        NavState::Browsing
                    }
                    Err(message) => NavState::ErrorDisplay { message },
                }
            }
            KeyCode::Esc => NavState::Browsing,
            KeyCode::Backspace => {
                text.pop();
                NavState::RenameInput { index, id, text }
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                NavState::RenameInput {
                    index,
                    id,
                    text: String::new(),
                }
            }
            KeyCode::Char(c) => {
                text.push(c);
                NavState::RenameInput { index, id, text }
            }
            _ => NavState::RenameInput { index, id, text },
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Draw the list, marking conversations waiting for a reply
    pub fn render_with(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        focused: bool,
        waiting: impl Fn(&ConversationId) -> bool,
    ) {
        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|e| {
                let mut spans = vec![Span::raw(e.title.clone())];
                if waiting(&e.id) {
                    spans.push(Span::styled(" …", Style::default().fg(theme::WAITING_YELLOW)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme::border(focused && self.is_browsing()))
                    .title(" History "),
            )
            .highlight_style(theme::selected())
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, area, &mut self.list_state);
    }

    /// Draw the modal for the current state, if any
    pub fn render_popup(&self, frame: &mut Frame, area: Rect) {
        match &self.state {
            NavState::Browsing => {}
            NavState::OptionMenu { id, cursor, .. } => {
                let lines: Vec<Line> = MenuOption::ALL
                    .iter()
                    .enumerate()
                    .map(|(i, option)| {
                        if i == *cursor {
                            Line::styled(format!("> {}", option.label()), theme::selected())
                        } else {
                            Line::raw(format!("  {}", option.label()))
                        }
                    })
                    .collect();
                self.popup(frame, area, &self.title_of(id), lines, theme::PARLEY_TEAL);
            }
            NavState::DeleteConfirm { id, .. } => {
                let lines = vec![
                    Line::raw(format!("Delete \"{}\"?", self.title_of(id))),
                    Line::raw(""),
                    Line::styled("y: delete   n: keep", Style::default().fg(theme::DIM_GRAY)),
                ];
                self.popup(frame, area, "Confirm", lines, theme::ERROR_RED);
            }
            NavState::RenameInput { text, .. } => {
                let lines = vec![
                    Line::styled(format!("{text}_"), Style::default().fg(theme::USER_GREEN)),
                    Line::raw(""),
                    Line::styled("Enter: save   Esc: cancel", Style::default().fg(theme::DIM_GRAY)),
                ];
                self.popup(frame, area, "Rename", lines, theme::PARLEY_TEAL);
            }
            NavState::ErrorDisplay { message } => {
                let width = (area.width / 2).max(20) as usize;
                let mut lines: Vec<Line> = textwrap::wrap(message, width.saturating_sub(4))
                    .into_iter()
                    .map(|l| Line::raw(l.into_owned()))
                    .collect();
                lines.push(Line::raw(""));
                lines.push(Line::styled(
                    "Enter: dismiss",
                    Style::default().fg(theme::DIM_GRAY),
                ));
                self.popup(frame, area, "Error", lines, theme::ERROR_RED);
            }
        }
    }

    fn title_of(&self, id: &ConversationId) -> String {
        self.position(id)
            .map(|i| self.entries[i].title.clone())
            .unwrap_or_else(|| id.short())
    }

    fn popup(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        lines: Vec<Line>,
        color: ratatui::style::Color,
    ) {
        let content_width = lines.iter().map(Line::width).max().unwrap_or(0) as u16;
        let width = (content_width + 4).max(title.len() as u16 + 6).min(area.width);
        let height = (lines.len() as u16 + 2).min(area.height);

        let [row] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(area);
        let [popup] = Layout::horizontal([Constraint::Length(width)])
            .flex(Flex::Center)
            .areas(row);

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                    .title(format!(" {title} ")),
            ),
            popup,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use pretty_assertions::assert_eq;

    /// Records calls and fails on demand
    #[derive(Default)]
    struct Recorder {
        selected: Vec<ConversationId>,
        deleted: Vec<ConversationId>,
        renamed: Vec<(ConversationId, String)>,
        fail_with: Option<String>,
    }

    impl HistoryHandler for Recorder {
        fn on_conversation_selected(&mut self, id: ConversationId) -> Result<(), String> {
            self.selected.push(id);
            Ok(())
        }

        fn on_delete_requested(&mut self, id: ConversationId) -> Result<(), String> {
            if let Some(e) = &self.fail_with {
                return Err(e.clone());
            }
            self.deleted.push(id);
            Ok(())
        }

        fn on_rename_requested(&mut self, id: ConversationId, title: &str) -> Result<(), String> {
            if let Some(e) = &self.fail_with {
                return Err(e.clone());
            }
            self.renamed.push((id, title.to_string()));
            Ok(())
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn panel(n: usize) -> (HistoryPanel, Vec<ConversationId>) {
        let mut panel = HistoryPanel::new();
        let ids: Vec<_> = (0..n).map(|_| ConversationId::new()).collect();
        for (i, id) in ids.iter().enumerate().rev() {
            panel.insert_front(*id, format!("chat {i}"));
        }
        (panel, ids)
    }

    fn press(panel: &mut HistoryPanel, handler: &mut Recorder, codes: &[KeyCode]) {
        for code in codes {
            panel.handle_key(key(*code), handler);
        }
    }

    #[test]
    fn test_moving_selection_notifies() {
        let (mut panel, ids) = panel(3);
        let mut rec = Recorder::default();

        press(&mut panel, &mut rec, &[KeyCode::Down, KeyCode::Char('j'), KeyCode::Down]);
        assert_eq!(panel.selected_id(), Some(ids[2]));
        assert_eq!(rec.selected, vec![ids[1], ids[2]]);

        press(&mut panel, &mut rec, &[KeyCode::Up]);
        assert_eq!(rec.selected.last(), Some(&ids[1]));
        assert!(panel.is_browsing());
    }

    #[test]
    fn test_unhandled_key_falls_through_when_browsing() {
        let (mut panel, _) = panel(1);
        let mut rec = Recorder::default();
        assert!(!panel.handle_key(key(KeyCode::Char('x')), &mut rec));
        assert!(panel.handle_key(key(KeyCode::Down), &mut rec));
    }

    #[test]
    fn test_option_menu_cancel_keeps_selection() {
        let (mut panel, ids) = panel(3);
        let mut rec = Recorder::default();
        press(&mut panel, &mut rec, &[KeyCode::Down, KeyCode::Enter]);

        assert_eq!(
            panel.state(),
            &NavState::OptionMenu {
                index: 1,
                id: ids[1],
                cursor: 0
            }
        );

        press(&mut panel, &mut rec, &[KeyCode::Esc]);
        assert!(panel.is_browsing());
        assert_eq!(panel.selected_index(), Some(1));
    }

    #[test]
    fn test_delete_flow_removes_entry_on_success() {
        let (mut panel, ids) = panel(3);
        let mut rec = Recorder::default();
        press(
            &mut panel,
            &mut rec,
            &[KeyCode::Down, KeyCode::Enter, KeyCode::Enter, KeyCode::Char('y')],
        );

        assert_eq!(rec.deleted, vec![ids[1]]);
        assert!(!panel.contains(&ids[1]));
        assert_eq!(panel.len(), 2);
        assert_eq!(panel.selected_id(), Some(ids[2]));
        assert_eq!(rec.selected.last(), Some(&ids[2]));
        assert!(panel.is_browsing());
    }

    #[test]
    fn test_deleting_last_entry_selects_nothing() {
        let (mut panel, ids) = panel(1);
        let mut rec = Recorder::default();
        press(&mut panel, &mut rec, &[KeyCode::Enter, KeyCode::Char('d'), KeyCode::Char('y')]);

        assert_eq!(rec.deleted, vec![ids[0]]);
        assert!(panel.is_empty());
        assert_eq!(panel.selected_id(), None);
        // Only the Enter that opened the menu notified
        assert_eq!(rec.selected, vec![ids[0]]);
    }

    #[test]
    fn test_delete_declined_changes_nothing() {
        let (mut panel, ids) = panel(2);
        let mut rec = Recorder::default();
        press(
            &mut panel,
            &mut rec,
            &[KeyCode::Enter, KeyCode::Char('d'), KeyCode::Char('n')],
        );

        assert!(rec.deleted.is_empty());
        assert!(panel.contains(&ids[0]));
        assert!(panel.is_browsing());
    }

    #[test]
    fn test_failed_delete_shows_error_and_keeps_entry() {
        let (mut panel, ids) = panel(2);
        let mut rec = Recorder {
            fail_with: Some("disk full".into()),
            ..Recorder::default()
        };
        press(
            &mut panel,
            &mut rec,
            &[KeyCode::Enter, KeyCode::Char('d'), KeyCode::Enter],
        );

        assert_eq!(
            panel.state(),
            &NavState::ErrorDisplay {
                message: "disk full".into()
            }
        );
        assert!(panel.contains(&ids[0]));

        press(&mut panel, &mut rec, &[KeyCode::Char('q')]);
        assert!(!panel.is_browsing());
        press(&mut panel, &mut rec, &[KeyCode::Enter]);
        assert!(panel.is_browsing());
        assert_eq!(panel.selected_index(), Some(0));
    }

    #[test]
    fn test_rename_flow_updates_entry() {
        let (mut panel, ids) = panel(1);
        let mut rec = Recorder::default();
        press(&mut panel, &mut rec, &[KeyCode::Enter, KeyCode::Char('r')]);

        assert_eq!(
            panel.state(),
            &NavState::RenameInput {
                index: 0,
                id: ids[0],
                text: "chat 0".into()
            }
        );

        panel.handle_key(
            KeyEvent::new_with_kind(KeyCode::Char('u'), KeyModifiers::CONTROL, KeyEventKind::Press),
            &mut rec,
        );
        press(
            &mut panel,
            &mut rec,
            &[
                KeyCode::Char('M'),
                KeyCode::Char('a'),
                KeyCode::Char('t'),
                KeyCode::Char('h'),
                KeyCode::Char('x'),
                KeyCode::Backspace,
                KeyCode::Enter,
            ],
        );

        assert_eq!(rec.renamed, vec![(ids[0], "Math".to_string())]);
        assert_eq!(panel.entries()[0].title, "Math");
        assert!(panel.is_browsing());
    }

    #[test]
    fn test_empty_rename_is_an_error() {
        let (mut panel, _) = panel(1);
        let mut rec = Recorder::default();
        panel.handle_key(key(KeyCode::Enter), &mut rec);
        panel.handle_key(key(KeyCode::Char('r')), &mut rec);
        panel.handle_key(
            KeyEvent::new_with_kind(KeyCode::Char('u'), KeyModifiers::CONTROL, KeyEventKind::Press),
            &mut rec,
        );
        press(&mut panel, &mut rec, &[KeyCode::Char(' '), KeyCode::Enter]);

        assert!(matches!(panel.state(), NavState::ErrorDisplay { .. }));
        assert!(rec.renamed.is_empty());
        assert_eq!(panel.entries()[0].title, "chat 0");
    }

    #[test]
    fn test_rename_cancel() {
        let (mut panel, _) = panel(1);
        let mut rec = Recorder::default();
        press(
            &mut panel,
            &mut rec,
            &[KeyCode::Enter, KeyCode::Char('r'), KeyCode::Char('!'), KeyCode::Esc],
        );
        assert!(panel.is_browsing());
        assert!(rec.renamed.is_empty());
        assert_eq!(panel.entries()[0].title, "chat 0");
    }

    #[test]
    fn test_menu_cursor_wraps() {
        let (mut panel, ids) = panel(1);
        let mut rec = Recorder::default();
        press(&mut panel, &mut rec, &[KeyCode::Enter, KeyCode::Up]);
        assert_eq!(
            panel.state(),
            &NavState::OptionMenu {
                index: 0,
                id: ids[0],
                cursor: 2
            }
        );
        press(&mut panel, &mut rec, &[KeyCode::Enter]);
        assert!(panel.is_browsing());
    }

    #[test]
    fn test_remove_selection_bookkeeping() {
        let (mut panel, ids) = panel(3);
        panel.list_state.select(Some(2));
        assert!(panel.remove(&ids[0]));
        assert_eq!(panel.selected_id(), Some(ids[2]));
        assert!(panel.remove(&ids[2]));
        assert_eq!(panel.selected_id(), Some(ids[1]));
        assert!(panel.remove(&ids[1]));
        assert_eq!(panel.selected_index(), None);
        assert!(!panel.remove(&ids[1]));
    }

    #[test]
    fn test_from_conversations_is_newest_first() {
        let older = Conversation::new("older");
        let mut newer = Conversation::new("newer");
        newer.created_at = older.created_at + chrono::Duration::seconds(5);

        let panel = HistoryPanel::from_conversations(vec![older, newer]);
        let titles: Vec<_> = panel.entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["newer", "older"]);
        assert_eq!(panel.selected_index(), Some(0));
    }
}
