//! Main Application
//!
//! The App owns every piece of UI state and runs the event loop:
//! - Terminal events (keyboard, resize)
//! - The UI inbox fed by background talk tasks
//! - A frame tick for redraws
//!
//! # Layout
//!
//! ```text
//! ┌ History ┐┌ <title> ─────────────────────────────┐
//! │> Math   ││ # You:                                │
//! │  Recipes││ 2+2?                                  │
//! │         ││ # Ollama:                             │
//! │         ││ 4                                     │
//! │         │└───────────────────────────────────────┘
//! │         │┌ Message ───────────────────────────────┐
//! │         ││ _                                      │
//! └─────────┘└─────────────────────── Ln 1, Col 1 ─┘
//!  status bar
//! ```
//!
//! # Threading
//!
//! All widget state is touched from the loop only. A submitted prompt runs on
//! a tokio task holding nothing but an `Arc` of the orchestrator and a
//! [`SurfaceWriter`](crate::views::SurfaceWriter). Its output and its
//! completion come back as [`UiEvent`]s and are applied here, after checking
//! the conversation is still live.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};

use parley_core::{
    build_assistant, Config, ConversationId, ConversationStore, HighlightRenderer, MemoryStore,
    PlainRenderer, Renderer, SessionError, SessionOrchestrator, SqliteStore,
};

use crate::bridge::SessionBridge;
use crate::events::{self, UiEvent, UiReceiver, UiSender};
use crate::input::InputBox;
use crate::navigation::HistoryPanel;
use crate::theme;
use crate::views::ViewManager;
use crate::widgets::TextBlock;

/// Input box height including borders
const INPUT_HEIGHT: u16 = 5;

/// Redraw interval when nothing happens
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Which pane receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    History,
}

/// Wire the configured store, renderer and assistant into an orchestrator
pub fn build_orchestrator(config: &Config) -> anyhow::Result<SessionOrchestrator> {
    let store: Arc<dyn ConversationStore> = if config.ephemeral {
        tracing::info!("Using in-memory conversation store");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(SqliteStore::open(&config.db_path).with_context(|| {
            format!(
                "Failed to open conversation database {}",
                config.db_path.display()
            )
        })?)
    };

    let renderer: Arc<dyn Renderer> = if config.plain {
        Arc::new(PlainRenderer)
    } else {
        Arc::new(HighlightRenderer::new(&config.theme))
    };

    let assistant = build_assistant(config)?;
    tracing::info!(
        backend = %config.backend,
        model = config.model(),
        assistant = assistant.name(),
        "Assistant ready"
    );

    Ok(SessionOrchestrator::new(store, renderer, assistant)
        .with_default_title(config.default_title.clone()))
}

/// Main application state
pub struct App {
    running: bool,
    orchestrator: Arc<SessionOrchestrator>,

    // === UI Components ===
    views: ViewManager,
    history: HistoryPanel,
    input: InputBox,
    focus: Focus,

    // === Background Work ===
    tx: UiSender,
    inbox: UiReceiver,

    /// Talk failure that arrived while a modal was open
    pending_error: Option<(ConversationId, String)>,

    /// Chat pane height at the last draw (for paging)
    chat_height: u16,
}

enum Step {
    Terminal(Option<io::Result<Event>>),
    Ui(UiEvent),
    Tick,
}

impl App {
    /// Create the app and open the newest conversation, if any
    pub fn new(orchestrator: Arc<SessionOrchestrator>) -> Result<Self, SessionError> {
        let conversations = orchestrator.list_conversations()?;
        let (tx, inbox) = events::channel();
        let history = HistoryPanel::from_conversations(conversations);

        let mut app = Self {
            running: true,
            orchestrator,
            views: ViewManager::new(tx.clone()),
            history,
            input: InputBox::new(),
            focus: Focus::Input,
            tx,
            inbox,
            pending_error: None,
            chat_height: 0,
        };

        if let Some(id) = app.history.selected_id() {
            if let Err(e) = SessionBridge::new(&app.orchestrator, &mut app.views).open(id) {
                app.history.show_error(e.to_string());
            }
        }
        Ok(app)
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();

        terminal.draw(|frame| self.draw(frame))?;

        while self.running {
            let step = tokio::select! {
                biased;

                maybe_event = event_stream.next() => Step::Terminal(maybe_event),
                Some(event) = self.inbox.recv() => Step::Ui(event),
                _ = tokio::time::sleep(FRAME_INTERVAL) => Step::Tick,
            };

            match step {
                // Only handle Press events (not Release or Repeat)
                Step::Terminal(Some(Ok(Event::Key(key)))) if key.kind == KeyEventKind::Press => {
                    self.handle_key(key)
                }
                Step::Terminal(Some(Ok(_))) | Step::Tick => {}
                Step::Terminal(Some(Err(e))) => {
                    tracing::warn!(error = %e, "Terminal event error");
                }
                Step::Terminal(None) => {
                    tracing::info!("Terminal event stream closed");
                    self.running = false;
                }
                Step::Ui(event) => self.handle_ui_event(event),
            }

            self.drain_inbox();
            terminal.draw(|frame| self.draw(frame))?;
        }

        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn views(&self) -> &ViewManager {
        &self.views
    }

    pub fn views_mut(&mut self) -> &mut ViewManager {
        &mut self.views
    }

    pub fn history(&self) -> &HistoryPanel {
        &self.history
    }

    pub fn input(&self) -> &InputBox {
        &self.input
    }

    pub fn orchestrator(&self) -> &Arc<SessionOrchestrator> {
        &self.orchestrator
    }

    // ========================================================================
    // Background events
    // ========================================================================

    /// Apply one event from a background task
    pub fn handle_ui_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::SurfaceOutput { id, bytes } => {
                if !self.views.append(&id, &bytes) {
                    tracing::debug!(
                        conversation = %id,
                        bytes = bytes.len(),
                        "Dropped output for closed view"
                    );
                }
            }
            UiEvent::TalkFinished { id, result } => match result {
                Ok(_) => tracing::debug!(conversation = %id, "Talk finished"),
                Err(SessionError::Deleted(_)) => {
                    tracing::info!(conversation = %id, "Reply arrived after delete, dropped");
                }
                Err(e) if self.is_live(&id) => {
                    tracing::warn!(conversation = %id, error = %e, "Talk failed");
                    self.pending_error = Some((id, e.to_string()));
                    self.show_pending_error();
                }
                Err(e) => {
                    tracing::info!(
                        conversation = %id,
                        error = %e,
                        "Talk failed for closed conversation"
                    );
                }
            },
        }
    }

    /// Surface a queued talk failure once no modal is in the way
    fn show_pending_error(&mut self) {
        if !self.history.is_browsing() {
            return;
        }
        if let Some((id, message)) = self.pending_error.take() {
            if self.is_live(&id) {
                self.history.show_error(message);
            }
        }
    }

    /// Apply everything already waiting in the inbox
    pub fn drain_inbox(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.inbox.try_recv() {
            self.handle_ui_event(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next inbox event and apply it
    pub async fn next_ui_event(&mut self) -> bool {
        match self.inbox.recv().await {
            Some(event) => {
                self.handle_ui_event(event);
                true
            }
            None => false,
        }
    }

    fn is_live(&self, id: &ConversationId) -> bool {
        self.views.contains(id) || self.history.contains(id)
    }

    // ========================================================================
    // Keys
    // ========================================================================

    /// Handle one key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        self.dispatch_key(key);
        self.show_pending_error();
    }

    fn dispatch_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') if ctrl => {
                self.running = false;
                return;
            }
            KeyCode::Char('n') if ctrl => {
                self.history.reset();
                self.start_conversation();
                self.focus = Focus::Input;
                return;
            }
            KeyCode::PageUp => {
                self.views.scroll(-self.page());
                return;
            }
            KeyCode::PageDown => {
                self.views.scroll(self.page());
                return;
            }
            KeyCode::Home if ctrl => {
                self.views.scroll_to_top();
                return;
            }
            KeyCode::End if ctrl => {
                self.views.scroll_to_bottom();
                return;
            }
            _ => {}
        }

        // Modals capture every other key
        if !self.history.is_browsing() {
            let mut bridge = SessionBridge::new(&self.orchestrator, &mut self.views);
            self.history.handle_key(key, &mut bridge);
            return;
        }

        if key.code == KeyCode::Tab || key.code == KeyCode::BackTab {
            self.focus = match self.focus {
                Focus::Input => Focus::History,
                Focus::History => Focus::Input,
            };
            return;
        }

        match self.focus {
            Focus::History => {
                let mut bridge = SessionBridge::new(&self.orchestrator, &mut self.views);
                let consumed = self.history.handle_key(key, &mut bridge);
                if !consumed && key.code == KeyCode::Esc {
                    self.focus = Focus::Input;
                }
            }
            Focus::Input => self.handle_input_key(key),
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc if self.input.is_empty() => self.running = false,
            KeyCode::Esc => self.input.clear(),
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
                self.input.insert('\n')
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Char(c) => self.input.insert(c),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.left(),
            KeyCode::Right => self.input.right(),
            KeyCode::Home => self.input.home(),
            KeyCode::End => self.input.end(),
            _ => {}
        }
    }

    fn page(&self) -> i32 {
        i32::from((self.chat_height / 2).max(1))
    }

    /// Create, show and list a new conversation
    fn start_conversation(&mut self) -> Option<ConversationId> {
        match self.orchestrator.create_conversation() {
            Ok(conversation) => {
                let rendered = self.orchestrator.render_history(&conversation);
                self.views.new_view(&conversation, rendered);
                self.history
                    .insert_front(conversation.id, conversation.title.clone());
                Some(conversation.id)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create conversation");
                self.history
                    .show_error(format!("Could not create conversation: {e}"));
                None
            }
        }
    }

    /// Send the input to the active conversation on a background task
    fn submit(&mut self) {
        if self.input.is_blank() {
            return;
        }

        let id = match self.views.active_id() {
            Some(id) => id,
            None => match self.start_conversation() {
                Some(id) => id,
                None => return,
            },
        };

        let Some(mut writer) = self.views.active_writer() else {
            return;
        };
        // Reserved here, not in the task, so a second Enter sees it at once
        let reservation = match self.orchestrator.reserve(id) {
            Ok(reservation) => reservation,
            Err(e) => {
                tracing::debug!(conversation = %id, error = %e, "Submit refused");
                self.history
                    .show_error("Still waiting for the previous reply in this conversation");
                return;
            }
        };
        let prompt = self.input.take();
        let orchestrator = Arc::clone(&self.orchestrator);
        let tx = self.tx.clone();

        self.views.scroll_to_bottom();
        tokio::spawn(async move {
            let result = orchestrator
                .talk_reserved(reservation, &mut writer, &prompt)
                .await;
            let _ = tx.send(UiEvent::TalkFinished { id, result });
        });
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    /// Draw the whole UI
    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [main, status] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);
        let [sidebar, right] =
            Layout::horizontal([Constraint::Percentage(20), Constraint::Percentage(80)])
                .areas(main);
        let [chat, input] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(INPUT_HEIGHT)]).areas(right);

        let orchestrator = Arc::clone(&self.orchestrator);
        self.history.render_with(
            frame,
            sidebar,
            self.focus == Focus::History,
            |id| orchestrator.is_talking(id),
        );
        self.render_chat(frame, chat);
        self.input.render(
            frame,
            input,
            self.focus == Focus::Input && self.history.is_browsing(),
        );
        self.render_status(frame, status);
        self.history.render_popup(frame, area);
    }

    fn render_chat(&mut self, frame: &mut Frame, area: Rect) {
        let title = self
            .views
            .active()
            .map(|s| format!(" {} ", s.title()))
            .unwrap_or_else(|| " parley ".to_string());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border(false))
            .title(Span::styled(title, Style::default().fg(theme::PARLEY_TEAL)));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.chat_height = inner.height;

        match self.views.active_mut() {
            Some(surface) => {
                let (lines, state) = surface.parts_mut();
                frame.render_stateful_widget(TextBlock::new(lines), inner, state);
            }
            None => {
                let hint = Paragraph::new(vec![
                    Line::raw(""),
                    Line::raw("Type a message to start a conversation,"),
                    Line::raw("or pick one from the history (Tab)."),
                ])
                .style(Style::default().fg(theme::DIM_GRAY));
                frame.render_widget(hint, inner);
            }
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let assistant = self.orchestrator.assistant_name();
        let active = self.views.active_id();

        let (state_str, style) = match active {
            Some(id) if self.orchestrator.is_talking(&id) => (
                format!("Waiting for {assistant}..."),
                Style::default().fg(theme::WAITING_YELLOW),
            ),
            _ => (assistant.to_string(), theme::status()),
        };

        let scroll_info = match self.views.active().map(|s| s.scroll.lines_below()) {
            Some(below) if below > 0 => format!(" [v{below} lines - PgDn to scroll]"),
            _ => String::new(),
        };

        let status = format!(
            " {state_str} | Tab focus | Ctrl+N new | Esc to quit | PgUp/PgDn scroll{scroll_info}"
        );
        frame.render_widget(Paragraph::new(status).style(style), area);
    }
}
