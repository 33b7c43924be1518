//! Input Box
//!
//! Multi-line prompt editor with a character cursor. `Alt+Enter` inserts a
//! newline; plain `Enter` is the app's submit key and never reaches here.

use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthChar;

use crate::theme;

/// Prompt buffer and cursor
#[derive(Debug, Default, Clone)]
pub struct InputBox {
    buffer: String,
    /// Cursor as a char index into `buffer`
    cursor: usize,
}

impl InputBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Only whitespace typed
    pub fn is_blank(&self) -> bool {
        self.buffer.trim().is_empty()
    }

    /// Take the text and reset
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    pub fn clear(&mut self) {
        self.take();
    }

    fn byte_index(&self) -> usize {
        self.buffer
            .char_indices()
            .nth(self.cursor)
            .map_or(self.buffer.len(), |(i, _)| i)
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index();
        self.buffer.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index();
        self.buffer.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.buffer.chars().count() {
            let at = self.byte_index();
            self.buffer.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.buffer.chars().count());
    }

    /// Start of the current line
    pub fn home(&mut self) {
        let (_, col) = self.cursor_row_col();
        self.cursor -= col;
    }

    /// End of the current line
    pub fn end(&mut self) {
        let rest = self
            .buffer
            .chars()
            .skip(self.cursor)
            .take_while(|c| *c != '\n')
            .count();
        self.cursor += rest;
    }

    /// Zero-based logical row and column of the cursor
    pub fn cursor_row_col(&self) -> (usize, usize) {
        let before: Vec<char> = self.buffer.chars().take(self.cursor).collect();
        let row = before.iter().filter(|c| **c == '\n').count();
        let col = before.iter().rev().take_while(|c| **c != '\n').count();
        (row, col)
    }

    /// Visual rows at `width` columns, and the cursor's (row, col) among them
    fn layout(&self, width: usize) -> (Vec<String>, (usize, usize)) {
        let width = width.max(1);
        let mut rows = vec![String::new()];
        let mut used = 0;
        let mut cursor = (0, 0);

        for (i, ch) in self.buffer.chars().enumerate() {
            if ch == '\n' {
                if i == self.cursor {
                    cursor = (rows.len() - 1, used);
                }
                rows.push(String::new());
                used = 0;
                continue;
            }
            let w = ch.width().unwrap_or(0);
            if used + w > width {
                rows.push(String::new());
                used = 0;
            }
            if i == self.cursor {
                cursor = (rows.len() - 1, used);
            }
            if let Some(row) = rows.last_mut() {
                row.push(ch);
            }
            used += w;
        }
        if self.cursor >= self.buffer.chars().count() {
            if used >= width {
                rows.push(String::new());
                used = 0;
            }
            cursor = (rows.len() - 1, used);
        }
        (rows, cursor)
    }

    /// Draw the box; places the terminal cursor when focused
    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let (row, col) = self.cursor_row_col();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border(focused))
            .title(" Message ")
            .title_bottom(Line::from(format!(" Ln {}, Col {} ", row + 1, col + 1)).right_aligned());

        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let (rows, (cursor_row, cursor_col)) = self.layout(inner.width as usize);
        let height = inner.height as usize;
        let skip = (cursor_row + 1).saturating_sub(height);
        let visible: Vec<Line> = rows
            .into_iter()
            .skip(skip)
            .take(height)
            .map(Line::from)
            .collect();

        frame.render_widget(
            Paragraph::new(visible).style(Style::default().fg(theme::USER_GREEN)),
            inner,
        );

        if focused {
            frame.set_cursor_position(Position::new(
                inner.x + cursor_col as u16,
                inner.y + (cursor_row - skip) as u16,
            ));
        }
    }
}
