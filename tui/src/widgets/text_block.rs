//! TextBlock Widget
//!
//! A borderless, scrollable region of styled lines. Lines wider than the area
//! are broken at the column limit; spans keep their style across the break.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::StatefulWidget;
use unicode_width::UnicodeWidthChar;

/// State for a scrollable text block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlockState {
    /// Scroll offset (wrapped lines from top)
    pub scroll_offset: usize,
    /// Total wrapped lines at the last render
    pub total_lines: usize,
    /// Visible height at the last render
    pub viewport: usize,
    /// Stick to the newest output
    pub follow: bool,
}

impl Default for TextBlockState {
    fn default() -> Self {
        Self {
            scroll_offset: 0,
            total_lines: 0,
            viewport: 0,
            follow: true,
        }
    }
}

impl TextBlockState {
    fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.viewport)
    }

    /// Scroll by delta (positive = down)
    ///
    /// Reaching the bottom re-enables following.
    pub fn scroll(&mut self, delta: i32) {
        let current = if self.follow {
            self.max_scroll()
        } else {
            self.scroll_offset
        };
        let target = (current as i64 + i64::from(delta)).max(0) as usize;
        self.scroll_offset = target.min(self.max_scroll());
        self.follow = self.scroll_offset >= self.max_scroll();
    }

    /// Scroll to bottom and keep following
    pub fn scroll_to_bottom(&mut self) {
        self.follow = true;
        self.scroll_offset = self.max_scroll();
    }

    /// Scroll to top
    pub fn scroll_to_top(&mut self) {
        self.follow = self.max_scroll() == 0;
        self.scroll_offset = 0;
    }

    /// Wrapped lines hidden below the viewport
    pub fn lines_below(&self) -> usize {
        if self.follow {
            0
        } else {
            self.max_scroll().saturating_sub(self.scroll_offset)
        }
    }
}

/// Break a styled line into rows of at most `width` columns
pub fn wrap_line(line: &Line<'_>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return Vec::new();
    }

    let mut rows = Vec::new();
    let mut row: Vec<Span<'static>> = Vec::new();
    let mut used = 0;

    for span in &line.spans {
        let mut chunk = String::new();
        for ch in span.content.chars() {
            let w = ch.width().unwrap_or(0);
            if used + w > width && used > 0 {
                if !chunk.is_empty() {
                    row.push(Span::styled(std::mem::take(&mut chunk), span.style));
                }
                rows.push(Line::from(std::mem::take(&mut row)));
                used = 0;
            }
            chunk.push(ch);
            used += w;
        }
        if !chunk.is_empty() {
            row.push(Span::styled(chunk, span.style));
        }
    }

    rows.push(Line::from(row));
    rows
}

/// A borderless, scrollable text block
pub struct TextBlock<'a> {
    lines: &'a [Line<'static>],
}

impl<'a> TextBlock<'a> {
    pub fn new(lines: &'a [Line<'static>]) -> Self {
        Self { lines }
    }
}

impl StatefulWidget for TextBlock<'_> {
    type State = TextBlockState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let wrapped: Vec<Line<'static>> = self
            .lines
            .iter()
            .flat_map(|line| wrap_line(line, area.width as usize))
            .collect();

        state.total_lines = wrapped.len();
        state.viewport = area.height as usize;

        let max_scroll = state.max_scroll();
        state.scroll_offset = if state.follow {
            max_scroll
        } else {
            state.scroll_offset.min(max_scroll)
        };

        for (i, line) in wrapped
            .iter()
            .skip(state.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            let y = area.y + i as u16;
            buf.set_line(area.x, y, line, area.width);
        }
    }
}
