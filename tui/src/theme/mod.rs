//! Theme and Colors
//!
//! Chrome colors only. Message text is colored by the renderer's syntax
//! theme and arrives as ANSI escapes.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// UI Colors
// ============================================================================

/// Accent for focused borders and the app name
pub const PARLEY_TEAL: Color = Color::Rgb(90, 200, 190);

/// User input green
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Unfocused borders
pub const BORDER_GRAY: Color = Color::Rgb(70, 70, 70);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Waiting for a reply
pub const WAITING_YELLOW: Color = Color::Rgb(240, 200, 90);

/// Selected list entry background
pub const SELECTION_BG: Color = Color::Rgb(45, 60, 75);

// ============================================================================
// Styles
// ============================================================================

/// Border style for a pane
pub fn border(focused: bool) -> Style {
    if focused {
        Style::default().fg(PARLEY_TEAL)
    } else {
        Style::default().fg(BORDER_GRAY)
    }
}

/// Highlight for the selected history entry
pub fn selected() -> Style {
    Style::default()
        .bg(SELECTION_BG)
        .add_modifier(Modifier::BOLD)
}

/// Status bar text
pub fn status() -> Style {
    Style::default().fg(DIM_GRAY)
}
