//! Widgets
//!
//! - [`ansi`]: renderer output to styled lines
//! - [`text_block`]: scrollable region for a conversation surface

pub mod ansi;
pub mod text_block;

pub use text_block::{TextBlock, TextBlockState};
