//! Message Rendering
//!
//! Turns one [`Message`] into bytes for a display surface. The surface side
//! understands ANSI SGR escapes, so the highlighting renderer emits 24-bit
//! color sequences and the plain renderer emits none.
//!
//! # Design Philosophy
//!
//! Rendering never fails from the caller's point of view. A highlighter error
//! is written into the sink as a visible `render:` annotation followed by the
//! unformatted text, and sink I/O errors are only logged. A bad message must
//! not abort a talk turn halfway through.

use std::io::Write;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

use crate::messages::Message;

/// Theme used when none is configured
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

const RESET: &str = "\x1b[0m";
const ERROR_COLOR: &str = "\x1b[31m";

/// Writes a formatted representation of a message to a sink
pub trait Renderer: Send + Sync {
    /// Render one message (role header plus content)
    fn render(&self, sink: &mut dyn Write, message: &Message);
}

/// Render every message in order into one buffer
pub fn render_all<'a>(
    renderer: &dyn Renderer,
    messages: impl IntoIterator<Item = &'a Message>,
) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    for message in messages {
        renderer.render(&mut out, message);
    }
    out
}

fn header(message: &Message) -> String {
    format!("# {}:\n\n", message.role.label())
}

fn body(message: &Message) -> String {
    format!("{}{}\n\n", header(message), message.content)
}

fn write_out(sink: &mut dyn Write, text: &str) {
    if let Err(e) = sink.write_all(text.as_bytes()).and_then(|()| sink.flush()) {
        tracing::debug!(error = %e, "Render sink rejected output");
    }
}

/// Markdown highlighting via syntect
pub struct HighlightRenderer {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl HighlightRenderer {
    /// Create a renderer using the named bundled theme
    ///
    /// Unknown names fall back to [`DEFAULT_THEME`], then to any bundled theme.
    pub fn new(theme_name: &str) -> Self {
        let mut themes = ThemeSet::load_defaults();
        let theme = match themes.themes.remove(theme_name) {
            Some(theme) => theme,
            None => {
                tracing::warn!(theme = theme_name, "Unknown theme, using fallback");
                themes
                    .themes
                    .remove(DEFAULT_THEME)
                    .or_else(|| themes.themes.into_values().next())
                    .unwrap_or_default()
            }
        };

        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    /// Names of the bundled themes
    pub fn available_themes() -> Vec<String> {
        ThemeSet::load_defaults().themes.into_keys().collect()
    }

    fn markdown(&self) -> &SyntaxReference {
        self.syntaxes
            .find_syntax_by_extension("md")
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }

    fn highlight(&self, text: &str) -> Result<String, syntect::Error> {
        let mut highlighter = HighlightLines::new(self.markdown(), &self.theme);
        let mut out = String::with_capacity(text.len() * 2);
        for line in LinesWithEndings::from(text) {
            let ranges = highlighter.highlight_line(line, &self.syntaxes)?;
            out.push_str(&as_24_bit_terminal_escaped(&ranges, false));
        }
        out.push_str(RESET);
        Ok(out)
    }
}

impl Default for HighlightRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_THEME)
    }
}

impl Renderer for HighlightRenderer {
    fn render(&self, sink: &mut dyn Write, message: &Message) {
        let text = match &message.error {
            Some(_) => header(message),
            None => body(message),
        };

        match self.highlight(&text) {
            Ok(formatted) => write_out(sink, &formatted),
            Err(e) => {
                tracing::warn!(error = %e, "Highlighting failed");
                write_out(sink, &format!("render: {e}\n{text}"));
            }
        }

        if let Some(error) = &message.error {
            write_out(sink, &format!("{ERROR_COLOR}error: {error}{RESET}\n\n"));
        }
    }
}

/// Unformatted output, no escape sequences
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainRenderer;

impl Renderer for PlainRenderer {
    fn render(&self, sink: &mut dyn Write, message: &Message) {
        match &message.error {
            Some(error) => write_out(sink, &format!("{}error: {error}\n\n", header(message))),
            None => write_out(sink, &body(message)),
        }
    }
}
