//! ANSI to ratatui conversion
//!
//! Surfaces receive the renderer's raw output: text interleaved with SGR
//! escapes (`ESC [ ... m`). This module turns that byte stream into styled
//! [`Line`]s. Other CSI sequences are dropped. An escape cut off at the end of
//! the buffer is left unparsed until the rest of it arrives.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

const ESC: u8 = 0x1b;
const TAB: &str = "    ";

/// A complete CSI sequence found at some offset
struct Csi<'a> {
    params: &'a str,
    final_byte: u8,
    length: usize,
}

fn extract_csi(input: &str, pos: usize) -> Option<Csi<'_>> {
    let bytes = input.as_bytes();
    if bytes.get(pos + 1) != Some(&b'[') {
        return None;
    }
    let mut idx = pos + 2;
    while idx < bytes.len() {
        let b = bytes[idx];
        if (0x40..=0x7e).contains(&b) {
            return Some(Csi {
                params: &input[pos + 2..idx],
                final_byte: b,
                length: idx + 1 - pos,
            });
        }
        idx += 1;
    }
    None
}

/// Running SGR state
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SgrTracker {
    style: Style,
}

impl SgrTracker {
    /// Current style
    pub fn style(&self) -> Style {
        self.style
    }

    /// Apply the parameters of one `ESC [ ... m` sequence
    pub fn apply(&mut self, params: &str) {
        if params.is_empty() {
            self.style = Style::default();
            return;
        }

        let codes: Vec<u16> = params
            .split(';')
            .map(|p| p.parse().unwrap_or(0))
            .collect();

        let mut i = 0;
        while i < codes.len() {
            let code = codes[i];
            match code {
                0 => self.style = Style::default(),
                1 => self.style = self.style.add_modifier(Modifier::BOLD),
                2 => self.style = self.style.add_modifier(Modifier::DIM),
                3 => self.style = self.style.add_modifier(Modifier::ITALIC),
                4 => self.style = self.style.add_modifier(Modifier::UNDERLINED),
                7 => self.style = self.style.add_modifier(Modifier::REVERSED),
                9 => self.style = self.style.add_modifier(Modifier::CROSSED_OUT),
                22 => {
                    self.style = self
                        .style
                        .remove_modifier(Modifier::BOLD | Modifier::DIM)
                }
                23 => self.style = self.style.remove_modifier(Modifier::ITALIC),
                24 => self.style = self.style.remove_modifier(Modifier::UNDERLINED),
                27 => self.style = self.style.remove_modifier(Modifier::REVERSED),
                29 => self.style = self.style.remove_modifier(Modifier::CROSSED_OUT),
                30..=37 => self.style = self.style.fg(Color::Indexed((code - 30) as u8)),
                39 => self.style.fg = None,
                40..=47 => self.style = self.style.bg(Color::Indexed((code - 40) as u8)),
                49 => self.style.bg = None,
                90..=97 => self.style = self.style.fg(Color::Indexed((code - 90 + 8) as u8)),
                100..=107 => self.style = self.style.bg(Color::Indexed((code - 100 + 8) as u8)),
                38 | 48 => {
                    let (color, used) = extended_color(&codes[i + 1..]);
                    if let Some(color) = color {
                        self.style = if code == 38 {
                            self.style.fg(color)
                        } else {
                            self.style.bg(color)
                        };
                    }
                    i += used;
                }
                _ => {}
            }
            i += 1;
        }
    }
}

/// Parse `5;n` or `2;r;g;b`; returns the color and how many codes it used
fn extended_color(rest: &[u16]) -> (Option<Color>, usize) {
    match rest {
        [5, n, ..] => (Some(Color::Indexed(*n as u8)), 2),
        [2, r, g, b, ..] => (Some(Color::Rgb(*r as u8, *g as u8, *b as u8)), 4),
        [] => (None, 0),
        _ => (None, rest.len()),
    }
}

/// Convert ANSI-formatted text into styled lines
pub fn to_lines(text: &str) -> Vec<Line<'static>> {
    let bytes = text.as_bytes();
    let mut tracker = SgrTracker::default();
    let mut lines = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut idx = 0;

    let flush = |run: &mut String, spans: &mut Vec<Span<'static>>, style: Style| {
        if !run.is_empty() {
            spans.push(Span::styled(std::mem::take(run), style));
        }
    };

    while idx < bytes.len() {
        match bytes[idx] {
            ESC => {
                flush(&mut run, &mut spans, tracker.style());
                match extract_csi(text, idx) {
                    Some(csi) => {
                        if csi.final_byte == b'm' {
                            tracker.apply(csi.params);
                        }
                        idx += csi.length;
                    }
                    None if matches!(bytes.get(idx + 1), None | Some(b'[')) => break,
                    None => idx += 1,
                }
            }
            b'\n' => {
                flush(&mut run, &mut spans, tracker.style());
                lines.push(Line::from(std::mem::take(&mut spans)));
                idx += 1;
            }
            b'\r' => idx += 1,
            b'\t' => {
                run.push_str(TAB);
                idx += 1;
            }
            _ => {
                let Some(ch) = text[idx..].chars().next() else {
                    break;
                };
                if !ch.is_control() {
                    run.push(ch);
                }
                idx += ch.len_utf8();
            }
        }
    }

    flush(&mut run, &mut spans, tracker.style());
    if !spans.is_empty() {
        lines.push(Line::from(spans));
    }
    lines
}

/// Text of a line without styling
pub fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(lines: &[Line<'_>]) -> Vec<String> {
        lines.iter().map(line_text).collect()
    }

    #[test]
    fn test_plain_text_splits_on_newlines() {
        let lines = to_lines("# You:\n\nhi\n\n");
        assert_eq!(texts(&lines), vec!["# You:", "", "hi", ""]);
    }

    #[test]
    fn test_truecolor_foreground() {
        let lines = to_lines("\x1b[38;2;10;20;30mgreen\x1b[0m plain");
        assert_eq!(lines.len(), 1);
        let spans = &lines[0].spans;
        assert_eq!(spans[0].content, "green");
        assert_eq!(spans[0].style.fg, Some(Color::Rgb(10, 20, 30)));
        assert_eq!(spans[1].content, " plain");
        assert_eq!(spans[1].style, Style::default());
    }

    #[test]
    fn test_basic_and_bright_colors() {
        let mut tracker = SgrTracker::default();
        tracker.apply("31");
        assert_eq!(tracker.style().fg, Some(Color::Indexed(1)));
        tracker.apply("94;1");
        assert_eq!(tracker.style().fg, Some(Color::Indexed(12)));
        assert!(tracker.style().add_modifier.contains(Modifier::BOLD));
        tracker.apply("22;39");
        assert_eq!(tracker.style().fg, None);
        assert!(!tracker.style().add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_indexed_background_and_reset() {
        let mut tracker = SgrTracker::default();
        tracker.apply("48;5;236");
        assert_eq!(tracker.style().bg, Some(Color::Indexed(236)));
        tracker.apply("");
        assert_eq!(tracker.style(), Style::default());
    }

    #[test]
    fn test_style_carries_across_lines() {
        let lines = to_lines("\x1b[31merror: one\ntwo\x1b[0m");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].spans[0].style.fg, Some(Color::Indexed(1)));
    }

    #[test]
    fn test_truncated_escape_waits_for_rest() {
        let lines = to_lines("done\nhalf\x1b[38;2;1");
        assert_eq!(texts(&lines), vec!["done", "half"]);
    }

    #[test]
    fn test_non_sgr_sequences_are_dropped() {
        let lines = to_lines("a\x1b[2Kb\r\n");
        assert_eq!(texts(&lines), vec!["ab"]);
    }

    #[test]
    fn test_multibyte_text_survives() {
        let lines = to_lines("\x1b[1mhéllo ✓\x1b[0m");
        assert_eq!(line_text(&lines[0]), "héllo ✓");
    }
}
