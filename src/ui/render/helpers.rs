//! Shared rendering helpers and constants.

use ratatui::style::Style;
use ratatui::text::Span;

use crate::core::InlineSpan;

/// Line number columns never get narrower than this.
pub const MIN_GUTTER_DIGITS: usize = 4;

/// Tab stop width for display alignment.
pub const TAB_WIDTH: usize = 8;

/// Sanitize control characters.
pub fn sanitize_char(c: char) -> char {
    match c {
        '\x00'..='\x1f' | '\x7f' => '\u{FFFD}',
        _ => c,
    }
}

/// Columns a tab advances from `col`.
pub fn tab_width_at(col: usize) -> usize {
    let rem = col % TAB_WIDTH;
    if rem == 0 {
        TAB_WIDTH
    } else {
        TAB_WIDTH - rem
    }
}

/// Truncate to `max_len` chars, ending with an ellipsis when cut.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len == 0 {
        String::new()
    } else {
        let truncated: String = s.chars().take(max_len - 1).collect();
        format!("{}…", truncated)
    }
}

/// Truncate a path from the left so the file name stays visible.
pub fn truncate_path(path: &str, max_len: usize) -> String {
    let char_count = path.chars().count();
    if char_count > max_len && max_len > 0 {
        let skip = char_count - max_len + 1;
        let truncated: String = path.chars().skip(skip).collect();
        format!("…{}", truncated)
    } else {
        path.to_string()
    }
}

/// Digits needed to show `max_line`.
pub fn gutter_digits(max_line: usize) -> usize {
    max_line.to_string().len().max(MIN_GUTTER_DIGITS)
}

/// Right-aligned line number plus a separator, blank when absent.
/// Always `digits + 1` columns wide.
pub fn gutter(line: Option<usize>, digits: usize) -> String {
    match line {
        Some(n) => format!("{:>width$} ", n, width = digits),
        None => " ".repeat(digits + 1),
    }
}

/// Builder for efficient span construction.
pub struct SpanBuilder {
    spans: Vec<Span<'static>>,
    pending_style: Option<Style>,
    pending_text: String,
}

impl SpanBuilder {
    pub fn new() -> Self {
        Self {
            spans: Vec::new(),
            pending_style: None,
            pending_text: String::new(),
        }
    }

    pub fn push_char(&mut self, ch: char, style: Style) {
        if self.pending_style != Some(style) {
            self.flush();
            self.pending_style = Some(style);
        }
        self.pending_text.push(ch);
    }

    pub fn push_spaces(&mut self, count: usize, style: Style) {
        if count == 0 {
            return;
        }
        if self.pending_style != Some(style) {
            self.flush();
            self.pending_style = Some(style);
        }
        self.pending_text.extend(std::iter::repeat(' ').take(count));
    }

    pub fn push_str(&mut self, text: &str, style: Style) {
        for ch in text.chars() {
            self.push_char(ch, style);
        }
    }

    /// Write `text` into a cell exactly `width` columns wide.
    ///
    /// Tabs expand to the next stop, long text is clipped and short text is
    /// padded with `style`. Bytes covered by a changed inline span use
    /// `inline_style` instead.
    pub fn push_cell(
        &mut self,
        text: &str,
        width: usize,
        style: Style,
        inline: &[InlineSpan],
        inline_style: Style,
    ) {
        let mut col = 0;
        for (byte, ch) in text.char_indices() {
            if col >= width {
                break;
            }
            let changed = inline
                .iter()
                .any(|s| s.changed && byte >= s.start && byte < s.end);
            let active = if changed { inline_style } else { style };

            if ch == '\t' {
                let advance = tab_width_at(col).min(width - col);
                self.push_spaces(advance, active);
                col += advance;
            } else {
                self.push_char(sanitize_char(ch), active);
                col += 1;
            }
        }
        self.push_spaces(width.saturating_sub(col), style);
    }

    fn flush(&mut self) {
        if !self.pending_text.is_empty() {
            let style = self.pending_style.unwrap_or_default();
            self.spans
                .push(Span::styled(std::mem::take(&mut self.pending_text), style));
        }
    }

    pub fn finish(mut self) -> Vec<Span<'static>> {
        self.flush();
        self.spans
    }
}

impl Default for SpanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn text(spans: &[Span<'static>]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn truncation() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 6), "hello…");
        assert_eq!(truncate_str("abc", 0), "");
        assert_eq!(truncate_path("src/core/render.rs", 10), "…render.rs");
    }

    #[test]
    fn gutters() {
        assert_eq!(gutter(Some(12), 4), "  12 ");
        assert_eq!(gutter(None, 4), "     ");
        assert_eq!(gutter(Some(12345), 5), "12345 ");
        assert_eq!(gutter(None, 5), "      ");
        assert_eq!(gutter_digits(999), 4);
        assert_eq!(gutter_digits(10000), 5);
    }

    #[test]
    fn cell_pads_and_clips() {
        let mut builder = SpanBuilder::new();
        builder.push_cell("ab", 5, Style::default(), &[], Style::default());
        assert_eq!(text(&builder.finish()), "ab   ");

        let mut builder = SpanBuilder::new();
        builder.push_cell("abcdefgh", 3, Style::default(), &[], Style::default());
        assert_eq!(text(&builder.finish()), "abc");
    }

    #[test]
    fn cell_expands_tabs() {
        let mut builder = SpanBuilder::new();
        builder.push_cell("a\tb", 12, Style::default(), &[], Style::default());
        assert_eq!(text(&builder.finish()), "a       b   ");
    }

    #[test]
    fn cell_marks_inline_changes() {
        let base = Style::default().bg(Color::Black);
        let hot = Style::default().bg(Color::Red);
        let spans = [
            InlineSpan {
                start: 0,
                end: 2,
                changed: false,
            },
            InlineSpan {
                start: 2,
                end: 4,
                changed: true,
            },
        ];
        let mut builder = SpanBuilder::new();
        builder.push_cell("abcd", 4, base, &spans, hot);
        let out = builder.finish();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].content, "ab");
        assert_eq!(out[1].content, "cd");
        assert_eq!(out[1].style, hot);
    }

    #[test]
    fn control_chars_are_replaced() {
        assert_eq!(sanitize_char('\x1b'), '\u{FFFD}');
        assert_eq!(sanitize_char('x'), 'x');
    }
}
