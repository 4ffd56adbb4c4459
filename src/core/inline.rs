//! Intra-line change emphasis for replaced rows.

use similar::{ChangeTag, TextDiff};

/// Lines sharing less than this fraction of words get no inline emphasis.
const MIN_SIMILARITY: f32 = 0.5;

/// Byte range within a line and whether it changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineSpan {
    /// Start byte offset.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Whether this range differs from the other side.
    pub changed: bool,
}

/// Word-level spans for an old/new line pair.
///
/// Returns empty vectors when the lines are too dissimilar for emphasis to
/// help; callers then style the whole line.
pub fn inline_spans(old: &str, new: &str) -> (Vec<InlineSpan>, Vec<InlineSpan>) {
    let diff = TextDiff::from_words(old, new);
    if diff.ratio() < MIN_SIMILARITY {
        return (Vec::new(), Vec::new());
    }

    let mut old_spans = Vec::new();
    let mut new_spans = Vec::new();
    let mut old_pos = 0;
    let mut new_pos = 0;

    for change in diff.iter_all_changes() {
        let len = change.value().len();
        match change.tag() {
            ChangeTag::Equal => {
                push_span(&mut old_spans, old_pos, len, false);
                push_span(&mut new_spans, new_pos, len, false);
                old_pos += len;
                new_pos += len;
            }
            ChangeTag::Delete => {
                push_span(&mut old_spans, old_pos, len, true);
                old_pos += len;
            }
            ChangeTag::Insert => {
                push_span(&mut new_spans, new_pos, len, true);
                new_pos += len;
            }
        }
    }

    (old_spans, new_spans)
}

/// Append a span, merging with the previous one when the flag matches.
fn push_span(spans: &mut Vec<InlineSpan>, start: usize, len: usize, changed: bool) {
    if len == 0 {
        return;
    }
    if let Some(last) = spans.last_mut() {
        if last.changed == changed && last.end == start {
            last.end = start + len;
            return;
        }
    }
    spans.push(InlineSpan {
        start,
        end: start + len,
        changed,
    });
}
