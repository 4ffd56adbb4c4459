//! Line alignment of parsed hunks for unified and split display.

use serde::{Deserialize, Serialize};

use super::{inline_spans, DiffFile, DiffLine, Hunk, InlineSpan, LineKind};

/// How a diff is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Single column with inline +/- markers.
    Unified,
    /// Old and new side by side.
    #[default]
    Split,
}

impl RenderMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Unified => Self::Split,
            Self::Split => Self::Unified,
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unified => "unified",
            Self::Split => "split",
        }
    }
}

/// A row of unified output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedRow {
    /// Line classification, for styling.
    pub kind: LineKind,
    /// Old file line number, when the line exists there.
    pub old_line: Option<usize>,
    /// New file line number, when the line exists there.
    pub new_line: Option<usize>,
    /// Line content.
    pub text: String,
}

/// A single line reference in the split view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRef {
    /// Line number in its file.
    pub line_num: usize,
    /// The line content.
    pub content: String,
}

/// Kind of change for a split row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Both sides are equal.
    Equal,
    /// Line was deleted from old (no corresponding new line).
    Delete,
    /// Line was inserted in new (no corresponding old line).
    Insert,
    /// Line was replaced (both old and new present, but different).
    Replace,
}

/// A single row in the split view.
/// Maps to 0..1 old line + 0..1 new line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRow {
    /// Left column (old file), blank when `None`.
    pub old: Option<LineRef>,
    /// Right column (new file), blank when `None`.
    pub new: Option<LineRef>,
    /// The kind of change.
    pub kind: ChangeKind,
    /// Inline emphasis for the left column of a replaced row.
    pub old_spans: Vec<InlineSpan>,
    /// Inline emphasis for the right column of a replaced row.
    pub new_spans: Vec<InlineSpan>,
}

impl SplitRow {
    fn new(old: Option<LineRef>, new: Option<LineRef>) -> Self {
        let kind = match (&old, &new) {
            (Some(_), Some(_)) => ChangeKind::Replace,
            (Some(_), None) => ChangeKind::Delete,
            (None, Some(_)) => ChangeKind::Insert,
            (None, None) => ChangeKind::Equal,
        };
        let (old_spans, new_spans) = match (&old, &new) {
            (Some(o), Some(n)) => inline_spans(&o.content, &n.content),
            _ => (Vec::new(), Vec::new()),
        };
        Self {
            old,
            new,
            kind,
            old_spans,
            new_spans,
        }
    }

    fn equal(old_line: usize, new_line: usize, content: &str) -> Self {
        Self {
            old: Some(LineRef {
                line_num: old_line,
                content: content.to_string(),
            }),
            new: Some(LineRef {
                line_num: new_line,
                content: content.to_string(),
            }),
            kind: ChangeKind::Equal,
            old_spans: Vec::new(),
            new_spans: Vec::new(),
        }
    }
}

/// Rows of one hunk in the requested layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HunkRows {
    /// Unified rows.
    Unified(Vec<UnifiedRow>),
    /// Split rows.
    Split(Vec<SplitRow>),
}

impl HunkRows {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Unified(rows) => rows.len(),
            Self::Split(rows) => rows.len(),
        }
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest line number on either side, 0 when there are none.
    pub fn max_line_number(&self) -> usize {
        match self {
            Self::Unified(rows) => rows
                .iter()
                .flat_map(|r| [r.old_line, r.new_line])
                .flatten()
                .max()
                .unwrap_or(0),
            Self::Split(rows) => rows
                .iter()
                .flat_map(|r| [r.old.as_ref(), r.new.as_ref()])
                .flatten()
                .map(|l| l.line_num)
                .max()
                .unwrap_or(0),
        }
    }
}

/// A rendered hunk: its header and aligned rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedHunk {
    /// `@@ ... @@` header text.
    pub header: String,
    /// Aligned rows.
    pub rows: HunkRows,
}

/// Displayable block for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiff {
    /// Layout used.
    pub mode: RenderMode,
    /// Context size the diff was fetched with.
    pub context: usize,
    /// Path shown above the block.
    pub path: String,
    /// Rendered hunks in order.
    pub hunks: Vec<RenderedHunk>,
}

impl RenderedDiff {
    /// Display rows including one header row per hunk.
    pub fn row_count(&self) -> usize {
        self.hunks.iter().map(|h| h.rows.len() + 1).sum()
    }

    /// Largest line number in any hunk, for sizing the gutter.
    pub fn max_line_number(&self) -> usize {
        self.hunks
            .iter()
            .map(|h| h.rows.max_line_number())
            .max()
            .unwrap_or(0)
    }
}

/// Render a parsed file. Stateless: the same inputs give the same output.
pub fn render(file: &DiffFile, mode: RenderMode, context: usize) -> RenderedDiff {
    let _timer = crate::metrics::Timer::start("render_diff");
    let hunks = file
        .hunks
        .iter()
        .map(|hunk| RenderedHunk {
            header: hunk.header(),
            rows: match mode {
                RenderMode::Unified => HunkRows::Unified(render_unified(hunk)),
                RenderMode::Split => HunkRows::Split(render_split(hunk)),
            },
        })
        .collect();

    RenderedDiff {
        mode,
        context,
        path: file.display_path(),
        hunks,
    }
}

/// Unified rows with running old/new line counters.
pub fn render_unified(hunk: &Hunk) -> Vec<UnifiedRow> {
    let mut old_line = hunk.old_range.0;
    let mut new_line = hunk.new_range.0;

    hunk.lines
        .iter()
        .map(|line| {
            let (old, new) = match line.kind {
                LineKind::Context => {
                    let numbers = (Some(old_line), Some(new_line));
                    old_line += 1;
                    new_line += 1;
                    numbers
                }
                LineKind::Removed => {
                    old_line += 1;
                    (Some(old_line - 1), None)
                }
                LineKind::Added => {
                    new_line += 1;
                    (None, Some(new_line - 1))
                }
            };
            UnifiedRow {
                kind: line.kind,
                old_line: old,
                new_line: new,
                text: line.text.clone(),
            }
        })
        .collect()
}

/// Split rows with positional pairing of removed/added runs.
///
/// A removed run immediately followed by an added run is paired index by
/// index; leftovers on either side get a blank opposite column.
pub fn render_split(hunk: &Hunk) -> Vec<SplitRow> {
    let lines = &hunk.lines;
    let mut rows = Vec::with_capacity(lines.len());
    let mut old_line = hunk.old_range.0;
    let mut new_line = hunk.new_range.0;
    let mut i = 0;

    while i < lines.len() {
        if lines[i].kind == LineKind::Context {
            rows.push(SplitRow::equal(old_line, new_line, &lines[i].text));
            old_line += 1;
            new_line += 1;
            i += 1;
            continue;
        }

        let removed = take_run(lines, &mut i, LineKind::Removed);
        let added = take_run(lines, &mut i, LineKind::Added);

        for j in 0..removed.len().max(added.len()) {
            let old = removed.get(j).map(|l| LineRef {
                line_num: old_line + j,
                content: l.text.clone(),
            });
            let new = added.get(j).map(|l| LineRef {
                line_num: new_line + j,
                content: l.text.clone(),
            });
            rows.push(SplitRow::new(old, new));
        }

        old_line += removed.len();
        new_line += added.len();
    }

    rows
}

/// Advance `i` over consecutive lines of `kind`, returning them.
fn take_run<'a>(lines: &'a [DiffLine], i: &mut usize, kind: LineKind) -> &'a [DiffLine] {
    let start = *i;
    while *i < lines.len() && lines[*i].kind == kind {
        *i += 1;
    }
    &lines[start..*i]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hunk(old_start: usize, new_start: usize, lines: &[(LineKind, &str)]) -> Hunk {
        let mut hunk = Hunk::new((old_start, 0), (new_start, 0));
        hunk.lines = lines
            .iter()
            .map(|(kind, text)| DiffLine::new(*kind, *text))
            .collect();
        let (old, new) = hunk.observed_counts();
        hunk.old_range.1 = old;
        hunk.new_range.1 = new;
        hunk
    }

    fn cells(rows: &[SplitRow]) -> Vec<(&str, &str)> {
        rows.iter()
            .map(|r| {
                (
                    r.old.as_ref().map_or("", |l| l.content.as_str()),
                    r.new.as_ref().map_or("", |l| l.content.as_str()),
                )
            })
            .collect()
    }

    use LineKind::{Added, Context, Removed};

    #[test]
    fn split_more_removed_than_added() {
        let h = hunk(
            1,
            1,
            &[
                (Removed, "a"),
                (Removed, "b"),
                (Removed, "c"),
                (Added, "x"),
                (Added, "y"),
            ],
        );
        let rows = render_split(&h);
        assert_eq!(cells(&rows), vec![("a", "x"), ("b", "y"), ("c", "")]);
        assert_eq!(rows[0].kind, ChangeKind::Replace);
        assert_eq!(rows[2].kind, ChangeKind::Delete);
        assert!(rows[2].new.is_none());
    }

    #[test]
    fn split_more_added_than_removed() {
        let h = hunk(
            1,
            1,
            &[(Removed, "a"), (Added, "x"), (Added, "y"), (Added, "z")],
        );
        let rows = render_split(&h);
        assert_eq!(cells(&rows), vec![("a", "x"), ("", "y"), ("", "z")]);
        assert_eq!(rows[1].kind, ChangeKind::Insert);
        assert_eq!(rows[2].new.as_ref().unwrap().line_num, 3);
    }

    #[test]
    fn split_context_on_both_sides() {
        let h = hunk(5, 7, &[(Context, "p"), (Removed, "q"), (Context, "s")]);
        let rows = render_split(&h);
        assert_eq!(cells(&rows), vec![("p", "p"), ("q", ""), ("s", "s")]);
        assert_eq!(rows[0].kind, ChangeKind::Equal);
        assert_eq!(rows[2].old.as_ref().unwrap().line_num, 7);
        assert_eq!(rows[2].new.as_ref().unwrap().line_num, 8);
    }

    #[test]
    fn split_added_before_removed_is_not_paired() {
        let h = hunk(1, 1, &[(Added, "x"), (Removed, "a"), (Added, "y")]);
        let rows = render_split(&h);
        assert_eq!(cells(&rows), vec![("", "x"), ("a", "y")]);
    }

    #[test]
    fn split_replaced_rows_carry_inline_spans() {
        let h = hunk(1, 1, &[(Removed, "let x = 1;"), (Added, "let x = 2;")]);
        let rows = render_split(&h);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].old_spans.iter().any(|s| s.changed));
        assert!(rows[0].new_spans.iter().any(|s| s.changed));
    }

    #[test]
    fn unified_line_numbers() {
        let h = hunk(
            10,
            10,
            &[(Context, "p"), (Removed, "q"), (Added, "r"), (Context, "s")],
        );
        let rows = render_unified(&h);
        let numbers: Vec<_> = rows.iter().map(|r| (r.old_line, r.new_line)).collect();
        assert_eq!(
            numbers,
            vec![
                (Some(10), Some(10)),
                (Some(11), None),
                (None, Some(11)),
                (Some(12), Some(12)),
            ]
        );
        assert_eq!(rows[1].kind, Removed);
        assert_eq!(rows[2].text, "r");
    }

    #[test]
    fn render_selects_layout() {
        let mut file = DiffFile::new("f", "f");
        file.hunks.push(hunk(1, 1, &[(Removed, "a"), (Added, "b")]));
        file.hunks.push(hunk(9, 9, &[(Context, "c")]));

        let split = render(&file, RenderMode::Split, 3);
        assert!(matches!(split.hunks[0].rows, HunkRows::Split(_)));
        assert_eq!(split.row_count(), 1 + 1 + 1 + 1);
        assert_eq!(split.context, 3);
        assert_eq!(split.hunks[0].header, "@@ -1,1 +1,1 @@");

        let unified = render(&file, RenderMode::Unified, 0);
        assert!(matches!(unified.hunks[0].rows, HunkRows::Unified(_)));
        assert_eq!(unified.row_count(), 2 + 1 + 1 + 1);
    }

    #[test]
    fn render_file_without_hunks() {
        let file = DiffFile::new("old", "new");
        let rendered = render(&file, RenderMode::Split, 3);
        assert!(rendered.hunks.is_empty());
        assert_eq!(rendered.path, "old → new");
    }

    #[test]
    fn max_line_number_spans_both_sides() {
        let mut file = DiffFile::new("f", "f");
        file.hunks.push(hunk(9998, 9990, &[(Context, "a"), (Removed, "b"), (Context, "c")]));
        file.hunks.push(hunk(3, 3, &[(Added, "d")]));

        assert_eq!(render(&file, RenderMode::Split, 3).max_line_number(), 10000);
        assert_eq!(render(&file, RenderMode::Unified, 3).max_line_number(), 10000);
        assert_eq!(render(&DiffFile::new("x", "x"), RenderMode::Split, 3).max_line_number(), 0);
    }

    #[test]
    fn mode_toggle() {
        assert_eq!(RenderMode::default(), RenderMode::Split);
        assert_eq!(RenderMode::Split.toggled(), RenderMode::Unified);
        assert_eq!(RenderMode::Unified.label(), "unified");
    }
}
