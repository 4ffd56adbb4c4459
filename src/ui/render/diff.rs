//! Content pane rendering: commit description, unified and split diffs.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::{
    ChangeKind, Commit, Content, FileChangeKind, HunkRows, LineKind, RenderedDiff, SplitRow,
    UnifiedRow,
};
use crate::theme::Theme;
use crate::ui::app::{App, Focus};

use super::helpers::{gutter, gutter_digits, truncate_str, SpanBuilder};

/// One display row of a commit description.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DescRow {
    Title(String),
    Text(String),
    Field(&'static str, String),
    Blank,
}

fn description_rows(commit: &Commit) -> Vec<DescRow> {
    let mut rows = vec![DescRow::Title(commit.title.clone()), DescRow::Blank];
    if !commit.body.is_empty() {
        rows.extend(commit.body.iter().cloned().map(DescRow::Text));
        rows.push(DescRow::Blank);
    }
    rows.extend(
        commit
            .committers
            .iter()
            .map(|c| DescRow::Field("Committer", c.clone())),
    );
    rows.extend(
        commit
            .authors
            .iter()
            .map(|a| DescRow::Field("Author", a.clone())),
    );
    rows.push(DescRow::Field("Commit", commit.id.clone()));
    // Pseudo-commits for uncommitted changes carry no tree
    if commit.tree.is_empty() {
        return rows;
    }
    if commit.parents.is_empty() {
        rows.push(DescRow::Field("Parent", "(root commit)".to_string()));
    } else {
        rows.extend(
            commit
                .parents
                .iter()
                .map(|p| DescRow::Field("Parent", p.clone())),
        );
    }
    rows.push(DescRow::Field("Tree", commit.tree.clone()));
    rows
}

/// Rows the content pane needs for `content`.
pub fn content_row_count(content: &Content) -> usize {
    match content {
        Content::Description(commit) => description_rows(commit).len(),
        Content::Diff(diff) if diff.hunks.is_empty() => 1,
        Content::Diff(diff) => diff.row_count(),
        Content::Error(_) | Content::Empty => 1,
    }
}

/// A display row of a rendered diff.
enum DiffRow<'a> {
    Header(&'a str),
    Unified(&'a UnifiedRow),
    Split(&'a SplitRow),
}

fn diff_rows(diff: &RenderedDiff) -> impl Iterator<Item = DiffRow<'_>> {
    diff.hunks.iter().flat_map(|hunk| {
        let (unified, split): (&[UnifiedRow], &[SplitRow]) = match &hunk.rows {
            HunkRows::Unified(rows) => (rows.as_slice(), &[]),
            HunkRows::Split(rows) => (&[], rows.as_slice()),
        };
        std::iter::once(DiffRow::Header(hunk.header.as_str()))
            .chain(unified.iter().map(DiffRow::Unified))
            .chain(split.iter().map(DiffRow::Split))
    })
}

/// Render the content pane.
pub fn render_content(frame: &mut Frame, app: &mut App, area: Rect) {
    let is_focused = app.focus == Focus::Content;
    let theme = &app.theme;
    let border_color = if is_focused {
        theme.border_active
    } else {
        theme.border_dim
    };
    let title_style = if is_focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_muted)
    };

    let title = match &app.content {
        Content::Description(commit) => format!(" {} ", commit.short_id()),
        Content::Diff(diff) => format!(" {} ", diff.path),
        Content::Error(_) => " Error ".to_string(),
        Content::Empty => " Content ".to_string(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(title, title_style))
        .style(Style::default().bg(theme.bg));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    app.viewer.height = inner.height as usize;
    app.viewer.scroll_y = app.viewer.scroll_y.min(app.viewer.max_scroll());

    let height = inner.height as usize;
    let width = inner.width as usize;
    let scroll = app.viewer.scroll_y;
    let theme = &app.theme;

    let lines: Vec<Line> = match &app.content {
        Content::Description(commit) => description_rows(commit)
            .into_iter()
            .skip(scroll)
            .take(height)
            .map(|row| description_line(row, theme))
            .collect(),
        Content::Diff(diff) if diff.hunks.is_empty() => {
            let kind = app
                .nav
                .files()
                .get(app.nav.state().file.saturating_sub(1))
                .map(|f| f.kind);
            vec![Line::from(Span::styled(
                no_hunks_message(kind),
                Style::default().fg(theme.text_muted),
            ))]
        }
        Content::Diff(diff) => {
            let digits = gutter_digits(diff.max_line_number());
            diff_rows(diff)
                .skip(scroll)
                .take(height)
                .map(|row| match row {
                    DiffRow::Header(header) => Line::from(Span::styled(
                        truncate_str(header, width),
                        Style::default().fg(theme.hunk_header),
                    )),
                    DiffRow::Unified(row) => unified_line(row, width, digits, theme),
                    DiffRow::Split(row) => split_line(row, width, digits, theme),
                })
                .collect()
        }
        Content::Error(message) => vec![Line::from(Span::styled(
            format!("✗ {}", message),
            Style::default()
                .fg(theme.error)
                .add_modifier(Modifier::BOLD),
        ))],
        Content::Empty => vec![Line::from(Span::styled(
            "Nothing to show",
            Style::default().fg(theme.text_muted),
        ))],
    };

    frame.render_widget(Paragraph::new(lines), inner);
}

fn no_hunks_message(kind: Option<FileChangeKind>) -> &'static str {
    match kind {
        Some(FileChangeKind::Binary) => "Binary file changed",
        Some(FileChangeKind::Renamed) => "Renamed without content changes",
        Some(FileChangeKind::ModeChanged) => "File mode changed",
        _ => "No textual changes",
    }
}

fn description_line(row: DescRow, theme: &Theme) -> Line<'static> {
    match row {
        DescRow::Title(title) => Line::from(Span::styled(
            title,
            Style::default()
                .fg(theme.text_bright)
                .add_modifier(Modifier::BOLD),
        )),
        DescRow::Text(text) => Line::from(Span::styled(
            text,
            Style::default().fg(theme.text_normal),
        )),
        DescRow::Field(label, value) => Line::from(vec![
            Span::styled(
                format!("{:<11}", format!("{}:", label)),
                Style::default().fg(theme.text_dim),
            ),
            Span::styled(value, Style::default().fg(theme.text_normal)),
        ]),
        DescRow::Blank => Line::default(),
    }
}

fn unified_line(row: &UnifiedRow, width: usize, digits: usize, theme: &Theme) -> Line<'static> {
    let (marker, fg, bg) = match row.kind {
        LineKind::Context => (' ', theme.text_normal, theme.bg),
        LineKind::Added => ('+', theme.added_fg, theme.diff_insert_bg),
        LineKind::Removed => ('-', theme.removed_fg, theme.diff_delete_bg),
    };
    let gutter_style = Style::default().fg(theme.line_number).bg(theme.bg);
    let style = Style::default().fg(fg).bg(bg);

    let mut builder = SpanBuilder::new();
    builder.push_str(&gutter(row.old_line, digits), gutter_style);
    builder.push_str(&gutter(row.new_line, digits), gutter_style);
    builder.push_char(marker, style);
    let text_width = width.saturating_sub((digits + 1) * 2 + 1);
    builder.push_cell(&row.text, text_width, style, &[], style);
    Line::from(builder.finish())
}

fn split_line(row: &SplitRow, width: usize, digits: usize, theme: &Theme) -> Line<'static> {
    let half = width.saturating_sub(1) / 2;
    let cell_width = half.saturating_sub(digits + 1);
    let gutter_style = Style::default().fg(theme.line_number).bg(theme.bg);

    let (left_bg, right_bg) = match row.kind {
        ChangeKind::Equal => (theme.bg, theme.bg),
        ChangeKind::Delete => (theme.diff_delete_bg, theme.diff_empty_bg),
        ChangeKind::Insert => (theme.diff_empty_bg, theme.diff_insert_bg),
        ChangeKind::Replace => (theme.diff_delete_bg, theme.diff_insert_bg),
    };
    let (left_fg, right_fg) = match row.kind {
        ChangeKind::Equal => (theme.text_normal, theme.text_normal),
        _ => (theme.removed_fg, theme.added_fg),
    };

    let mut builder = SpanBuilder::new();

    let left_style = Style::default().fg(left_fg).bg(left_bg);
    builder.push_str(
        &gutter(row.old.as_ref().map(|l| l.line_num), digits),
        gutter_style,
    );
    builder.push_cell(
        row.old.as_ref().map_or("", |l| l.content.as_str()),
        cell_width,
        left_style,
        &row.old_spans,
        left_style.bg(theme.inline_delete_bg),
    );

    builder.push_char('│', Style::default().fg(theme.border_dim).bg(theme.bg));

    let right_style = Style::default().fg(right_fg).bg(right_bg);
    builder.push_str(
        &gutter(row.new.as_ref().map(|l| l.line_num), digits),
        gutter_style,
    );
    builder.push_cell(
        row.new.as_ref().map_or("", |l| l.content.as_str()),
        cell_width,
        right_style,
        &row.new_spans,
        right_style.bg(theme.inline_insert_bg),
    );

    Line::from(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{render, DiffFile, DiffLine, Hunk, RenderMode};
    use std::rc::Rc;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn sample_file() -> DiffFile {
        let mut hunk = Hunk::new((10, 3), (10, 3));
        hunk.lines = vec![
            DiffLine::new(LineKind::Context, "p"),
            DiffLine::new(LineKind::Removed, "q"),
            DiffLine::new(LineKind::Added, "r"),
            DiffLine::new(LineKind::Context, "s"),
        ];
        let mut file = DiffFile::new("f.txt", "f.txt");
        file.hunks.push(hunk);
        file
    }

    #[test]
    fn description_layout() {
        let commit = Commit::parse(
            "abc1234def",
            "tree t1\nparent p1\nauthor A <a@x> 1 +0000\ncommitter C <c@x> 1 +0000\n\nTitle\n\nBody\n",
        );
        let rows = description_rows(&commit);
        assert_eq!(rows[0], DescRow::Title("Title".into()));
        assert_eq!(rows[2], DescRow::Text("Body".into()));
        assert!(rows.contains(&DescRow::Field("Commit", "abc1234def".into())));
        assert!(rows.contains(&DescRow::Field("Parent", "p1".into())));
        assert_eq!(rows.last(), Some(&DescRow::Field("Tree", "t1".into())));

        let count = content_row_count(&Content::Description(Rc::new(commit)));
        assert_eq!(count, rows.len());
    }

    #[test]
    fn root_commit_description() {
        let commit = Commit::parse("r", "tree t\n\nInitial\n");
        let rows = description_rows(&commit);
        assert!(rows.contains(&DescRow::Field("Parent", "(root commit)".into())));
    }

    #[test]
    fn worktree_description_has_no_tree_rows() {
        let commit = Commit::parse("worktree", "\nUnstaged changes\n\nAgainst the index.\n");
        let rows = description_rows(&commit);
        assert_eq!(rows.last(), Some(&DescRow::Field("Commit", "worktree".into())));
        assert!(!rows.iter().any(|r| matches!(r, DescRow::Field("Parent", _))));
    }

    #[test]
    fn diff_row_counts_include_headers() {
        let diff = render(&sample_file(), RenderMode::Unified, 3);
        assert_eq!(content_row_count(&Content::Diff(diff.clone())), 5);
        assert_eq!(diff_rows(&diff).count(), 5);

        let split = render(&sample_file(), RenderMode::Split, 3);
        assert_eq!(content_row_count(&Content::Diff(split)), 4);
    }

    #[test]
    fn unified_line_shows_both_gutters() {
        let diff = render(&sample_file(), RenderMode::Unified, 3);
        let HunkRows::Unified(rows) = &diff.hunks[0].rows else {
            panic!("expected unified rows");
        };
        let theme = Theme::default();
        let text = line_text(&unified_line(&rows[1], 20, 4, &theme));
        assert_eq!(text, "  11      -q        ");
        assert_eq!(text.chars().count(), 20);
    }

    #[test]
    fn split_line_places_columns() {
        let diff = render(&sample_file(), RenderMode::Split, 3);
        let HunkRows::Split(rows) = &diff.hunks[0].rows else {
            panic!("expected split rows");
        };
        let theme = Theme::default();
        let text = line_text(&split_line(&rows[1], 21, 4, &theme));
        assert_eq!(text, "  11 q    │  11 r    ");
    }

    #[test]
    fn wide_line_numbers_keep_columns_aligned() {
        let mut hunk = Hunk::new((9999, 2), (9999, 2));
        hunk.lines = vec![
            DiffLine::new(LineKind::Context, "a"),
            DiffLine::new(LineKind::Removed, "b"),
            DiffLine::new(LineKind::Added, "c"),
        ];
        let mut file = DiffFile::new("f.txt", "f.txt");
        file.hunks.push(hunk);
        let diff = render(&file, RenderMode::Split, 3);
        let digits = gutter_digits(diff.max_line_number());
        assert_eq!(digits, 5);

        let HunkRows::Split(rows) = &diff.hunks[0].rows else {
            panic!("expected split rows");
        };
        let theme = Theme::default();
        let first = line_text(&split_line(&rows[0], 23, digits, &theme));
        let second = line_text(&split_line(&rows[1], 23, digits, &theme));
        assert_eq!(first, " 9999 a    │ 9999 a    ");
        assert_eq!(second, "10000 b    │10000 c    ");
        assert_eq!(first.find('│'), second.find('│'));
    }

    #[test]
    fn no_hunk_messages() {
        assert_eq!(
            no_hunks_message(Some(FileChangeKind::Binary)),
            "Binary file changed"
        );
        assert_eq!(no_hunks_message(None), "No textual changes");
    }
}
