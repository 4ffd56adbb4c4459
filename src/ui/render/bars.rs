//! Top and bottom bar rendering.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ui::app::{App, Focus};

/// Render the top bar: revision, position, layout and context size.
pub fn render_top_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bar = Style::default().bg(theme.bg_bar);
    let state = app.nav.state();

    let mut spans = vec![
        Span::styled(
            " quicklog ",
            Style::default()
                .fg(theme.bg)
                .bg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  ", bar),
        Span::styled(
            app.revision.clone(),
            bar.fg(theme.text_bright).add_modifier(Modifier::BOLD),
        ),
    ];

    if let Some(commit) = app.nav.selected_commit().filter(|c| c.id != app.revision) {
        spans.push(Span::styled("  ", bar));
        spans.push(Span::styled(commit.short_id().to_string(), bar.fg(theme.accent)));
        if commit.is_merge() {
            spans.push(Span::styled(" (merge)", bar.fg(theme.text_dim)));
        }
    }

    let total = app.nav.commits().len();
    let more = if app.nav.walker().is_exhausted() {
        ""
    } else {
        "+"
    };
    let right_text = format!(
        "commit {}/{}{}  {}  -U{}  ",
        (state.commit + 1).min(total),
        total,
        more,
        state.mode.label(),
        state.context
    );
    let right_len = right_text.chars().count();

    let left_len: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let padding_len = (area.width as usize)
        .saturating_sub(left_len)
        .saturating_sub(right_len);
    spans.push(Span::styled(" ".repeat(padding_len), bar));
    spans.push(Span::styled(right_text, bar.fg(theme.text_normal)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the bottom bar: errors first, then status, then key hints.
pub fn render_bottom_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bar = Style::default().bg(theme.bg_bar);

    let line = if let Some(error) = &app.ui.error {
        Line::from(vec![Span::styled(
            format!(" {} ", error),
            bar.fg(theme.error).add_modifier(Modifier::BOLD),
        )])
    } else if let Some(status) = &app.ui.status {
        Line::from(vec![Span::styled(
            format!(" {} ", status),
            bar.fg(theme.warning),
        )])
    } else {
        let focus = match app.focus {
            Focus::Commits => "commits",
            Focus::Files => "files",
            Focus::Content => "content",
        };
        Line::from(vec![
            Span::styled(format!(" [{}] ", focus), bar.fg(theme.accent)),
            Span::styled(
                " j/k: move  tab/1-3: focus  s: split/unified  +/-: context  r: reload  g/G: top/bottom  q: quit",
                bar.fg(theme.text_muted),
            ),
        ])
    };

    frame.render_widget(Paragraph::new(line).style(bar), area);
}
