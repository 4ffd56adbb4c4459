//! Commit and file list rendering.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::{FileChangeKind, DESCRIPTION_ENTRY};
use crate::theme::Theme;
use crate::ui::app::{App, Focus, ListView};

use super::helpers::{truncate_path, truncate_str};

/// One list row before styling.
struct Item {
    badge: Option<(String, ratatui::style::Color)>,
    label: String,
    suffix: Option<String>,
}

/// Render the commit list.
pub fn render_commits(frame: &mut Frame, app: &mut App, area: Rect) {
    let commits = app.nav.commits();
    let more = if app.nav.walker().is_exhausted() {
        ""
    } else {
        "+"
    };
    let title = format!(" Commits ({}{}) ", commits.len(), more);

    let items: Vec<Item> = commits
        .iter()
        .map(|c| Item {
            badge: Some((c.short_id().to_string(), app.theme.accent)),
            label: c.title.clone(),
            suffix: None,
        })
        .collect();

    let selected = app.nav.state().commit;
    let focused = app.focus == Focus::Commits;
    render_list(
        frame,
        area,
        &app.theme,
        &title,
        &items,
        selected,
        focused,
        &mut app.commits_view,
        "No commits",
    );
}

/// Render the file list of the selected commit.
pub fn render_files(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = &app.theme;
    let mut items = vec![Item {
        badge: None,
        label: DESCRIPTION_ENTRY.to_string(),
        suffix: None,
    }];

    if let Some(error) = app.nav.diff_error() {
        items.push(Item {
            badge: Some(("!".to_string(), theme.error)),
            label: error.to_string(),
            suffix: None,
        });
    } else {
        items.extend(app.nav.files().iter().map(|f| {
            let color = match f.kind {
                FileChangeKind::Added => theme.added_fg,
                FileChangeKind::Deleted => theme.removed_fg,
                FileChangeKind::Modified => theme.warning,
                _ => theme.accent,
            };
            Item {
                badge: Some((f.kind.badge().to_string(), color)),
                label: f.display_path(),
                suffix: Some(format!("+{} -{}", f.additions(), f.deletions())),
            }
        }));
    }

    let title = format!(" Files ({}) ", items.len() - 1);
    let selected = app.nav.state().file;
    let focused = app.focus == Focus::Files;
    render_list(
        frame,
        area,
        &app.theme,
        &title,
        &items,
        selected,
        focused,
        &mut app.files_view,
        "",
    );
}

#[allow(clippy::too_many_arguments)]
fn render_list(
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
    title: &str,
    items: &[Item],
    selected: usize,
    focused: bool,
    view: &mut ListView,
    empty: &str,
) {
    let border_color = if focused {
        theme.border_active
    } else {
        theme.border_dim
    };
    let title_style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_muted)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(title.to_string(), title_style))
        .style(Style::default().bg(theme.bg));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let height = inner.height as usize;
    if height == 0 {
        return;
    }

    if items.is_empty() {
        let para = Paragraph::new(empty.to_string()).style(Style::default().fg(theme.text_muted));
        frame.render_widget(para, inner);
        return;
    }

    view.follow(selected, items.len(), height);
    let width = inner.width as usize;

    let lines: Vec<Line> = items
        .iter()
        .enumerate()
        .skip(view.scroll)
        .take(height)
        .map(|(idx, item)| list_line(item, idx == selected, width, theme))
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn list_line(item: &Item, is_selected: bool, width: usize, theme: &Theme) -> Line<'static> {
    let row_bg = if is_selected {
        theme.bg_selected
    } else {
        theme.bg
    };

    // Selection indicator (left edge)
    let indicator = if is_selected { "▌" } else { " " };
    let mut spans = vec![Span::styled(
        indicator,
        Style::default()
            .fg(if is_selected { theme.accent } else { row_bg })
            .bg(row_bg),
    )];
    let mut used = 1;

    if let Some((badge, color)) = &item.badge {
        spans.push(Span::styled(
            format!("{} ", badge),
            Style::default().fg(*color).bg(row_bg),
        ));
        used += badge.chars().count() + 1;
    }

    let suffix = item.suffix.as_deref().unwrap_or("");
    let suffix_len = if suffix.is_empty() {
        0
    } else {
        suffix.chars().count() + 1
    };
    let label_width = width.saturating_sub(used + suffix_len);
    let label = if item.suffix.is_some() {
        truncate_path(&item.label, label_width)
    } else {
        truncate_str(&item.label, label_width)
    };
    let label_len = label.chars().count();

    let mut label_style = Style::default().fg(theme.text_normal).bg(row_bg);
    if is_selected {
        label_style = label_style
            .fg(theme.text_bright)
            .add_modifier(Modifier::BOLD);
    }
    spans.push(Span::styled(label, label_style));

    let pad = width.saturating_sub(used + label_len + suffix.chars().count());
    spans.push(Span::styled(" ".repeat(pad), Style::default().bg(row_bg)));
    if !suffix.is_empty() {
        spans.push(Span::styled(
            suffix.to_string(),
            Style::default().fg(theme.text_dim).bg(row_bg),
        ));
    }

    Line::from(spans)
}
