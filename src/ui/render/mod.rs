//! UI rendering with ratatui.
//!
//! Layout: a top bar, three columns (commits, files, content) and a bottom
//! bar. A single accent color marks the focused column.

mod bars;
mod diff;
mod helpers;
mod sidebar;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Frame,
};

use super::app::App;

pub use diff::content_row_count;

/// Main render function.
pub fn render(frame: &mut Frame, app: &mut App) {
    let _timer = crate::metrics::Timer::start("render_frame");

    let bg_block = Block::default().style(Style::default().bg(app.theme.bg));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Top bar
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Bottom bar
        ])
        .split(frame.area());

    bars::render_top_bar(frame, app, chunks[0]);
    render_main(frame, app, chunks[1]);
    bars::render_bottom_bar(frame, app, chunks[2]);
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25), // Commits
            Constraint::Percentage(20), // Files
            Constraint::Min(0),         // Content
        ])
        .split(area);

    sidebar::render_commits(frame, app, chunks[0]);
    sidebar::render_files(frame, app, chunks[1]);
    diff::render_content(frame, app, chunks[2]);
}
