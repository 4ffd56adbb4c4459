//! Application state and lifecycle.

use crate::config::Settings;
use crate::core::{Content, NavigationState, Navigator, ObjectReader, Transition};
use crate::theme::Theme;

mod navigation;
mod state;

pub use state::{Focus, ListView, UiState, ViewerState};

use super::render::content_row_count;

/// Application state.
pub struct App {
    /// History navigation over the selected backend.
    pub nav: Navigator<Box<dyn ObjectReader>>,
    /// Revision the walk started from, as given by the user.
    pub revision: String,
    /// Current focus.
    pub focus: Focus,
    /// Commit list scroll.
    pub commits_view: ListView,
    /// File list scroll.
    pub files_view: ListView,
    /// Content pane viewport.
    pub viewer: ViewerState,
    /// Content for the current selection.
    pub content: Content,
    /// UI messages and redraw flag.
    pub ui: UiState,
    /// Current color theme.
    pub theme: Theme,
    /// Should the app quit?
    pub should_quit: bool,
}

impl App {
    /// Create the app and load the first screen of history.
    pub fn new(reader: Box<dyn ObjectReader>, settings: &Settings) -> anyhow::Result<Self> {
        let nav = Navigator::new(reader, &settings.revision, settings.navigator_options())?;
        let theme = Theme::load(&settings.theme);

        let mut app = Self {
            nav,
            revision: settings.revision.clone(),
            focus: Focus::Commits,
            commits_view: ListView::default(),
            files_view: ListView::default(),
            viewer: ViewerState::default(),
            content: Content::Empty,
            ui: UiState {
                dirty: true,
                ..Default::default()
            },
            theme,
            should_quit: false,
        };
        app.refresh_content();
        Ok(app)
    }

    /// Current navigation state.
    pub fn state(&self) -> NavigationState {
        self.nav.state()
    }

    /// Apply a navigation transition and refresh derived state.
    pub fn apply(&mut self, transition: Transition) {
        let before = self.nav.state();
        if !self.nav.apply(transition) {
            self.sync_status();
            return;
        }

        let after = self.nav.state();
        if before.commit != after.commit || before.file != after.file {
            self.viewer.scroll_y = 0;
        }
        self.refresh_content();
        self.ui.dirty = true;
    }

    /// Rebuild the content pane from the navigator.
    fn refresh_content(&mut self) {
        self.content = self.nav.content();
        self.viewer.rows = content_row_count(&self.content);
        self.viewer.scroll_y = self.viewer.scroll_y.min(self.viewer.max_scroll());
        self.sync_status();
    }

    fn sync_status(&mut self) {
        let error = self.nav.history_error().map(str::to_string);
        if error != self.ui.error {
            self.ui.error = error;
            self.ui.dirty = true;
        }

        let stats = self.nav.diff_stats();
        let status = if stats.truncated_hunks > 0 || stats.skipped > 0 {
            Some(format!(
                "diff output was irregular: {} truncated hunks, {} lines skipped",
                stats.truncated_hunks, stats.skipped
            ))
        } else {
            None
        };
        self.set_status(status);
    }

    fn set_status(&mut self, status: Option<String>) {
        if status != self.ui.status {
            self.ui.status = status;
            self.ui.dirty = true;
        }
    }

    /// Refetch the selected diff, e.g. after the working tree changed.
    pub fn reload(&mut self) {
        self.apply(Transition::Reload);
        if self.ui.status.is_none() {
            let files = self.nav.files().len();
            self.set_status(Some(format!(
                "reloaded: {} file{} changed",
                files,
                if files == 1 { "" } else { "s" }
            )));
        }
    }

    /// Mark dirty for redraw.
    pub fn mark_dirty(&mut self) {
        self.ui.dirty = true;
    }

    /// Clear dirty flag after drawing.
    pub fn clear_dirty(&mut self) {
        self.ui.dirty = false;
    }
}
