/// Which column receives movement keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Commit list.
    #[default]
    Commits,
    /// File list of the selected commit.
    Files,
    /// Description or diff of the selected file.
    Content,
}

impl Focus {
    /// Next column to the right, wrapping.
    pub fn next(self) -> Self {
        match self {
            Self::Commits => Self::Files,
            Self::Files => Self::Content,
            Self::Content => Self::Commits,
        }
    }
}

/// Scroll offset of a selectable list.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListView {
    /// First visible row.
    pub scroll: usize,
}

impl ListView {
    /// Adjust scroll so `selected` is inside a window of `height` rows.
    pub fn follow(&mut self, selected: usize, len: usize, height: usize) {
        if height == 0 {
            return;
        }
        let max_scroll = len.saturating_sub(height);
        self.scroll = self.scroll.min(max_scroll);
        if selected < self.scroll {
            self.scroll = selected;
        } else if selected >= self.scroll + height {
            self.scroll = selected + 1 - height;
        }
    }
}

/// Content pane viewport.
#[derive(Debug, Default, Clone, Copy)]
pub struct ViewerState {
    /// Vertical scroll offset.
    pub scroll_y: usize,
    /// Rows of the current content.
    pub rows: usize,
    /// Visible height from the last frame.
    pub height: usize,
}

impl ViewerState {
    /// Largest useful scroll offset.
    pub fn max_scroll(&self) -> usize {
        self.rows.saturating_sub(self.height.max(1))
    }
}

/// Messages and redraw flag.
#[derive(Debug, Default)]
pub struct UiState {
    /// Error message.
    pub error: Option<String>,
    /// Status message.
    pub status: Option<String>,
    /// Dirty flag for redraw.
    pub dirty: bool,
}
