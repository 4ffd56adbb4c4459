use super::{App, Focus};
use crate::core::Transition;

impl App {
    /// Move the selection in the focused column by `delta` rows.
    pub fn move_selection(&mut self, delta: isize) {
        let state = self.nav.state();
        match self.focus {
            Focus::Commits => {
                self.apply(Transition::SelectCommit(offset(state.commit, delta)));
            }
            Focus::Files => {
                self.apply(Transition::SelectFile(offset(state.file, delta)));
            }
            Focus::Content => self.scroll_content(delta),
        }
    }

    /// Move by one visible page in the focused column.
    pub fn page(&mut self, forward: bool) {
        let page = self.viewer.height.max(1) as isize;
        self.move_selection(if forward { page } else { -page });
    }

    /// Jump to the first row of the focused column.
    pub fn select_first(&mut self) {
        match self.focus {
            Focus::Commits => self.apply(Transition::SelectCommit(0)),
            Focus::Files => self.apply(Transition::SelectFile(0)),
            Focus::Content => {
                self.viewer.scroll_y = 0;
                self.ui.dirty = true;
            }
        }
    }

    /// Jump to the last row of the focused column.
    ///
    /// For commits this is the last one discovered so far; the walk then
    /// extends past it.
    pub fn select_last(&mut self) {
        match self.focus {
            Focus::Commits => {
                let last = self.nav.commits().len().saturating_sub(1);
                self.apply(Transition::SelectCommit(last));
            }
            Focus::Files => self.apply(Transition::SelectFile(usize::MAX)),
            Focus::Content => {
                self.viewer.scroll_y = self.viewer.max_scroll();
                self.ui.dirty = true;
            }
        }
    }

    /// Scroll the content pane.
    pub fn scroll_content(&mut self, delta: isize) {
        let next = offset(self.viewer.scroll_y, delta).min(self.viewer.max_scroll());
        if next != self.viewer.scroll_y {
            self.viewer.scroll_y = next;
            self.ui.dirty = true;
        }
    }

    /// Cycle focus to the right.
    pub fn cycle_focus(&mut self) {
        self.set_focus(self.focus.next());
    }

    /// Move focus one column right, stopping at the content pane.
    pub fn focus_right(&mut self) {
        if self.focus != Focus::Content {
            self.set_focus(self.focus.next());
        }
    }

    /// Explicitly set the UI focus.
    pub fn set_focus(&mut self, focus: Focus) {
        if self.focus != focus {
            self.focus = focus;
            self.ui.dirty = true;
        }
    }
}

fn offset(index: usize, delta: isize) -> usize {
    if delta < 0 {
        index.saturating_sub(delta.unsigned_abs())
    } else {
        index.saturating_add(delta as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::offset;

    #[test]
    fn offsets_saturate() {
        assert_eq!(offset(3, -5), 0);
        assert_eq!(offset(3, 2), 5);
        assert_eq!(offset(usize::MAX, 1), usize::MAX);
    }
}
