//! Selection state and the transitions that drive fetching.
//!
//! [`Navigator`] owns the reader, the commit cache and the history walker.
//! The UI feeds it [`Transition`]s and reads back derived views; it never
//! calls the backend itself.

use std::rc::Rc;

use super::{
    parse_unified_diff_with_stats, render, Commit, CommitCache, DiffFile, HistoryWalker,
    ObjectReader, ParseStats, RenderMode, RenderedDiff, RepoError, LOOKAHEAD,
};

/// Default lines of diff context.
pub const DEFAULT_CONTEXT: usize = 3;

/// Label of the pseudo-entry at file index 0.
pub const DESCRIPTION_ENTRY: &str = "description";

/// Current selection and display toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    /// Index into the discovered commit sequence.
    pub commit: usize,
    /// 0 is the description; `i > 0` is the `i-1`th changed file.
    pub file: usize,
    /// Lines of context requested from the backend.
    pub context: usize,
    /// Diff layout.
    pub mode: RenderMode,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            commit: 0,
            file: 0,
            context: DEFAULT_CONTEXT,
            mode: RenderMode::Split,
        }
    }
}

/// A user-level state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Select a commit by index (clamped to what has been discovered).
    SelectCommit(usize),
    /// Select a file entry by index (clamped to the entry list).
    SelectFile(usize),
    /// Set the context size.
    SetContext(usize),
    /// One more line of context.
    IncreaseContext,
    /// One less line of context, stopping at 0.
    DecreaseContext,
    /// Set the layout.
    SetMode(RenderMode),
    /// Switch between split and unified.
    ToggleMode,
    /// Only top up the history lookahead.
    Refresh,
    /// Refetch the selected commit's diff even if it is loaded.
    Reload,
}

/// What the content pane shows for the current selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Commit metadata and message.
    Description(Rc<Commit>),
    /// Rendered diff of one file.
    Diff(RenderedDiff),
    /// The diff for the selected commit could not be produced.
    Error(String),
    /// Nothing selected yet.
    Empty,
}

/// Construction options for [`Navigator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorOptions {
    /// Initial context size.
    pub context: usize,
    /// Initial layout.
    pub mode: RenderMode,
    /// Commits kept materialized beyond the selection.
    pub lookahead: usize,
    /// List commits reachable through several paths only once.
    pub dedup_history: bool,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self {
            context: DEFAULT_CONTEXT,
            mode: RenderMode::Split,
            lookahead: LOOKAHEAD,
            dedup_history: false,
        }
    }
}

/// Parsed diff of one commit at one context size.
#[derive(Debug)]
struct LoadedDiff {
    id: String,
    context: usize,
    files: Result<Vec<DiffFile>, String>,
    stats: ParseStats,
}

/// Orchestrates history walking and diff loading for a selection.
#[derive(Debug)]
pub struct Navigator<R: ObjectReader> {
    reader: R,
    root: String,
    cache: CommitCache,
    walker: HistoryWalker,
    state: NavigationState,
    diff: Option<LoadedDiff>,
    history_error: Option<String>,
}

impl<R: ObjectReader> Navigator<R> {
    /// Resolve `revision` and load the first screen of history.
    ///
    /// Fails only when the revision cannot be resolved; later backend
    /// failures are kept as state.
    pub fn new(reader: R, revision: &str, options: NavigatorOptions) -> Result<Self, RepoError> {
        let root = reader.resolve_root(revision)?;
        log::info!("browsing history from {} ({})", revision, root);

        let mut navigator = Self {
            reader,
            root,
            cache: CommitCache::new(),
            walker: HistoryWalker::new()
                .with_lookahead(options.lookahead)
                .with_dedup(options.dedup_history),
            state: NavigationState {
                context: options.context,
                mode: options.mode,
                ..NavigationState::default()
            },
            diff: None,
            history_error: None,
        };
        navigator.top_up();
        navigator.load_diff();
        Ok(navigator)
    }

    /// Apply a transition. Returns whether the state changed or the diff
    /// was reloaded.
    pub fn apply(&mut self, transition: Transition) -> bool {
        let before = self.state;
        let mut reloaded = false;

        match transition {
            Transition::SelectCommit(index) => {
                // Let the walker reach the requested index before clamping.
                self.walk_to(index);
                let index = index.min(self.walker.len().saturating_sub(1));
                if index != self.state.commit {
                    self.state.commit = index;
                    self.state.file = 0;
                }
            }
            Transition::SelectFile(index) => {
                self.state.file = index.min(self.file_count());
            }
            Transition::SetContext(context) => self.state.context = context,
            Transition::IncreaseContext => {
                self.state.context = self.state.context.saturating_add(1);
            }
            Transition::DecreaseContext => {
                self.state.context = self.state.context.saturating_sub(1);
            }
            Transition::SetMode(mode) => self.state.mode = mode,
            Transition::ToggleMode => self.state.mode = self.state.mode.toggled(),
            Transition::Refresh => {}
            Transition::Reload => {
                self.diff = None;
                reloaded = true;
            }
        }

        if reloaded || before.commit != self.state.commit || before.context != self.state.context
        {
            self.load_diff();
            self.state.file = self.state.file.min(self.file_count());
        }
        self.top_up();

        reloaded || self.state != before
    }

    /// Current selection.
    pub fn state(&self) -> NavigationState {
        self.state
    }

    /// Resolved root identifier.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// The reader in use.
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// The commit cache.
    pub fn cache(&self) -> &CommitCache {
        &self.cache
    }

    /// The history walker.
    pub fn walker(&self) -> &HistoryWalker {
        &self.walker
    }

    /// Discovered commits in walk order.
    pub fn commits(&self) -> &[Rc<Commit>] {
        self.walker.discovered()
    }

    /// Titles of discovered commits.
    pub fn commit_titles(&self) -> Vec<String> {
        self.walker.titles()
    }

    /// The selected commit.
    pub fn selected_commit(&self) -> Option<&Rc<Commit>> {
        self.walker.get(self.state.commit)
    }

    /// Parsed files of the current diff; empty when it failed to load.
    pub fn files(&self) -> &[DiffFile] {
        match self.diff.as_ref().map(|d| &d.files) {
            Some(Ok(files)) => files,
            _ => &[],
        }
    }

    /// Why the current diff could not be loaded.
    pub fn diff_error(&self) -> Option<&str> {
        match self.diff.as_ref().map(|d| &d.files) {
            Some(Err(message)) => Some(message),
            _ => None,
        }
    }

    /// Anomalies the parser tolerated in the current diff.
    pub fn diff_stats(&self) -> ParseStats {
        self.diff.as_ref().map(|d| d.stats).unwrap_or_default()
    }

    /// Entries after the description: one per file, or a single error entry.
    fn file_count(&self) -> usize {
        match self.diff.as_ref().map(|d| &d.files) {
            Some(Ok(files)) => files.len(),
            Some(Err(_)) => 1,
            None => 0,
        }
    }

    /// File list labels: the description entry, then the changed files.
    pub fn file_entries(&self) -> Vec<String> {
        let mut entries = vec![DESCRIPTION_ENTRY.to_string()];
        match self.diff.as_ref().map(|d| &d.files) {
            Some(Ok(files)) => entries.extend(files.iter().map(DiffFile::display_path)),
            Some(Err(_)) => entries.push("(diff unavailable)".to_string()),
            None => {}
        }
        entries
    }

    /// Failure that stopped the history walk, for a status line.
    pub fn history_error(&self) -> Option<&str> {
        self.history_error.as_deref()
    }

    /// Content for the current selection.
    pub fn content(&self) -> Content {
        let Some(commit) = self.selected_commit() else {
            return Content::Empty;
        };
        if self.state.file == 0 {
            return Content::Description(Rc::clone(commit));
        }

        match self.diff.as_ref().map(|d| &d.files) {
            Some(Ok(files)) => match files.get(self.state.file - 1) {
                Some(file) => Content::Diff(render(file, self.state.mode, self.state.context)),
                None => Content::Empty,
            },
            Some(Err(message)) => Content::Error(message.clone()),
            None => Content::Empty,
        }
    }

    fn top_up(&mut self) {
        self.walk_to(self.state.commit);
    }

    fn walk_to(&mut self, selection: usize) {
        if let Err(e) =
            self.walker
                .ensure_capacity(&mut self.cache, &self.reader, &self.root, selection)
        {
            self.history_error = Some(format!("history incomplete: {}", e));
        }
    }

    fn load_diff(&mut self) {
        let Some(commit) = self.walker.get(self.state.commit) else {
            self.diff = None;
            return;
        };

        let context = self.state.context;
        if let Some(loaded) = &self.diff {
            if loaded.id == commit.id && loaded.context == context {
                return;
            }
        }

        let id = commit.id.clone();
        let (files, stats) = match self.reader.read_diff(&id, context) {
            Ok(raw) => {
                let (files, stats) = parse_unified_diff_with_stats(&raw);
                (Ok(files), stats)
            }
            Err(e) => {
                log::warn!("diff for {} failed: {}", id, e);
                (Err(e.to_string()), ParseStats::default())
            }
        };
        self.diff = Some(LoadedDiff {
            id,
            context,
            files,
            stats,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{HunkRows, MemoryObjectReader};

    const DIFF_A: &str = "diff --git a/src/lib.rs b/src/lib.rs
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,2 +1,2 @@
-old
+new
 keep
diff --git a/README.md b/README.md
--- a/README.md
+++ b/README.md
@@ -1 +1,2 @@
 intro
+more
";

    fn reader() -> MemoryObjectReader {
        MemoryObjectReader::new()
            .with_head("c2")
            .with_commit("c2", &["c1"], "third")
            .with_commit("c1", &["c0"], "second")
            .with_commit("c0", &[], "first")
            .with_diff("c2", DIFF_A)
            .with_diff("c1", "diff --git a/x b/x\n--- a/x\n+++ b/x\n@@ -1 +1 @@\n-1\n+2\n")
    }

    fn navigator(reader: MemoryObjectReader) -> Navigator<MemoryObjectReader> {
        Navigator::new(reader, "HEAD", NavigatorOptions::default()).unwrap()
    }

    #[test]
    fn initial_state() {
        let nav = navigator(reader());
        assert_eq!(nav.state(), NavigationState::default());
        assert_eq!(nav.state().context, 3);
        assert_eq!(nav.state().mode, RenderMode::Split);
        assert_eq!(nav.root(), "c2");
        assert_eq!(nav.commit_titles(), vec!["third", "second", "first"]);
        assert_eq!(
            nav.file_entries(),
            vec!["description", "src/lib.rs", "README.md"]
        );
        assert_eq!(nav.reader().diff_reads(), 1);
        assert!(matches!(nav.content(), Content::Description(c) if c.id == "c2"));
    }

    #[test]
    fn unknown_revision_fails() {
        let err = Navigator::new(reader(), "nope", NavigatorOptions::default()).unwrap_err();
        assert!(matches!(err, RepoError::InvalidRevision(_)));
    }

    #[test]
    fn selecting_commit_resets_file_and_refetches() {
        let mut nav = navigator(reader());
        assert!(nav.apply(Transition::SelectFile(2)));
        assert_eq!(nav.state().file, 2);

        assert!(nav.apply(Transition::SelectCommit(1)));
        assert_eq!(nav.state().commit, 1);
        assert_eq!(nav.state().file, 0);
        assert_eq!(nav.file_entries(), vec!["description", "x"]);
        assert_eq!(nav.reader().diff_reads(), 2);

        // Re-selecting the same commit does nothing.
        assert!(!nav.apply(Transition::SelectCommit(1)));
        assert_eq!(nav.reader().diff_reads(), 2);
    }

    #[test]
    fn commit_selection_is_clamped() {
        let mut nav = navigator(reader());
        nav.apply(Transition::SelectCommit(99));
        assert_eq!(nav.state().commit, 2);
        assert_eq!(nav.selected_commit().unwrap().id, "c0");
        // Root commit has no diff registered: just the description entry.
        assert_eq!(nav.file_entries(), vec!["description"]);
    }

    #[test]
    fn file_selection_is_clamped() {
        let mut nav = navigator(reader());
        nav.apply(Transition::SelectFile(10));
        assert_eq!(nav.state().file, 2);
        assert_eq!(nav.reader().diff_reads(), 1);
    }

    #[test]
    fn context_change_refetches_at_new_size() {
        let reader = reader().with_diff_at(
            "c2",
            5,
            "diff --git a/only.rs b/only.rs\n--- a/only.rs\n+++ b/only.rs\n@@ -1 +1 @@\n-a\n+b\n",
        );
        let mut nav = navigator(reader);
        nav.apply(Transition::SelectFile(2));

        nav.apply(Transition::SetContext(5));
        assert_eq!(nav.state().context, 5);
        assert_eq!(nav.reader().diff_reads(), 2);
        assert_eq!(nav.file_entries(), vec!["description", "only.rs"]);
        // Fewer files now; selection clamps into range.
        assert_eq!(nav.state().file, 1);

        nav.apply(Transition::IncreaseContext);
        assert_eq!(nav.state().context, 6);
        assert_eq!(nav.reader().diff_reads(), 3);
    }

    #[test]
    fn decrease_context_saturates() {
        let mut nav = navigator(reader());
        nav.apply(Transition::SetContext(0));
        let reads = nav.reader().diff_reads();
        assert!(!nav.apply(Transition::DecreaseContext));
        assert_eq!(nav.state().context, 0);
        assert_eq!(nav.reader().diff_reads(), reads);
    }

    #[test]
    fn mode_change_only_rerenders() {
        let mut nav = navigator(reader());
        nav.apply(Transition::SelectFile(1));
        match nav.content() {
            Content::Diff(diff) => assert!(matches!(diff.hunks[0].rows, HunkRows::Split(_))),
            other => panic!("expected diff, got {:?}", other),
        }

        assert!(nav.apply(Transition::ToggleMode));
        assert_eq!(nav.state().mode, RenderMode::Unified);
        match nav.content() {
            Content::Diff(diff) => {
                assert_eq!(diff.mode, RenderMode::Unified);
                assert!(matches!(diff.hunks[0].rows, HunkRows::Unified(_)));
            }
            other => panic!("expected diff, got {:?}", other),
        }

        nav.apply(Transition::SetMode(RenderMode::Split));
        assert_eq!(nav.reader().diff_reads(), 1);
    }

    #[test]
    fn diff_failure_is_inline() {
        let reader = reader().failing_diff("c1");
        let mut nav = navigator(reader);
        nav.apply(Transition::SelectCommit(1));

        assert!(nav.diff_error().is_some());
        assert!(nav.files().is_empty());
        assert_eq!(nav.file_entries().len(), 2);
        assert!(matches!(nav.content(), Content::Description(_)));

        nav.apply(Transition::SelectFile(1));
        assert!(matches!(nav.content(), Content::Error(m) if m.contains("c1")));

        // Other commits are unaffected.
        nav.apply(Transition::SelectCommit(0));
        assert!(nav.diff_error().is_none());
        assert_eq!(nav.file_entries().len(), 3);
    }

    #[test]
    fn history_failure_becomes_status() {
        let reader = MemoryObjectReader::new()
            .with_head("tip")
            .with_commit("tip", &["missing"], "tip");
        let mut nav = navigator(reader);

        assert_eq!(nav.commit_titles(), vec!["tip"]);
        assert!(nav.history_error().unwrap().contains("missing"));

        // Selection cannot move past the faulting commit.
        nav.apply(Transition::SelectCommit(1));
        assert_eq!(nav.state().commit, 0);
        assert_eq!(nav.reader().commit_reads("missing"), 1);
    }

    #[test]
    fn reload_refetches_same_commit() {
        let mut nav = navigator(reader());
        nav.apply(Transition::SelectFile(2));
        let reads = nav.reader().diff_reads();

        assert!(nav.apply(Transition::Reload));
        assert_eq!(nav.reader().diff_reads(), reads + 1);
        assert_eq!(nav.state().file, 2);

        // Nothing changed, so a plain refresh does not refetch
        assert!(!nav.apply(Transition::Refresh));
        assert_eq!(nav.reader().diff_reads(), reads + 1);
    }

    #[test]
    fn parse_anomalies_are_reported() {
        let truncated = "diff --git a/x b/x\n--- a/x\n+++ b/x\n@@ -1,5 +1,5 @@\n-1\n+2\n";
        let reader = reader().with_diff("c0", truncated);
        let mut nav = navigator(reader);
        assert_eq!(nav.diff_stats(), ParseStats::default());

        nav.apply(Transition::SelectCommit(2));
        assert_eq!(nav.diff_stats().truncated_hunks, 1);
        assert_eq!(nav.files()[0].hunks[0].old_range, (1, 1));
    }

    #[test]
    fn every_transition_keeps_lookahead_full() {
        let mut reader = MemoryObjectReader::new().with_head("c299");
        for i in 0..300 {
            let parent = format!("c{}", i.max(1) - 1);
            let parents: Vec<&str> = if i == 0 { vec![] } else { vec![&parent] };
            reader = reader.with_commit(&format!("c{}", i), &parents, "t");
        }
        let mut nav = navigator(reader);
        assert_eq!(nav.walker().len(), LOOKAHEAD);

        nav.apply(Transition::SelectCommit(79));
        assert_eq!(nav.walker().len(), 79 + LOOKAHEAD);

        nav.apply(Transition::ToggleMode);
        assert_eq!(nav.walker().len(), 79 + LOOKAHEAD);

        nav.apply(Transition::SelectCommit(250));
        assert_eq!(nav.state().commit, 250);
        assert!(nav.walker().is_exhausted());
        assert_eq!(nav.walker().len(), 300);
    }

    #[test]
    fn diamond_end_to_end() {
        // head merges p1 and p2; p1 is also reachable through p2's ancestor.
        let reader = MemoryObjectReader::new()
            .with_head("head")
            .with_commit("head", &["p1", "p2"], "merge")
            .with_commit("p2", &["third"], "p2")
            .with_commit("third", &["p1"], "third")
            .with_commit("p1", &[], "p1");
        let nav = navigator(reader);

        let ids: Vec<&str> = nav.commits().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["head", "p1", "p2", "third", "p1"]);
        assert_eq!(nav.reader().commit_reads("p1"), 1);
        assert_eq!(nav.cache().len(), 4);
    }
}
