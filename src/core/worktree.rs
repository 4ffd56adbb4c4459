//! Uncommitted changes presented as a single pseudo-commit.
//!
//! [`WorktreeReader`] answers the [`ObjectReader`] queries for one synthetic
//! identifier, [`WORKTREE_ID`], so the navigator, file list and renderers
//! browse `git diff` output exactly like a commit.

use super::repo::{failure_message, run_git};
use super::{resolve_revision, ObjectReader, RepoError, RepoRoot};

/// Identifier of the pseudo-commit holding uncommitted changes.
pub const WORKTREE_ID: &str = "worktree";

/// Reads the working tree (or the index) diff through the `git` executable.
#[derive(Debug, Clone)]
pub struct WorktreeReader {
    repo: RepoRoot,
    staged: bool,
    paths: Vec<String>,
}

impl WorktreeReader {
    /// Unstaged changes in `repo`: working tree against the index.
    pub fn new(repo: RepoRoot) -> Self {
        Self {
            repo,
            staged: false,
            paths: Vec::new(),
        }
    }

    /// Show staged changes (index against `HEAD`) instead.
    pub fn staged(mut self, staged: bool) -> Self {
        self.staged = staged;
        self
    }

    /// Limit the diff to these pathspecs.
    pub fn with_paths(mut self, paths: Vec<String>) -> Self {
        self.paths = paths;
        self
    }

    /// Repository this reader queries.
    pub fn repo(&self) -> &RepoRoot {
        &self.repo
    }

    /// Title of the pseudo-commit.
    pub fn title(&self) -> &'static str {
        if self.staged {
            "Staged changes"
        } else {
            "Unstaged changes"
        }
    }

    fn check_id(id: &str) -> Result<(), RepoError> {
        if id == WORKTREE_ID {
            Ok(())
        } else {
            Err(RepoError::ObjectNotFound(id.to_string()))
        }
    }
}

impl ObjectReader for WorktreeReader {
    fn resolve_root(&self, _revision: &str) -> Result<String, RepoError> {
        Ok(WORKTREE_ID.to_string())
    }

    fn read_commit(&self, id: &str) -> Result<String, RepoError> {
        Self::check_id(id)?;

        // No tree or parent headers: the pseudo-commit has no history.
        let mut raw = format!("\n{}\n\n", self.title());
        let against = if self.staged { "HEAD" } else { "the index" };
        raw.push_str(&format!("Working tree compared against {}.\n", against));
        match resolve_revision(&self.repo, "HEAD") {
            Ok(head) => raw.push_str(&format!("HEAD is {}.\n", head)),
            Err(_) => raw.push_str("No commits yet.\n"),
        }
        if !self.paths.is_empty() {
            raw.push_str(&format!("Paths: {}\n", self.paths.join(" ")));
        }
        Ok(raw)
    }

    fn read_diff(&self, id: &str, context: usize) -> Result<String, RepoError> {
        Self::check_id(id)?;
        let _timer = crate::metrics::Timer::start("worktree_diff");

        let unified = format!("-U{}", context);
        let mut args = vec![
            "diff",
            "--no-color",
            "--no-ext-diff",
            "--find-renames",
            "--src-prefix=a/",
            "--dst-prefix=b/",
            unified.as_str(),
        ];
        if self.staged {
            args.push("--cached");
        }
        args.push("--");
        args.extend(self.paths.iter().map(String::as_str));

        let output = run_git(&self.repo, &args)?;
        if !output.status.success() {
            return Err(RepoError::Backend(failure_message(&output)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
