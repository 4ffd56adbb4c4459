//! Git repository discovery and subprocess plumbing.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use thiserror::Error;

/// The object id of git's empty tree. Root commits are diffed against it.
pub const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Errors from repository and object store operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RepoError {
    /// Path is not inside a git repository.
    #[error("not inside a git repository")]
    NotARepo,
    /// The object store cannot resolve the identifier.
    #[error("object not found: {0}")]
    ObjectNotFound(String),
    /// The backend process could not run or exited abnormally.
    #[error("git backend failed: {0}")]
    Backend(String),
    /// Invalid revision specified.
    #[error("invalid revision: {0}")]
    InvalidRevision(String),
    /// Git output contained invalid UTF-8.
    #[error("invalid utf-8 in git output")]
    InvalidUtf8,
    /// I/O error during git operation.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Error reported by libgit2.
    #[error("libgit2 error: {0}")]
    Git2(#[from] git2::Error),
}

impl RepoError {
    /// Whether this error means the identifier itself is unresolvable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound(_) | Self::InvalidRevision(_))
    }
}

/// Canonicalized path to a git repository root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRoot(PathBuf);

impl RepoRoot {
    /// Discover the git repository containing the given path.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use quicklog::core::RepoRoot;
    /// use std::path::Path;
    ///
    /// let repo = RepoRoot::discover(Path::new(".")).expect("not in a git repo");
    /// println!("Repo at: {}", repo.path().display());
    /// ```
    #[must_use = "this returns a Result that should be checked"]
    pub fn discover(path: &Path) -> Result<Self, RepoError> {
        let output = Command::new("git")
            .arg("rev-parse")
            .arg("--show-toplevel")
            .current_dir(path)
            .output()?;

        if !output.status.success() {
            return Err(RepoError::NotARepo);
        }

        let root = std::str::from_utf8(&output.stdout)
            .map_err(|_| RepoError::InvalidUtf8)?
            .trim();

        let canonical = PathBuf::from(root)
            .canonicalize()
            .map_err(|_| RepoError::NotARepo)?;

        Ok(Self(canonical))
    }

    /// Get the repository root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Get the repository root as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.to_str().unwrap_or("")
    }
}

/// Run `git <args>` in the repository and capture its output.
///
/// The child is spawned, its output read to completion and reaped before this
/// returns, on every path. A spawn failure maps to [`RepoError::Backend`].
pub(crate) fn run_git(root: &RepoRoot, args: &[&str]) -> Result<Output, RepoError> {
    let _timer = crate::metrics::Timer::start("git");
    log::debug!("git {}", args.join(" "));

    Command::new("git")
        .args(args)
        .current_dir(root.path())
        .output()
        .map_err(|e| RepoError::Backend(format!("failed to spawn git: {}", e)))
}

/// Decode stdout of a successful git invocation.
pub(crate) fn stdout_string(output: Output) -> Result<String, RepoError> {
    String::from_utf8(output.stdout).map_err(|_| RepoError::InvalidUtf8)
}

/// Describe a failed git invocation from its exit status and stderr.
pub(crate) fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("git exited with {}", output.status)
    } else {
        stderr.to_string()
    }
}

/// Resolve a revision to its full commit SHA.
#[must_use = "this returns a Result that should be checked"]
pub fn resolve_revision(root: &RepoRoot, revision: &str) -> Result<String, RepoError> {
    // --end-of-options keeps refs like "-x" from being read as options
    let revspec = format!("{}^{{commit}}", revision);
    let output = run_git(root, &["rev-parse", "--verify", "--quiet", "--end-of-options", &revspec])?;

    if !output.status.success() {
        return Err(RepoError::InvalidRevision(revision.to_string()));
    }

    Ok(stdout_string(output)?.trim().to_string())
}

/// Get the primary parent of a revision, or the empty tree for a root commit.
#[must_use = "this returns a Result that should be checked"]
pub fn get_parent_revision(root: &RepoRoot, revision: &str) -> Result<String, RepoError> {
    let revspec = format!("{}^", revision);
    let output = run_git(root, &["rev-parse", "--verify", "--quiet", "--end-of-options", &revspec])?;

    if !output.status.success() {
        // No parent (initial commit)
        return Ok(EMPTY_TREE.to_string());
    }

    Ok(stdout_string(output)?.trim().to_string())
}
