//! Object store access: the [`ObjectReader`] seam and its backends.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use git2::{DiffFormat, DiffOptions, ErrorCode, ObjectType, Oid, Repository};

use super::repo::{failure_message, get_parent_revision, run_git};
use super::{resolve_revision, RepoError, RepoRoot};

/// Synchronous query interface to a commit object store.
///
/// Every call blocks until the backend answers. Implementations must not
/// cache; memoization lives in [`CommitCache`](super::CommitCache).
pub trait ObjectReader {
    /// Resolve a revision (e.g. `HEAD`) to a commit identifier.
    fn resolve_root(&self, revision: &str) -> Result<String, RepoError>;

    /// Raw textual commit record: header fields, blank line, message.
    fn read_commit(&self, id: &str) -> Result<String, RepoError>;

    /// Unified diff of a commit against its primary parent, with `context`
    /// lines of surrounding context.
    fn read_diff(&self, id: &str, context: usize) -> Result<String, RepoError>;
}

impl<R: ObjectReader + ?Sized> ObjectReader for Box<R> {
    fn resolve_root(&self, revision: &str) -> Result<String, RepoError> {
        (**self).resolve_root(revision)
    }

    fn read_commit(&self, id: &str) -> Result<String, RepoError> {
        (**self).read_commit(id)
    }

    fn read_diff(&self, id: &str, context: usize) -> Result<String, RepoError> {
        (**self).read_diff(id, context)
    }
}

/// Reads objects by invoking the `git` executable.
#[derive(Debug, Clone)]
pub struct GitObjectReader {
    repo: RepoRoot,
}

impl GitObjectReader {
    /// Create a reader for the given repository.
    pub fn new(repo: RepoRoot) -> Self {
        Self { repo }
    }

    /// Repository this reader queries.
    pub fn repo(&self) -> &RepoRoot {
        &self.repo
    }
}

impl ObjectReader for GitObjectReader {
    fn resolve_root(&self, revision: &str) -> Result<String, RepoError> {
        resolve_revision(&self.repo, revision)
    }

    fn read_commit(&self, id: &str) -> Result<String, RepoError> {
        let output = run_git(&self.repo, &["cat-file", "commit", id])?;
        if !output.status.success() {
            log::debug!("cat-file {} failed: {}", id, failure_message(&output));
            return Err(RepoError::ObjectNotFound(id.to_string()));
        }
        // Messages in legacy encodings are still valid commits.
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn read_diff(&self, id: &str, context: usize) -> Result<String, RepoError> {
        let parent = get_parent_revision(&self.repo, id)?;
        let unified = format!("-U{}", context);
        let output = run_git(
            &self.repo,
            &[
                "diff",
                "--no-color",
                "--no-ext-diff",
                "--find-renames",
                "--src-prefix=a/",
                "--dst-prefix=b/",
                &unified,
                &parent,
                id,
                "--",
            ],
        )?;

        if !output.status.success() {
            return Err(RepoError::Backend(failure_message(&output)));
        }

        // Diffs of non-UTF-8 files are still worth showing.
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Reads objects in-process through libgit2.
pub struct LibGitObjectReader {
    repo: Repository,
}

impl std::fmt::Debug for LibGitObjectReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibGitObjectReader")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl LibGitObjectReader {
    /// Open the repository at `root`.
    pub fn open(root: &RepoRoot) -> Result<Self, RepoError> {
        Ok(Self {
            repo: Repository::open(root.path())?,
        })
    }

    fn parse_oid(id: &str) -> Result<Oid, RepoError> {
        Oid::from_str(id).map_err(|_| RepoError::ObjectNotFound(id.to_string()))
    }

    fn not_found(id: &str, err: git2::Error) -> RepoError {
        if err.code() == ErrorCode::NotFound {
            RepoError::ObjectNotFound(id.to_string())
        } else {
            RepoError::Git2(err)
        }
    }
}

impl ObjectReader for LibGitObjectReader {
    fn resolve_root(&self, revision: &str) -> Result<String, RepoError> {
        let object = self
            .repo
            .revparse_single(revision)
            .map_err(|_| RepoError::InvalidRevision(revision.to_string()))?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| RepoError::InvalidRevision(revision.to_string()))?;
        Ok(commit.id().to_string())
    }

    fn read_commit(&self, id: &str) -> Result<String, RepoError> {
        let _timer = crate::metrics::Timer::start("libgit_read_commit");
        let oid = Self::parse_oid(id)?;
        let odb = self.repo.odb()?;
        let object = odb.read(oid).map_err(|e| Self::not_found(id, e))?;
        if object.kind() != ObjectType::Commit {
            return Err(RepoError::ObjectNotFound(id.to_string()));
        }
        Ok(String::from_utf8_lossy(object.data()).into_owned())
    }

    fn read_diff(&self, id: &str, context: usize) -> Result<String, RepoError> {
        let _timer = crate::metrics::Timer::start("libgit_read_diff");
        let oid = Self::parse_oid(id)?;
        let commit = self
            .repo
            .find_commit(oid)
            .map_err(|e| Self::not_found(id, e))?;

        let new_tree = commit.tree()?;
        let old_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };

        let mut opts = DiffOptions::new();
        opts.context_lines(u32::try_from(context).unwrap_or(u32::MAX));
        let mut diff =
            self.repo
                .diff_tree_to_tree(old_tree.as_ref(), Some(&new_tree), Some(&mut opts))?;
        diff.find_similar(None)?;

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            let origin = line.origin();
            if matches!(origin, '+' | '-' | ' ') {
                text.push(origin);
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;

        Ok(text)
    }
}

/// In-memory object store that counts every fetch.
///
/// Used by tests and benchmarks in place of a real repository.
#[derive(Debug, Default)]
pub struct MemoryObjectReader {
    head: Option<String>,
    commits: HashMap<String, String>,
    diffs: HashMap<String, String>,
    diffs_at: HashMap<(String, usize), String>,
    failing_diffs: HashSet<String>,
    commit_reads: RefCell<HashMap<String, usize>>,
    diff_reads: Cell<usize>,
}

impl MemoryObjectReader {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identifier `resolve_root` answers with.
    pub fn with_head(mut self, id: impl Into<String>) -> Self {
        self.head = Some(id.into());
        self
    }

    /// Insert a raw commit record.
    pub fn with_raw_commit(mut self, id: impl Into<String>, raw: impl Into<String>) -> Self {
        self.commits.insert(id.into(), raw.into());
        self
    }

    /// Insert a commit with the given parents and message title.
    pub fn with_commit(self, id: &str, parents: &[&str], title: &str) -> Self {
        let raw = synthesize_commit(id, parents, title);
        self.with_raw_commit(id, raw)
    }

    /// Diff text returned for `id` at any context size.
    pub fn with_diff(mut self, id: impl Into<String>, diff: impl Into<String>) -> Self {
        self.diffs.insert(id.into(), diff.into());
        self
    }

    /// Diff text returned for `id` at exactly `context` lines of context.
    pub fn with_diff_at(
        mut self,
        id: impl Into<String>,
        context: usize,
        diff: impl Into<String>,
    ) -> Self {
        self.diffs_at.insert((id.into(), context), diff.into());
        self
    }

    /// Make `read_diff` for `id` fail with a backend error.
    pub fn failing_diff(mut self, id: impl Into<String>) -> Self {
        self.failing_diffs.insert(id.into());
        self
    }

    /// How many times `read_commit` was called for `id`.
    pub fn commit_reads(&self, id: &str) -> usize {
        self.commit_reads.borrow().get(id).copied().unwrap_or(0)
    }

    /// Total `read_commit` calls across all identifiers.
    pub fn total_commit_reads(&self) -> usize {
        self.commit_reads.borrow().values().sum()
    }

    /// Total `read_diff` calls.
    pub fn diff_reads(&self) -> usize {
        self.diff_reads.get()
    }
}

impl ObjectReader for MemoryObjectReader {
    fn resolve_root(&self, revision: &str) -> Result<String, RepoError> {
        if revision == "HEAD" {
            return self
                .head
                .clone()
                .ok_or_else(|| RepoError::InvalidRevision(revision.to_string()));
        }
        if self.commits.contains_key(revision) {
            return Ok(revision.to_string());
        }
        Err(RepoError::InvalidRevision(revision.to_string()))
    }

    fn read_commit(&self, id: &str) -> Result<String, RepoError> {
        *self
            .commit_reads
            .borrow_mut()
            .entry(id.to_string())
            .or_insert(0) += 1;

        self.commits
            .get(id)
            .cloned()
            .ok_or_else(|| RepoError::ObjectNotFound(id.to_string()))
    }

    fn read_diff(&self, id: &str, context: usize) -> Result<String, RepoError> {
        self.diff_reads.set(self.diff_reads.get() + 1);

        if self.failing_diffs.contains(id) {
            return Err(RepoError::Backend(format!("diff failed for {}", id)));
        }
        if let Some(diff) = self.diffs_at.get(&(id.to_string(), context)) {
            return Ok(diff.clone());
        }
        Ok(self.diffs.get(id).cloned().unwrap_or_default())
    }
}

/// Build a canonical commit record for an in-memory commit.
fn synthesize_commit(id: &str, parents: &[&str], title: &str) -> String {
    let mut raw = format!("tree {}\n", tree_for(id));
    for parent in parents {
        raw.push_str(&format!("parent {}\n", parent));
    }
    raw.push_str("author A U Thor <author@example.com> 1700000000 +0000\n");
    raw.push_str("committer C O Mitter <committer@example.com> 1700000000 +0000\n");
    raw.push('\n');
    raw.push_str(title);
    raw.push('\n');
    raw
}

fn tree_for(id: &str) -> String {
    format!("tree-of-{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_reader_counts_commit_reads() {
        let reader = MemoryObjectReader::new()
            .with_head("c1")
            .with_commit("c1", &[], "init");

        assert_eq!(reader.resolve_root("HEAD").unwrap(), "c1");
        assert!(reader.read_commit("c1").unwrap().starts_with("tree "));
        reader.read_commit("c1").unwrap();
        assert_eq!(reader.commit_reads("c1"), 2);
        assert_eq!(reader.total_commit_reads(), 2);
    }

    #[test]
    fn memory_reader_unknown_commit_is_not_found() {
        let reader = MemoryObjectReader::new();
        match reader.read_commit("missing") {
            Err(RepoError::ObjectNotFound(id)) => assert_eq!(id, "missing"),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(reader.commit_reads("missing"), 1);
    }

    #[test]
    fn memory_reader_diff_prefers_exact_context() {
        let reader = MemoryObjectReader::new()
            .with_diff("c1", "any")
            .with_diff_at("c1", 5, "five");

        assert_eq!(reader.read_diff("c1", 3).unwrap(), "any");
        assert_eq!(reader.read_diff("c1", 5).unwrap(), "five");
        assert_eq!(reader.read_diff("c2", 3).unwrap(), "");
        assert_eq!(reader.diff_reads(), 3);
    }

    #[test]
    fn memory_reader_failing_diff() {
        let reader = MemoryObjectReader::new().failing_diff("c1");
        assert!(matches!(
            reader.read_diff("c1", 3),
            Err(RepoError::Backend(_))
        ));
    }

    #[test]
    fn boxed_reader_delegates() {
        let reader: Box<dyn ObjectReader> = Box::new(
            MemoryObjectReader::new()
                .with_head("c1")
                .with_commit("c1", &[], "init"),
        );
        assert_eq!(reader.resolve_root("HEAD").unwrap(), "c1");
        assert!(reader.read_commit("c1").is_ok());
    }
}
