//! Commit records and the memoizing commit cache.

use std::collections::HashMap;
use std::rc::Rc;

use super::{ObjectReader, RepoError};

/// A parsed commit. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Commit {
    /// Commit identifier.
    pub id: String,
    /// Tree identifier.
    pub tree: String,
    /// Author lines, in record order.
    pub authors: Vec<String>,
    /// Committer lines, in record order.
    pub committers: Vec<String>,
    /// First message line.
    pub title: String,
    /// Message lines after the title and its separator line.
    pub body: Vec<String>,
    /// Parent identifiers, primary parent first.
    pub parents: Vec<String>,
}

impl Commit {
    /// Parse a raw commit record as printed by `git cat-file commit`.
    ///
    /// Header lines other than `tree`, `parent`, `author` and `committer`
    /// (and continuation lines of multi-line headers) are ignored. The first
    /// blank line ends the header; message line 0 is the title and lines 2..
    /// form the body.
    pub fn parse(id: impl Into<String>, raw: &str) -> Self {
        let mut commit = Commit {
            id: id.into(),
            ..Default::default()
        };

        let mut lines = raw.lines();
        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }
            if let Some(tree) = line.strip_prefix("tree ") {
                commit.tree = tree.to_string();
            } else if let Some(parent) = line.strip_prefix("parent ") {
                commit.parents.push(parent.to_string());
            } else if let Some(author) = line.strip_prefix("author ") {
                commit.authors.push(author.to_string());
            } else if let Some(committer) = line.strip_prefix("committer ") {
                commit.committers.push(committer.to_string());
            }
        }

        for (index, line) in lines.enumerate() {
            match index {
                0 => commit.title = line.to_string(),
                1 => {}
                _ => commit.body.push(line.to_string()),
            }
        }

        commit
    }

    /// Abbreviated identifier for display. Only hex object names are
    /// shortened; symbolic identifiers are shown whole.
    pub fn short_id(&self) -> &str {
        if self.id.len() > 7 && self.id.bytes().all(|b| b.is_ascii_hexdigit()) {
            &self.id[..7]
        } else {
            &self.id
        }
    }

    /// Whether this commit has no parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Whether this commit has two or more parents.
    pub fn is_merge(&self) -> bool {
        self.parents.len() >= 2
    }
}

/// Memoized map from identifier to parsed [`Commit`].
///
/// Each identifier is fetched and parsed at most once for the lifetime of the
/// cache; later lookups return the same `Rc`. Failed fetches are not recorded,
/// so one bad identifier never poisons other entries.
#[derive(Debug, Default)]
pub struct CommitCache {
    commits: HashMap<String, Rc<Commit>>,
    fetches: usize,
}

impl CommitCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `id`, fetching and parsing it through `reader` on first use.
    pub fn get<R: ObjectReader + ?Sized>(
        &mut self,
        reader: &R,
        id: &str,
    ) -> Result<Rc<Commit>, RepoError> {
        if let Some(commit) = self.commits.get(id) {
            log::trace!("commit cache hit: {}", id);
            return Ok(Rc::clone(commit));
        }

        log::debug!("commit cache miss: {}", id);
        self.fetches += 1;
        let raw = reader.read_commit(id)?;
        let commit = Rc::new(Commit::parse(id, &raw));
        self.commits.insert(id.to_string(), Rc::clone(&commit));
        Ok(commit)
    }

    /// Already-parsed commit, without touching the backend.
    pub fn peek(&self, id: &str) -> Option<Rc<Commit>> {
        self.commits.get(id).cloned()
    }

    /// Whether `id` has been parsed.
    pub fn contains(&self, id: &str) -> bool {
        self.commits.contains_key(id)
    }

    /// Number of cached commits.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Backend fetches attempted so far, including failed ones.
    pub fn fetches(&self) -> usize {
        self.fetches
    }
}
