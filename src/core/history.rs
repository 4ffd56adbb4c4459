//! Lazy breadth-first walk of the commit graph.

use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use super::{Commit, CommitCache, ObjectReader, RepoError};

/// Commits kept materialized beyond the current selection.
pub const LOOKAHEAD: usize = 80;

/// A walk that stopped on an unresolvable commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalledWalk {
    /// Identifier that failed to resolve.
    pub id: String,
    /// Error reported by the backend.
    pub message: String,
}

/// Throttled breadth-first traversal from a root revision.
///
/// Commits are appended in discovery (frontier) order, which is not
/// necessarily chronological. By default the frontier has no visited set: a
/// commit reachable through two paths is listed once per path, while the
/// [`CommitCache`] keeps it to a single fetch. [`HistoryWalker::with_dedup`]
/// lists each commit once instead.
#[derive(Debug)]
pub struct HistoryWalker {
    discovered: Vec<Rc<Commit>>,
    frontier: VecDeque<String>,
    started: bool,
    lookahead: usize,
    scheduled: Option<HashSet<String>>,
    stalled: Option<StalledWalk>,
}

impl Default for HistoryWalker {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryWalker {
    /// Create a walker with the default lookahead and duplicate listing.
    pub fn new() -> Self {
        Self {
            discovered: Vec::new(),
            frontier: VecDeque::new(),
            started: false,
            lookahead: LOOKAHEAD,
            scheduled: None,
            stalled: None,
        }
    }

    /// Override how many commits are kept ahead of the selection.
    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self
    }

    /// Skip identifiers that were already scheduled once.
    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.scheduled = dedup.then(HashSet::new);
        self
    }

    /// Materialize commits until `lookahead` of them lie beyond `selection`
    /// or the frontier runs dry.
    ///
    /// The frontier is seeded with `root` on the first call. Returns how many
    /// commits were appended. A fetch failure stalls the walk: the failing
    /// identifier stays queued, the error is returned once, and later calls
    /// do nothing.
    pub fn ensure_capacity<R: ObjectReader + ?Sized>(
        &mut self,
        cache: &mut CommitCache,
        reader: &R,
        root: &str,
        selection: usize,
    ) -> Result<usize, RepoError> {
        if !self.started {
            self.started = true;
            self.schedule(root);
        }

        if self.stalled.is_some() {
            return Ok(0);
        }

        let target = selection.saturating_add(self.lookahead);
        let mut appended = 0;

        while self.discovered.len() < target {
            let Some(id) = self.frontier.front().cloned() else {
                break;
            };

            let commit = match cache.get(reader, &id) {
                Ok(commit) => commit,
                Err(e) => {
                    log::warn!("history walk stalled at {}: {}", id, e);
                    self.stalled = Some(StalledWalk {
                        id,
                        message: e.to_string(),
                    });
                    return Err(e);
                }
            };

            self.frontier.pop_front();
            for parent in &commit.parents {
                self.schedule(parent);
            }
            self.discovered.push(commit);
            appended += 1;
        }

        if appended > 0 {
            log::debug!(
                "history walk: +{} commits ({} discovered, {} queued)",
                appended,
                self.discovered.len(),
                self.frontier.len()
            );
        }

        Ok(appended)
    }

    fn schedule(&mut self, id: &str) {
        if let Some(seen) = self.scheduled.as_mut() {
            if !seen.insert(id.to_string()) {
                return;
            }
        }
        self.frontier.push_back(id.to_string());
    }

    /// Discovered commits in discovery order.
    pub fn discovered(&self) -> &[Rc<Commit>] {
        &self.discovered
    }

    /// Commit at `index` in discovery order.
    pub fn get(&self, index: usize) -> Option<&Rc<Commit>> {
        self.discovered.get(index)
    }

    /// Number of discovered commits.
    pub fn len(&self) -> usize {
        self.discovered.len()
    }

    /// Whether nothing has been discovered yet.
    pub fn is_empty(&self) -> bool {
        self.discovered.is_empty()
    }

    /// Identifiers waiting to be fetched.
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Whether the walk has reached every root.
    pub fn is_exhausted(&self) -> bool {
        self.started && self.frontier.is_empty()
    }

    /// The failure that stopped the walk, if any.
    pub fn stalled(&self) -> Option<&StalledWalk> {
        self.stalled.as_ref()
    }

    /// Commit titles in discovery order.
    pub fn titles(&self) -> Vec<String> {
        self.discovered.iter().map(|c| c.title.clone()).collect()
    }
}
