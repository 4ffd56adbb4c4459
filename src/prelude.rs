//! Common re-exports for convenient importing.
//!
//! # Example
//!
//! ```rust,ignore
//! use quicklog::prelude::*;
//! ```

pub use crate::core::{
    Commit, CommitCache, Content, DiffFile, FileChangeKind, GitObjectReader, HistoryWalker, Hunk,
    LibGitObjectReader, MemoryObjectReader, NavigationState, Navigator, NavigatorOptions,
    ObjectReader, RenderMode, RenderedDiff, RepoError, RepoRoot, Transition,
};
