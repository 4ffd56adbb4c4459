//! Core primitives for quicklog (no TUI dependencies).

mod commit;
mod diff;
mod history;
mod inline;
mod navigation;
mod reader;
mod render;
mod repo;
mod worktree;

pub use commit::*;
pub use diff::*;
pub use history::*;
pub use inline::*;
pub use navigation::*;
pub use reader::*;
pub use render::*;
pub use repo::*;
pub use worktree::*;
