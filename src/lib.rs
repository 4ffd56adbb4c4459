//! quicklog - A terminal browser for git commit history.
//!
//! Walks history lazily from a revision, parses each commit's diff against its
//! primary parent and renders it unified or side by side.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use quicklog::prelude::*;
//!
//! let repo = RepoRoot::discover(std::path::Path::new("."))?;
//! let reader = GitObjectReader::new(repo);
//! let nav = Navigator::new(reader, "HEAD", NavigatorOptions::default())?;
//! ```

#![deny(missing_docs)]

pub mod config;
pub mod core;
pub mod logger;
pub mod metrics;
pub mod prelude;
pub mod theme;
pub mod ui;
