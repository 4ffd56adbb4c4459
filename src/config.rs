//! User configuration: `~/.config/quicklog/config.json` merged with CLI flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{NavigatorOptions, RenderMode, DEFAULT_CONTEXT, LOOKAHEAD};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid JSON for this schema.
    #[error("invalid config {path}: {source}")]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// A value is out of range.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Which object store implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Spawn the `git` executable.
    #[default]
    Git,
    /// Read objects in-process through libgit2.
    Libgit,
}

/// Contents of the config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Initial context size.
    pub context: Option<usize>,
    /// Initial layout.
    pub mode: Option<RenderMode>,
    /// Commits kept materialized beyond the selection.
    pub lookahead: Option<usize>,
    /// List commits reachable through several paths once.
    pub dedup_history: Option<bool>,
    /// Object store backend.
    pub backend: Option<Backend>,
    /// Theme name.
    pub theme: Option<String>,
}

impl FileConfig {
    /// Default config file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("quicklog").join("config.json"))
    }

    /// Load from the default location; a missing file yields defaults.
    #[must_use = "this returns a Result that should be checked"]
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`; a missing file yields defaults.
    #[must_use = "this returns a Result that should be checked"]
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}

/// Values given on the command line; they win over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// Revision to browse from.
    pub revision: Option<String>,
    /// `-U N`.
    pub context: Option<usize>,
    /// `--unified`.
    pub unified: bool,
    /// `--theme`.
    pub theme: Option<String>,
    /// `--backend`.
    pub backend: Option<Backend>,
}

/// Effective settings after merging file and CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Revision to browse from.
    pub revision: String,
    /// Initial context size.
    pub context: usize,
    /// Initial layout.
    pub mode: RenderMode,
    /// Lookahead for the history walk.
    pub lookahead: usize,
    /// Deduplicate commits in the history list.
    pub dedup_history: bool,
    /// Object store backend.
    pub backend: Backend,
    /// Theme name.
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            revision: "HEAD".to_string(),
            context: DEFAULT_CONTEXT,
            mode: RenderMode::Split,
            lookahead: LOOKAHEAD,
            dedup_history: false,
            backend: Backend::Git,
            theme: "default".to_string(),
        }
    }
}

impl Settings {
    /// Merge `file` and `cli` over the defaults.
    pub fn resolve(file: FileConfig, cli: CliOverrides) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let lookahead = file.lookahead.unwrap_or(defaults.lookahead);
        if lookahead == 0 {
            return Err(ConfigError::Invalid("lookahead must be at least 1".into()));
        }

        let mode = if cli.unified {
            RenderMode::Unified
        } else {
            file.mode.unwrap_or(defaults.mode)
        };

        Ok(Self {
            revision: cli.revision.unwrap_or(defaults.revision),
            context: cli.context.or(file.context).unwrap_or(defaults.context),
            mode,
            lookahead,
            dedup_history: file.dedup_history.unwrap_or(defaults.dedup_history),
            backend: cli.backend.or(file.backend).unwrap_or(defaults.backend),
            theme: cli.theme.or(file.theme).unwrap_or(defaults.theme),
        })
    }

    /// Options for [`Navigator`](crate::core::Navigator).
    pub fn navigator_options(&self) -> NavigatorOptions {
        NavigatorOptions {
            context: self.context,
            mode: self.mode,
            lookahead: self.lookahead,
            dedup_history: self.dedup_history,
        }
    }
}
