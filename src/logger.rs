//! File-based logging using simplelog.
//!
//! Logging is off unless a file is named with `--log` or `QUICKLOG_LOG`; the
//! terminal itself is owned by the TUI and never receives log output.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

/// Environment variable naming the log file when `--log` is absent.
pub const LOG_ENV: &str = "QUICKLOG_LOG";

/// Pick the log file: the explicit path wins over the environment.
pub fn log_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(LOG_ENV).map(PathBuf::from))
        .filter(|p| !p.as_os_str().is_empty())
}

/// Map a `RUST_LOG`-style value to a level. Unknown values fall back to info.
pub fn parse_level(value: &str) -> LevelFilter {
    match value.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Initialize file-based logging.
///
/// Returns the log file path, or `None` when logging stays disabled.
pub fn init(explicit: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    let Some(log_file) = log_file_path(explicit) else {
        return Ok(None);
    };

    let level = std::env::var("RUST_LOG")
        .map(|v| parse_level(&v))
        .unwrap_or(LevelFilter::Debug);

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|c| c) // local offset can be unavailable
        .build();

    let file = File::create(&log_file)
        .with_context(|| format!("failed to create log file {}", log_file.display()))?;
    WriteLogger::init(level, config, file).context("failed to initialize logger")?;

    log::info!("quicklog {} logging at {}", env!("CARGO_PKG_VERSION"), level);
    Ok(Some(log_file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let path = log_file_path(Some(Path::new("/tmp/q.log")));
        assert_eq!(path, Some(PathBuf::from("/tmp/q.log")));
    }

    #[test]
    fn levels() {
        assert_eq!(parse_level("TRACE"), LevelFilter::Trace);
        assert_eq!(parse_level("warn"), LevelFilter::Warn);
        assert_eq!(parse_level("verbose"), LevelFilter::Info);
    }
}
