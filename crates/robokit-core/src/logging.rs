//! Tracing setup for the `robokit` binary.
//!
//! Runs log to `$XDG_STATE_HOME/robokit/robokit.log` (appended, no ANSI). When
//! that file cannot be opened the caller switches to stderr. `ROBOKIT_LOG`
//! takes precedence over `RUST_LOG`; with neither set, `DEFAULT_FILTER` applies.

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,robokit=debug,robokit_core=debug";

/// Environment variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "ROBOKIT_LOG";

pub const LOG_FILE_NAME: &str = "robokit.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Directory holding the run log.
pub fn log_dir() -> Result<PathBuf> {
    let dirs = xdg::BaseDirectories::with_prefix("robokit")
        .context("locating XDG state directory")?;
    Ok(dirs.get_state_home())
}

/// Opens (creating as needed) `dir/robokit.log` for appending.
pub fn open_log_file(dir: &Path) -> Result<(PathBuf, File)> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(LOG_FILE_NAME);
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    Ok((path, file))
}

fn install<W>(writer: W, ansi: bool) -> Result<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(ansi)
        .try_init()
        .map_err(|e| anyhow!("installing tracing subscriber: {e}"))
}

/// Logs to the file in `dir`. Returns the log file path.
pub fn init_logging_in(dir: &Path) -> Result<PathBuf> {
    let (path, file) = open_log_file(dir)?;
    install(Arc::new(file), false)?;
    tracing::info!(path = %path.display(), "robokit logging initialized");
    Ok(path)
}

/// Logs to the XDG state dir. An error here means nothing was installed and
/// `init_logging_stderr` can still be used.
pub fn init_logging() -> Result<PathBuf> {
    init_logging_in(&log_dir()?)
}

/// Logs to stderr, colored when stderr is a terminal.
pub fn init_logging_stderr() {
    // Only fails if a subscriber is already set, in which case it keeps working.
    let _ = install(io::stderr, io::stderr().is_terminal());
}
