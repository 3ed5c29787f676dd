//! File-based tracing setup. The terminal belongs to the UI, so events go to
//! `<data dir>/faq-tui.log`.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive (e.g. `debug`).
pub const LOG_ENV: &str = "FAQ_LOG";
pub const LOG_FILE_NAME: &str = "faq-tui.log";

pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_FILE_NAME)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber, appending to `path`.
pub fn init(path: &Path) -> Result<()> {
    let file: File = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(anyhow::Error::msg)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_is_inside_data_dir() {
        let dir = Path::new("/tmp/faq");
        assert_eq!(log_path(dir), Path::new("/tmp/faq/faq-tui.log"));
    }
}
