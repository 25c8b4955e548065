//! Environment/runtime helpers
//!
//! Sanity checks run once at startup before the database is opened.

use std::path::{Path, PathBuf};

use tracing::info;

/// File path of an on-disk SQLite URL, `None` for in-memory or non-SQLite URLs.
///
/// Accepts `sqlite://path`, `sqlite:path` and an optional `?query` suffix.
pub fn sqlite_file_path(database_url: &str) -> Option<PathBuf> {
    let rest = database_url.strip_prefix("sqlite:")?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" || path.starts_with(":memory") {
        return None;
    }
    Some(PathBuf::from(path))
}

/// Ensure the directory holding a SQLite database file exists.
pub async fn ensure_env(database_url: &str) -> anyhow::Result<()> {
    let Some(file) = sqlite_file_path(database_url) else {
        return Ok(());
    };
    if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent).await?;
    }
    Ok(())
}

async fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    if tokio::fs::metadata(dir).await.is_err() {
        info!(dir = %dir.display(), "creating data directory");
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))
}
