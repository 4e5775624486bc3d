use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::pipeline::composite::OUTPUT_SUFFIX;

/// Deletes output videos in `dir` whose modification time is older than `ttl`.
/// Other files are left alone. Returns the number of files removed. A missing
/// directory counts as empty.
pub async fn evict_expired(dir: &Path, ttl: Duration) -> std::io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err),
    };

    let now = SystemTime::now();
    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_name().to_string_lossy().ends_with(OUTPUT_SUFFIX) {
            continue;
        }
        let metadata = match entry.metadata().await {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => continue,
        };
        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();
        if age < ttl {
            continue;
        }
        match tokio::fs::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(err) => tracing::warn!("Failed to remove {}: {}", entry.path().display(), err),
        }
    }

    tracing::info!("Output eviction complete. Removed {} file(s) from {}", removed, dir.display());
    Ok(removed)
}

/// Runs [`evict_expired`] every `interval` until the task is dropped.
pub async fn run_sweeper(dir: std::path::PathBuf, ttl: Duration, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;
        if let Err(err) = evict_expired(&dir, ttl).await {
            tracing::warn!("Output eviction failed for {}: {}", dir.display(), err);
        }
    }
}
