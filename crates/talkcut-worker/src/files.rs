//! Filesystem helpers for pipeline artifacts.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::WorkerResult;

/// Extensions recognized as input videos.
pub const SUPPORTED_VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mov", "avi", "mkv"];

/// Write a serializable value as pretty-printed JSON.
pub async fn save_json<T: Serialize>(value: &T, path: &Path) -> WorkerResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json).await?;

    debug!(path = %path.display(), "Artifact written");

    Ok(())
}

/// List video files in `dir` with a supported extension, sorted by name.
pub async fn video_files(dir: &Path) -> WorkerResult<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file() && has_supported_extension(&path) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_VIDEO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
