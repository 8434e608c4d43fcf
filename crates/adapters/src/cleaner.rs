// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The temp-file cleaner collaborator the dispatcher invokes every 10th
//! tick and after finishing each job (spec.md section 4.4 steps 1, 14).
//! Grounded on `examples/original_source/files_service.py`'s
//! `cleanup_temp_files`: delete a specific file, or sweep files older than
//! a retention window, while preserving anything still being uploaded or
//! still referenced by an unfinished job.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

#[async_trait]
pub trait TempCleaner: Send + Sync + 'static {
    /// Delete files under the watched directories older than the
    /// retention window, skipping anything in `preserve`.
    async fn cleanup_stale(&self, preserve: &HashSet<PathBuf>);
    /// Delete one specific file, ignoring a missing file.
    async fn cleanup_file(&self, path: &Path);
}

/// Default retention window: files older than this are eligible for
/// sweep-cleanup (spec.md section 6).
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Sweeps one or more directories (`temp_audio/`, `downloads/`) for files
/// older than `max_age`.
pub struct FsTempCleaner {
    dirs: Vec<PathBuf>,
    max_age: Duration,
}

impl FsTempCleaner {
    pub fn new(dirs: Vec<PathBuf>, max_age: Duration) -> Self {
        Self { dirs, max_age }
    }

    async fn is_stale(&self, path: &Path) -> bool {
        let Ok(metadata) = tokio::fs::metadata(path).await else {
            return false;
        };
        let Ok(modified) = metadata.modified() else {
            return false;
        };
        match SystemTime::now().duration_since(modified) {
            Ok(age) => age >= self.max_age,
            Err(_) => false,
        }
    }
}

#[async_trait]
impl TempCleaner for FsTempCleaner {
    async fn cleanup_stale(&self, preserve: &HashSet<PathBuf>) {
        for dir in &self.dirs {
            let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
                continue;
            };
            while let Ok(Some(entry)) = entries.next_entry().await {
                let path = entry.path();
                if preserve.contains(&path) {
                    continue;
                }
                if self.is_stale(&path).await {
                    if let Err(e) = tokio::fs::remove_file(&path).await {
                        tracing::warn!(path = %path.display(), error = %e, "failed to remove stale temp file");
                    } else {
                        tracing::info!(path = %path.display(), "removed stale temp file");
                    }
                }
            }
        }
    }

    async fn cleanup_file(&self, path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::info!(path = %path.display(), "removed temp file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove temp file"),
        }
    }
}

#[cfg(test)]
#[path = "cleaner_tests.rs"]
mod tests;
