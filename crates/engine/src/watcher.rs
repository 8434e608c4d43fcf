// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Downloads Watcher (C6): polls an ingest directory every 30 s and
//! enrolls any stable, recognized-media file as a system job (spec.md
//! section 4.6). Grounded step-by-step on
//! `examples/original_source/audio_service.py::monitor_downloads_folder`/
//! `is_file_fully_uploaded`; the `tokio::select!`-over-timer task shape
//! follows `oj-adapters/src/agent/watcher.rs::watch_loop`.

use crate::error::WatcherError;
use scribe_core::{classify, Clock, JobSubmission};
use scribe_storage::QueueStore;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::io::AsyncReadExt;

/// Sentinel `user_id`/`chat_id`/`message_id` for jobs C6 enrolls (spec.md
/// section 6 `downloads_user_id`; the original system's literal `0`).
pub const DOWNLOADS_USER_ID: i64 = 0;

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub ingest_dir: PathBuf,
    pub poll_interval: StdDuration,
    pub stability_interval: StdDuration,
    pub stability_checks: u32,
    pub max_file_size_bytes: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            ingest_dir: PathBuf::from("downloads"),
            poll_interval: StdDuration::from_secs(30),
            stability_interval: StdDuration::from_secs(2),
            stability_checks: 3,
            max_file_size_bytes: 0,
        }
    }
}

/// State one watcher tick needs across polls: which candidate paths are
/// still being watched for size stability, and which have already been
/// enrolled or rejected so they're never reconsidered (spec.md section 9:
/// `files_being_uploaded`/`processed_downloads_files` become context
/// fields rather than module globals).
#[derive(Default)]
pub struct WatcherState {
    files_being_uploaded: HashMap<PathBuf, u64>,
    processed: std::collections::HashSet<PathBuf>,
}

impl WatcherState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of paths currently considered mid-upload, handed to the
    /// cleaner so it never deletes a file still arriving.
    pub fn tracked_paths(&self) -> std::collections::HashSet<PathBuf> {
        self.files_being_uploaded.keys().cloned().collect()
    }
}

pub struct DownloadsWatcher {
    store: Arc<parking_lot::Mutex<QueueStore>>,
    clock: Arc<dyn Clock>,
    config: WatcherConfig,
}

impl DownloadsWatcher {
    pub fn new(store: Arc<parking_lot::Mutex<QueueStore>>, clock: Arc<dyn Clock>, config: WatcherConfig) -> Self {
        Self { store, clock, config }
    }

    /// One full scan of the ingest directory, mutating `state` in place.
    /// Split out from `run` so it can be driven deterministically in
    /// tests without a real 30-s sleep between polls.
    pub async fn tick(&self, state: &mut WatcherState) -> Result<(), WatcherError> {
        if tokio::fs::metadata(&self.config.ingest_dir).await.is_err() {
            tokio::fs::create_dir_all(&self.config.ingest_dir).await?;
            return Ok(());
        }

        let mut entries = tokio::fs::read_dir(&self.config.ingest_dir).await?;
        let mut candidates = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if state.processed.contains(&path) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if classify(file_name).is_none() {
                continue;
            }
            candidates.push(path);
        }

        for path in candidates {
            self.consider(&path, state).await?;
        }

        state
            .files_being_uploaded
            .retain(|path, _| path.exists());

        Ok(())
    }

    async fn consider(&self, path: &Path, state: &mut WatcherState) -> Result<(), WatcherError> {
        let stable = self.is_fully_uploaded(path, state).await;
        if !stable {
            return Ok(());
        }
        state.files_being_uploaded.remove(path);

        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(_) => return Ok(()),
        };
        let file_size = metadata.len();
        if file_size == 0 {
            state.processed.insert(path.to_path_buf());
            return Ok(());
        }
        if self.config.max_file_size_bytes > 0 && file_size > self.config.max_file_size_bytes {
            tracing::warn!(path = %path.display(), file_size, "oversize file in downloads, marking processed without enrollment");
            state.processed.insert(path.to_path_buf());
            return Ok(());
        }

        if self.store.lock().file_in_queue(path) {
            state.processed.insert(path.to_path_buf());
            return Ok(());
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();
        let file_size_mb = file_size as f64 / (1024.0 * 1024.0);

        let submission = JobSubmission {
            user_id: DOWNLOADS_USER_ID,
            chat_id: 0,
            message_id: 0,
            file_path: path.to_path_buf(),
            file_name,
            file_size_mb,
        };
        self.store.lock().enqueue(submission, self.clock.now_utc())?;
        state.processed.insert(path.to_path_buf());
        tracing::info!(path = %path.display(), file_size_mb, "enrolled downloads file for transcription");
        Ok(())
    }

    /// Implements spec.md section 4.6's upload-completion detection: a
    /// non-zero, readable file whose size is unchanged across three
    /// consecutive 2-s-spaced probes, all performed within this one call
    /// (mirrors the blocking shape of `is_file_fully_uploaded`, safe here
    /// because other tasks keep running while this one sleeps). On a
    /// failed probe the file's last observed size is recorded in
    /// `files_being_uploaded` purely so the cleaner can be told not to
    /// delete it; the next tick always redoes the full stability check
    /// from scratch rather than resuming a partial one.
    async fn is_fully_uploaded(&self, path: &Path, state: &mut WatcherState) -> bool {
        let Ok(metadata) = tokio::fs::metadata(path).await else {
            state.files_being_uploaded.remove(path);
            return false;
        };
        let size = metadata.len();
        if size == 0 {
            return false;
        }
        if !Self::readable(path).await {
            return false;
        }

        let initial_size = size;
        for _ in 0..self.config.stability_checks {
            tokio::time::sleep(self.config.stability_interval).await;
            let Ok(metadata) = tokio::fs::metadata(path).await else {
                state.files_being_uploaded.remove(path);
                return false;
            };
            if metadata.len() != initial_size {
                state.files_being_uploaded.insert(path.to_path_buf(), metadata.len());
                return false;
            }
        }

        true
    }

    async fn readable(path: &Path) -> bool {
        let Ok(mut file) = tokio::fs::File::open(path).await else {
            return false;
        };
        let mut byte = [0u8; 1];
        file.read(&mut byte).await.is_ok()
    }

    /// Drive the poll loop forever. Exits when `shutdown` fires.
    pub async fn run(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        let mut state = WatcherState::new();
        loop {
            if *shutdown.borrow() {
                return;
            }
            if let Err(e) = self.tick(&mut state).await {
                tracing::error!(error = %e, "downloads watcher tick failed");
            }
            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                _ = shutdown.changed() => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
