// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup: acquire the single-instance lock, open the Queue
//! Store, assemble the Dispatcher Supervisor (C5) and Downloads Watcher
//! (C6), and bind the control socket. Grounded on
//! `oj-daemon::lifecycle::Config::load()`/startup sequencing, narrowed to
//! this system's much smaller set of collaborators.

use crate::config::Config;
use fs2::FileExt;
use scribe_adapters::{
    DesktopNotifyAdapter, FsTempCleaner, LoggingNotifyAdapter, NotifyAdapter,
    PlainTextArtifactWriter, TempCleaner, DEFAULT_MAX_AGE,
};
use scribe_core::{Clock, SystemClock};
use scribe_engine::{
    ActiveProcessMap, CurrentExeChildCommandBuilder, DispatcherConfig, DispatcherContext,
    DispatcherSupervisor, DownloadsWatcher, WatcherConfig,
};
use scribe_storage::QueueStore;
use std::collections::HashSet;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::net::UnixListener;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("another scribed is already running (lock held at {0})")]
    AlreadyRunning(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store error: {0}")]
    Store(#[from] scribe_storage::StoreError),
}

/// Everything the running daemon needs for its lifetime. Held in `main`
/// so the lock file and listener live as long as the process.
pub struct Daemon {
    pub config: Config,
    pub dispatcher_ctx: Arc<DispatcherContext>,
    pub supervisor: Arc<DispatcherSupervisor>,
    pub watcher: Arc<DownloadsWatcher>,
    pub store: Arc<parking_lot::Mutex<QueueStore>>,
    pub clock: Arc<dyn Clock>,
    pub start_time: Instant,
    pub listener: UnixListener,
    // Held only to keep the exclusive file lock alive for the process lifetime.
    _lock_file: File,
}

/// Probe whether a Unix socket is currently accepting connections, the
/// same stale-socket check `oj`'s CLI performs before respawning a
/// daemon.
fn socket_is_live(path: &std::path::Path) -> bool {
    std::os::unix::net::UnixStream::connect(path).is_ok()
}

pub async fn start(config: Config) -> Result<Daemon, LifecycleError> {
    config.ensure_dirs()?;

    let lock_file = File::create(&config.lock_path)?;
    if lock_file.try_lock_exclusive().is_err() {
        return Err(LifecycleError::AlreadyRunning(config.lock_path.clone()));
    }

    if config.socket_path.exists() {
        if socket_is_live(&config.socket_path) {
            return Err(LifecycleError::AlreadyRunning(config.socket_path.clone()));
        }
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)?;

    let store = Arc::new(parking_lot::Mutex::new(QueueStore::open(
        &config.queue_dir,
    )?));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let notify: Arc<dyn NotifyAdapter> = if config.use_desktop_notify {
        Arc::new(DesktopNotifyAdapter::new())
    } else {
        Arc::new(LoggingNotifyAdapter::new())
    };
    let artifact_writer = Arc::new(PlainTextArtifactWriter::new(
        config.transcriptions_dir.clone(),
    ));
    let cleaner: Arc<dyn TempCleaner> = Arc::new(FsTempCleaner::new(
        vec![config.temp_audio_dir.clone(), config.downloads_dir.clone()],
        DEFAULT_MAX_AGE,
    ));
    let active_map = Arc::new(ActiveProcessMap::new());
    let uploading_paths = Arc::new(parking_lot::Mutex::new(HashSet::new()));

    let dispatcher_config = DispatcherConfig {
        default_model: config.default_model.clone(),
        small_model_threshold_mb: config.small_model_threshold_mb,
        ..DispatcherConfig::default()
    };

    let dispatcher_ctx = Arc::new(DispatcherContext::new(
        store.clone(),
        notify,
        artifact_writer,
        cleaner,
        Arc::new(CurrentExeChildCommandBuilder),
        active_map,
        clock.clone(),
        uploading_paths,
        config.state_dir.clone(),
        config.temp_audio_dir.clone(),
        dispatcher_config,
    ));
    let supervisor = Arc::new(DispatcherSupervisor::new(dispatcher_ctx.clone()));

    let watcher = Arc::new(DownloadsWatcher::new(
        store.clone(),
        clock.clone(),
        WatcherConfig {
            ingest_dir: config.downloads_dir.clone(),
            poll_interval: std::time::Duration::from_secs(config.downloads_poll_interval_s),
            stability_interval: std::time::Duration::from_secs(2),
            stability_checks: 3,
            max_file_size_bytes: (config.max_file_size_mb * 1024.0 * 1024.0) as u64,
        },
    ));

    Ok(Daemon {
        config,
        dispatcher_ctx,
        supervisor,
        watcher,
        store,
        clock,
        start_time: Instant::now(),
        listener,
        _lock_file: lock_file,
    })
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.config.socket_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
