// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: every option spec.md section 6 enumerates, plus
//! the filesystem layout (state dir, socket, lock file, WAL/snapshot
//! directory, the three content directories of spec.md section 6's
//! filesystem contract), loaded from environment variables with defaults
//! the way `oj-daemon::lifecycle::Config::load()` resolves an XDG-style
//! state directory.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a state directory (set SCRIBE_STATE_DIR)")]
    NoStateDir,
}

/// Runtime configuration, assembled once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (`~/.local/state/scribe` or `$SCRIBE_STATE_DIR`).
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub log_dir: PathBuf,
    /// Directory `QueueStore::open` manages (WAL + snapshot files).
    pub queue_dir: PathBuf,
    /// spec.md section 6 `temp_audio/`.
    pub temp_audio_dir: PathBuf,
    /// spec.md section 6 `downloads/` (the C6 ingest directory).
    pub downloads_dir: PathBuf,
    /// spec.md section 6 `transcriptions/`.
    pub transcriptions_dir: PathBuf,

    /// spec.md section 6 `default_model`.
    pub default_model: String,
    /// spec.md section 6 `small_model_threshold_mb`.
    pub small_model_threshold_mb: f64,
    /// spec.md section 6 `max_file_size`, in megabytes. Enforced by the
    /// listener at `Submit` time, ahead of `QueueStore::enqueue`.
    pub max_file_size_mb: f64,
    /// spec.md section 6 `downloads_user_id`.
    pub downloads_user_id: i64,
    /// spec.md section 6 `admin_ids[]`. Recorded for a future chat-bot
    /// `NotifyAdapter`; the bundled `LoggingNotifyAdapter`/
    /// `DesktopNotifyAdapter` have no broadcast surface of their own.
    pub admin_ids: Vec<i64>,
    /// spec.md section 6 `downloads_poll_interval_s`.
    pub downloads_poll_interval_s: u64,
    /// spec.md section 6 `dispatcher_health_interval_s`.
    pub dispatcher_health_interval_s: u64,

    /// Use the desktop-notification adapter instead of the logging
    /// default (SPEC_FULL.md section 3).
    pub use_desktop_notify: bool,
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn env_ids(key: &str) -> Vec<i64> {
    std::env::var(key)
        .ok()
        .map(|v| {
            v.split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect()
        })
        .unwrap_or_default()
}

impl Config {
    /// Resolve configuration for the user-level daemon. One daemon
    /// serves one queue; there is no per-project namespacing (spec.md
    /// section 1 Non-goals: single-node worker only).
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = match std::env::var("SCRIBE_STATE_DIR") {
            Ok(v) => PathBuf::from(v),
            Err(_) => dirs::state_dir()
                .or_else(dirs::data_local_dir)
                .ok_or(ConfigError::NoStateDir)?
                .join("scribe"),
        };

        Ok(Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.lock"),
            log_dir: state_dir.join("logs"),
            queue_dir: state_dir.join("queue"),
            temp_audio_dir: state_dir.join("temp_audio"),
            downloads_dir: state_dir.join("downloads"),
            transcriptions_dir: state_dir.join("transcriptions"),

            default_model: env_string("SCRIBE_DEFAULT_MODEL", "small"),
            small_model_threshold_mb: env_f64("SCRIBE_SMALL_MODEL_THRESHOLD_MB", 20.0),
            max_file_size_mb: env_f64("SCRIBE_MAX_FILE_SIZE_MB", 2000.0),
            downloads_user_id: env_i64("SCRIBE_DOWNLOADS_USER_ID", 0),
            admin_ids: env_ids("SCRIBE_ADMIN_IDS"),
            downloads_poll_interval_s: env_u64("SCRIBE_DOWNLOADS_POLL_INTERVAL_S", 30),
            dispatcher_health_interval_s: env_u64("SCRIBE_DISPATCHER_HEALTH_INTERVAL_S", 300),
            use_desktop_notify: env_bool("SCRIBE_DESKTOP_NOTIFY"),

            state_dir,
        })
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [
            &self.state_dir,
            &self.log_dir,
            &self.queue_dir,
            &self.temp_audio_dir,
            &self.downloads_dir,
            &self.transcriptions_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
