// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification adapters — the Notification Port (C7).
//!
//! The dispatcher depends on [`NotifyAdapter`] but never implements it;
//! notification failures are logged and swallowed, never propagated into
//! job outcomes.

mod desktop;
mod logging;
mod noop;

pub use desktop::DesktopNotifyAdapter;
pub use logging::LoggingNotifyAdapter;
pub use noop::NoOpNotifyAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ArtifactCall, FakeNotifyAdapter, StatusCall};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors from notify operations.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Sentinel `chat_id` used by system jobs (e.g. ones enqueued by the
/// downloads watcher rather than a user). Status updates for this id are
/// broadcast to the configured administrator set instead of edited
/// in-place.
pub const SYSTEM_CHAT_ID: i64 = 0;

/// Outbound interface the dispatcher (C4) uses to report progress and
/// deliver final artifacts. Implementations must never let a send failure
/// propagate — log and swallow.
#[async_trait]
pub trait NotifyAdapter: Send + Sync + 'static {
    /// Edit the status message for `(chat_id, message_id)` in place. If the
    /// message is missing or the edit otherwise fails, a new message should
    /// be sent and used for subsequent calls. `chat_id == 0` means a
    /// system job: broadcast to the administrator set instead.
    async fn notify_status(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), NotifyError>;

    /// Attach a file to the given chat, splitting into parts if it exceeds
    /// the upstream size cap.
    async fn send_artifact(
        &self,
        chat_id: i64,
        file_path: &Path,
        caption: &str,
    ) -> Result<(), NotifyError>;
}
