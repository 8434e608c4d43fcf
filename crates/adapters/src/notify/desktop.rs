// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop notification adapter using notify-rust.
//!
//! On macOS, `notify-rust` uses `mac-notification-sys` (Cocoa bindings) to send
//! notifications via the Notification Center. The first notification triggers
//! `ensure_application_set()` which runs an AppleScript to look up a bundle
//! identifier. In a daemon context without Automation permissions, that
//! AppleScript blocks forever. We pre-set the bundle identifier at construction
//! time to bypass the lookup entirely.
//!
//! This adapter has no chat surface to edit messages in place, so
//! `notify_status` and `send_artifact` both surface as local desktop
//! notifications — useful for running the daemon standalone without a bot
//! front end attached.

use super::{NotifyAdapter, NotifyError, SYSTEM_CHAT_ID};
use async_trait::async_trait;
use std::path::Path;

#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopNotifyAdapter;

impl DesktopNotifyAdapter {
    pub fn new() -> Self {
        #[cfg(target_os = "macos")]
        {
            // Pre-set the application bundle identifier so mac-notification-sys
            // skips its NSAppleScript lookup (which blocks forever in daemon
            // processes that lack Automation permissions).
            let _ = mac_notification_sys::set_application("com.apple.Terminal");
        }
        Self
    }

    fn show(summary: String, body: String) {
        // notify_rust::Notification::show() is synchronous on macOS.
        // Fire-and-forget on tokio's bounded blocking thread pool to avoid
        // blocking the async runtime while capping OS thread count.
        tokio::task::spawn_blocking(move || {
            tracing::info!(%summary, "sending desktop notification");
            match notify_rust::Notification::new()
                .summary(&summary)
                .body(&body)
                .show()
            {
                Ok(_) => {
                    tracing::info!(%summary, "desktop notification sent");
                }
                Err(e) => {
                    tracing::warn!(%summary, error = %e, "desktop notification failed");
                }
            }
        });
    }
}

#[async_trait]
impl NotifyAdapter for DesktopNotifyAdapter {
    async fn notify_status(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), NotifyError> {
        let summary = if chat_id == SYSTEM_CHAT_ID {
            "scribe (system job)".to_string()
        } else {
            format!("scribe chat {chat_id} msg {message_id}")
        };
        Self::show(summary, text.to_string());
        Ok(())
    }

    async fn send_artifact(
        &self,
        chat_id: i64,
        file_path: &Path,
        caption: &str,
    ) -> Result<(), NotifyError> {
        let summary = format!("scribe artifact ready (chat {chat_id})");
        let body = format!("{caption}\n{}", file_path.display());
        Self::show(summary, body);
        Ok(())
    }
}
