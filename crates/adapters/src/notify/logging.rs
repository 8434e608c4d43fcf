// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging notification adapter.
//!
//! `scribed`'s default `NotifyAdapter` when no real chat front end is
//! attached: every status update and artifact delivery is emitted as a
//! structured `tracing` event rather than silently discarded, so a
//! standalone daemon run is still observable (SPEC_FULL.md section 1).

use super::{NotifyAdapter, NotifyError, SYSTEM_CHAT_ID};
use async_trait::async_trait;
use std::path::Path;

#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingNotifyAdapter;

impl LoggingNotifyAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyAdapter for LoggingNotifyAdapter {
    async fn notify_status(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), NotifyError> {
        if chat_id == SYSTEM_CHAT_ID {
            tracing::info!(text, "system job status (broadcast to admins)");
        } else {
            tracing::info!(chat_id, message_id, text, "job status");
        }
        Ok(())
    }

    async fn send_artifact(
        &self,
        chat_id: i64,
        file_path: &Path,
        caption: &str,
    ) -> Result<(), NotifyError> {
        tracing::info!(chat_id, path = %file_path.display(), caption, "artifact ready");
        Ok(())
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
