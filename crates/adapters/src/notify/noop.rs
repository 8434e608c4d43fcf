// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op notification adapter.

use super::{NotifyAdapter, NotifyError};
use async_trait::async_trait;
use std::path::Path;

/// Notification adapter that silently discards all notifications.
///
/// Used when notifications are disabled or not yet configured, e.g. running
/// the daemon with no chat front end attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpNotifyAdapter;

impl NoOpNotifyAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyAdapter for NoOpNotifyAdapter {
    async fn notify_status(
        &self,
        _chat_id: i64,
        _message_id: i64,
        _text: &str,
    ) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn send_artifact(
        &self,
        _chat_id: i64,
        _file_path: &Path,
        _caption: &str,
    ) -> Result<(), NotifyError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
