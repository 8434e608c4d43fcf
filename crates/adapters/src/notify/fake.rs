// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake notification adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{NotifyAdapter, NotifyError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recorded `notify_status` call.
#[derive(Debug, Clone)]
pub struct StatusCall {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: String,
}

/// Recorded `send_artifact` call.
#[derive(Debug, Clone)]
pub struct ArtifactCall {
    pub chat_id: i64,
    pub file_path: PathBuf,
    pub caption: String,
}

struct FakeNotifyState {
    status_calls: Vec<StatusCall>,
    artifact_calls: Vec<ArtifactCall>,
}

/// Fake notification adapter for testing. Records every call instead of
/// sending anything, so dispatcher tests can assert on exactly what C7 was
/// asked to deliver.
#[derive(Clone)]
pub struct FakeNotifyAdapter {
    inner: Arc<Mutex<FakeNotifyState>>,
}

impl Default for FakeNotifyAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeNotifyState {
                status_calls: Vec::new(),
                artifact_calls: Vec::new(),
            })),
        }
    }
}

impl FakeNotifyAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status_calls(&self) -> Vec<StatusCall> {
        self.inner.lock().status_calls.clone()
    }

    pub fn artifact_calls(&self) -> Vec<ArtifactCall> {
        self.inner.lock().artifact_calls.clone()
    }
}

#[async_trait]
impl NotifyAdapter for FakeNotifyAdapter {
    async fn notify_status(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), NotifyError> {
        self.inner.lock().status_calls.push(StatusCall {
            chat_id,
            message_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_artifact(
        &self,
        chat_id: i64,
        file_path: &Path,
        caption: &str,
    ) -> Result<(), NotifyError> {
        self.inner.lock().artifact_calls.push(ArtifactCall {
            chat_id,
            file_path: file_path.to_path_buf(),
            caption: caption.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
