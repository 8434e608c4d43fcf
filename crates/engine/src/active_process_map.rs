// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Active Process Map (spec.md section 9): the one piece of process
//! state shared between the dispatcher's own loop and the out-of-band
//! cancel path. Written only by the dispatcher (insert on spawn, remove
//! on terminal) and read by whatever drives cancellation; a single mutex
//! guards it, per section 5's "Active Process Map is accessed only from
//! the dispatcher task and the cancel path" rule.

use crate::runner::TranscriptionResult;
use parking_lot::Mutex;
use scribe_adapters::transcribe_child::ChildHandle;
use scribe_core::JobId;
use std::collections::HashMap;
use std::sync::Arc;

/// Keyed by job id; holds the live child handle for whichever job is
/// currently being processed. At most one entry at a time (P3: at most
/// one active job).
#[derive(Default)]
pub struct ActiveProcessMap {
    inner: Mutex<HashMap<JobId, Arc<ChildHandle<TranscriptionResult>>>>,
}

impl ActiveProcessMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: JobId, handle: Arc<ChildHandle<TranscriptionResult>>) {
        self.inner.lock().insert(id, handle);
    }

    pub fn remove(&self, id: JobId) {
        self.inner.lock().remove(&id);
    }

    pub fn get(&self, id: JobId) -> Option<Arc<ChildHandle<TranscriptionResult>>> {
        self.inner.lock().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "active_process_map_tests.rs"]
mod tests;
