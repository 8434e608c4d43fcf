// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Queue Store (C1): a durable, ordered collection of [`Job`] records
//! with atomic state transitions. [`MaterializedState`] is the in-memory
//! projection rebuilt by replaying [`QueueEvent`]s from the WAL/snapshot;
//! [`QueueStore`] is the façade spec.md section 4.1 names, combining the
//! materialized state with the WAL that makes its mutations durable.

use crate::event::QueueEvent;
use crate::snapshot::Snapshot;
use crate::wal::{Wal, WalError};
use chrono::{DateTime, Utc};
use scribe_core::{Job, JobId, JobSubmission};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Every mutation that reaches the store travels through this error type,
/// matching the `TransientStoreError` kind spec.md section 7 names.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("wal error: {0}")]
    Wal(#[from] WalError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] crate::snapshot::SnapshotError),
}

/// In-memory projection of every job ever enqueued, ordered by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterializedState {
    jobs: BTreeMap<JobId, Job>,
    next_id: i64,
}

impl MaterializedState {
    fn apply(&mut self, event: &QueueEvent) {
        match event {
            QueueEvent::Enqueued {
                id, submission, at, ..
            } => {
                let job = Job::new_ready(*id, submission.clone(), *at);
                self.next_id = self.next_id.max(id.get() + 1);
                self.jobs.insert(*id, job);
            }
            QueueEvent::Claimed { id, at } => {
                if let Some(job) = self.jobs.get_mut(id) {
                    if job.is_ready() {
                        job.is_active = true;
                        job.updated_at = *at;
                    }
                }
            }
            QueueEvent::Finished { id, at } => {
                if let Some(job) = self.jobs.get_mut(id) {
                    if !job.is_terminal() {
                        job.finished = true;
                        job.is_active = false;
                        job.updated_at = *at;
                    }
                }
            }
            QueueEvent::Cancelled { id, at } => {
                if let Some(job) = self.jobs.get_mut(id) {
                    if !job.is_terminal() {
                        job.cancelled = true;
                        job.is_active = false;
                        job.updated_at = *at;
                    }
                }
            }
            QueueEvent::ActiveReset { at } => {
                for job in self.jobs.values_mut() {
                    if job.is_active {
                        job.is_active = false;
                        job.updated_at = *at;
                    }
                }
            }
        }
    }

    fn next_id(&mut self) -> JobId {
        let id = JobId::new(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(&id)
    }

    /// I4: the ready job with the smallest id, if any.
    pub fn take_next_ready(&self) -> Option<&Job> {
        self.jobs.values().find(|j| j.is_ready())
    }

    pub fn list_active(&self) -> Vec<&Job> {
        self.jobs.values().filter(|j| j.is_active).collect()
    }

    pub fn list_user_ready_or_active(&self, user_id: i64) -> Vec<&Job> {
        self.jobs
            .values()
            .filter(|j| j.user_id == user_id && !j.is_terminal())
            .collect()
    }

    pub fn is_cancelled(&self, id: JobId) -> bool {
        self.jobs.get(&id).map(|j| j.cancelled).unwrap_or(false)
    }

    pub fn file_in_queue(&self, file_path: &Path) -> bool {
        self.jobs
            .values()
            .any(|j| !j.is_terminal() && j.file_path == file_path)
    }

    /// Source file paths of every ready or active job, across all users.
    /// Used by the cleaner to preserve files still referenced by an
    /// unfinished job (spec.md section 6).
    pub fn unfinished_file_paths(&self) -> Vec<std::path::PathBuf> {
        self.jobs
            .values()
            .filter(|j| !j.is_terminal())
            .map(|j| j.file_path.clone())
            .collect()
    }
}

/// The durable Queue Store: [`MaterializedState`] plus the WAL that makes
/// every mutation crash-safe, and a snapshot that bounds WAL replay time.
pub struct QueueStore {
    state: MaterializedState,
    wal: Wal,
    snapshot_path: std::path::PathBuf,
    snapshot_every: u64,
    last_snapshot_seq: u64,
}

impl QueueStore {
    /// Open the store at `dir`, loading the latest snapshot (if any) and
    /// replaying any WAL entries written after it.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir)?;
        let snapshot_path = dir.join("snapshot.zst");
        let wal_path = dir.join("wal.jsonl");

        let snapshot = Snapshot::load(&snapshot_path)?;
        let (mut state, start_seq) = match snapshot {
            Some(s) => (s.state, s.seq),
            None => (MaterializedState::default(), 0),
        };

        let wal = Wal::open(&wal_path)?;
        for entry in wal.entries_after(start_seq)? {
            state.apply(&entry.event);
        }

        Ok(Self {
            state,
            wal,
            snapshot_path,
            snapshot_every: 500,
            last_snapshot_seq: start_seq,
        })
    }

    fn commit(&mut self, event: QueueEvent) -> Result<(), StoreError> {
        let seq = self.wal.append(&event)?;
        self.state.apply(&event);
        self.wal.flush()?;
        if seq.saturating_sub(self.last_snapshot_seq) >= self.snapshot_every {
            self.checkpoint(seq)?;
        }
        Ok(())
    }

    /// The WAL's current write sequence number, i.e. the `seq` a
    /// checkpoint taken right now should be tagged with. Exposed so the
    /// daemon can checkpoint cleanly on shutdown.
    pub fn write_seq(&self) -> u64 {
        self.wal.write_seq()
    }

    /// Write a snapshot and truncate the WAL up to it. Exposed so the
    /// daemon can call it on clean shutdown in addition to the periodic
    /// trigger inside `commit`.
    pub fn checkpoint(&mut self, seq: u64) -> Result<(), StoreError> {
        let snapshot = Snapshot::new(seq, self.state.clone());
        snapshot.save(&self.snapshot_path)?;
        self.wal.truncate_before(seq)?;
        self.last_snapshot_seq = seq;
        Ok(())
    }

    pub fn enqueue(
        &mut self,
        submission: JobSubmission,
        now: DateTime<Utc>,
    ) -> Result<JobId, StoreError> {
        let id = self.state.next_id();
        self.commit(QueueEvent::Enqueued {
            id,
            submission,
            at: now,
        })?;
        Ok(id)
    }

    pub fn take_next_ready(&self) -> Option<Job> {
        self.state.take_next_ready().cloned()
    }

    /// Atomically sets `is_active = true` iff the job is currently ready.
    pub fn claim(&mut self, id: JobId, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let was_ready = self.state.get(id).map(|j| j.is_ready()).unwrap_or(false);
        if !was_ready {
            return Ok(false);
        }
        self.commit(QueueEvent::Claimed { id, at: now })?;
        Ok(true)
    }

    /// Idempotent: returns false if the job was already terminal (P5, P6).
    pub fn finish(&mut self, id: JobId, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let already_terminal = self.state.get(id).map(|j| j.is_terminal()).unwrap_or(true);
        if already_terminal {
            return Ok(false);
        }
        self.commit(QueueEvent::Finished { id, at: now })?;
        Ok(true)
    }

    /// Idempotent: returns false if the job was already terminal (P5, P6).
    pub fn cancel(&mut self, id: JobId, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let already_terminal = self.state.get(id).map(|j| j.is_terminal()).unwrap_or(true);
        if already_terminal {
            return Ok(false);
        }
        self.commit(QueueEvent::Cancelled { id, at: now })?;
        Ok(true)
    }

    pub fn is_cancelled(&self, id: JobId) -> bool {
        self.state.is_cancelled(id)
    }

    pub fn list_user_ready_or_active(&self, user_id: i64) -> Vec<Job> {
        self.state
            .list_user_ready_or_active(user_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn list_active(&self) -> Vec<Job> {
        self.state.list_active().into_iter().cloned().collect()
    }

    /// Clears stale `is_active` flags left by a crash (called only by C5 at
    /// startup, per spec.md section 4.5). Never moves a job to a terminal
    /// state (P7).
    pub fn reset_active(&mut self, now: DateTime<Utc>) -> Result<(), StoreError> {
        self.commit(QueueEvent::ActiveReset { at: now })
    }

    pub fn file_in_queue(&self, file_path: &Path) -> bool {
        self.state.file_in_queue(file_path)
    }

    /// Source file paths of every ready or active job, across all users.
    pub fn unfinished_file_paths(&self) -> Vec<std::path::PathBuf> {
        self.state.unfinished_file_paths()
    }

    pub fn get(&self, id: JobId) -> Option<Job> {
        self.state.get(id).cloned()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
