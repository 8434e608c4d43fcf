// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Job record and its state machine invariants (I1-I5).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Monotonic primary key. Assignment order is FIFO order (I4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub i64);

impl JobId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for JobId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Derived, non-persisted view of a job's place in the lifecycle (GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Ready,
    Active,
    Finished,
    Cancelled,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Ready => write!(f, "ready"),
            JobStatus::Active => write!(f, "active"),
            JobStatus::Finished => write!(f, "finished"),
            JobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Parameters accepted by `enqueue` (spec.md 4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSubmission {
    pub user_id: i64,
    pub chat_id: i64,
    pub message_id: i64,
    pub file_path: PathBuf,
    pub file_name: String,
    pub file_size_mb: f64,
}

/// A single row of the Queue Store (section 3 of the spec).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub user_id: i64,
    pub chat_id: i64,
    pub message_id: i64,
    pub file_path: PathBuf,
    pub file_name: String,
    pub file_size_mb: f64,
    pub is_active: bool,
    pub finished: bool,
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Construct a freshly-enqueued, ready job. Only the Queue Store calls
    /// this, at `enqueue` time, after assigning the next id.
    pub fn new_ready(id: JobId, submission: JobSubmission, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: submission.user_id,
            chat_id: submission.chat_id,
            message_id: submission.message_id,
            file_path: submission.file_path,
            file_name: submission.file_name,
            file_size_mb: submission.file_size_mb,
            is_active: false,
            finished: false,
            cancelled: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Derived status per I4: ready iff not active, not finished, not cancelled.
    pub fn status(&self) -> JobStatus {
        if self.finished {
            JobStatus::Finished
        } else if self.cancelled {
            JobStatus::Cancelled
        } else if self.is_active {
            JobStatus::Active
        } else {
            JobStatus::Ready
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.status(), JobStatus::Ready)
    }

    pub fn is_terminal(&self) -> bool {
        self.finished || self.cancelled
    }

    /// Assert I1/I2 hold. Used by the store after every mutation and by
    /// tests exercising the state machine directly.
    pub fn check_invariants(&self) {
        debug_assert!(
            !(self.finished && self.cancelled),
            "I1 violated: job {} is both finished and cancelled",
            self.id
        );
        debug_assert!(
            !self.is_active || (!self.finished && !self.cancelled),
            "I2 violated: job {} is active but terminal",
            self.id
        );
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
