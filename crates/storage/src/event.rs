// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events durably recorded by the WAL. Each variant corresponds to one of
//! the Queue Store's mutators (C1, spec section 4.1).

use chrono::{DateTime, Utc};
use scribe_core::{JobId, JobSubmission};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QueueEvent {
    Enqueued {
        id: JobId,
        submission: JobSubmission,
        at: DateTime<Utc>,
    },
    Claimed {
        id: JobId,
        at: DateTime<Utc>,
    },
    Finished {
        id: JobId,
        at: DateTime<Utc>,
    },
    Cancelled {
        id: JobId,
        at: DateTime<Utc>,
    },
    ActiveReset {
        at: DateTime<Utc>,
    },
}
