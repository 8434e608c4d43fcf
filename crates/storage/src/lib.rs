// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! scribe-storage: the Queue Store (C1) — a JSONL write-ahead log with
//! group commit, a zstd-compressed snapshot for fast restart, and the
//! materialized in-memory state that both durability mechanisms replay
//! into.

mod event;
mod snapshot;
mod state;
mod wal;

pub use event::QueueEvent;
pub use snapshot::{Snapshot, SnapshotError};
pub use state::{MaterializedState, QueueStore, StoreError};
pub use wal::{Wal, WalEntry, WalError};
