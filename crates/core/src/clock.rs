// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time abstraction so dispatcher cadence and watcher polling can be
//! driven deterministically in tests.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Source of monotonic and wall-clock time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Monotonic instant, used for elapsed-time measurement and timers.
    fn now(&self) -> Instant;

    /// Wall-clock time, used for `created_at`/`updated_at` audit fields.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Real clock backed by the OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests. Starts at the time of construction and
/// only moves forward when told to.
#[derive(Debug)]
pub struct FakeClock {
    inner: Mutex<(Instant, DateTime<Utc>)>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new((Instant::now(), Utc::now())),
        }
    }

    /// Move the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let mut guard = self.inner.lock();
        guard.0 += duration;
        guard.1 += chrono::Duration::from_std(duration).unwrap_or_default();
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.inner.lock().0
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.inner.lock().1
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
