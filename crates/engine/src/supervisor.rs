// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Dispatcher Supervisor (C5): maintains the invariant "exactly one
//! dispatcher task is alive and not yet completed" (spec.md section 4.5).
//! On start it resets stale `is_active` flags left over from a previous
//! crash, then spawns C4; a periodic health check restarts it if it ever
//! exits. Grounded in timer shape on `examples/original_source/
//! audio_service.py`'s `monitor_background_processor`/
//! `ensure_background_processor_running` pair (300 s tick, cancel-and-wait
//! with a 2 s grace period before declaring the old task gone).

use crate::dispatcher::{self, DispatcherContext};
use scribe_core::Clock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Health-check cadence (spec.md section 4.5, section 6
/// `dispatcher_health_interval_s`, default 300 s).
pub const HEALTH_CHECK_INTERVAL: std::time::Duration = std::time::Duration::from_secs(300);
/// Grace period given to a cancelled dispatcher task before it's
/// considered unresponsive (spec.md section 5's "2 s grace wait before
/// respawn").
const RESPAWN_GRACE: std::time::Duration = std::time::Duration::from_secs(2);

/// Owns the current dispatcher task handle. Spawn/restart is
/// mutex-guarded so two concurrent health checks can never race into
/// spawning a second dispatcher (spec.md section 4.5).
pub struct DispatcherSupervisor {
    ctx: Arc<DispatcherContext>,
    current: Mutex<Option<JoinHandle<()>>>,
}

impl DispatcherSupervisor {
    pub fn new(ctx: Arc<DispatcherContext>) -> Self {
        Self {
            ctx,
            current: Mutex::new(None),
        }
    }

    /// Clears stale `is_active` flags orphaned by a previous crash, then
    /// spawns the dispatcher task for the first time. Call once at
    /// process start, before `run`.
    pub async fn start(&self, shutdown: tokio::sync::watch::Receiver<bool>) {
        if let Err(e) = self.ctx.store.lock().reset_active(self.ctx.clock.now_utc()) {
            tracing::error!(error = %e, "failed to reset stale active flags at startup");
        }
        self.ensure_running(shutdown).await;
    }

    /// Idempotent: spawns a dispatcher task iff none is currently alive.
    /// If the previous task is still running this is a no-op; if it has
    /// finished (normally, by panic, or by cancellation) the old handle is
    /// dropped and a fresh task is spawned.
    async fn ensure_running(&self, shutdown: tokio::sync::watch::Receiver<bool>) {
        let mut guard = self.current.lock().await;

        let needs_restart = match guard.as_ref() {
            None => true,
            Some(handle) => handle.is_finished(),
        };
        if !needs_restart {
            return;
        }

        if let Some(handle) = guard.take() {
            if !handle.is_finished() {
                handle.abort();
                let _ = tokio::time::timeout(RESPAWN_GRACE, handle).await;
            } else {
                match handle.await {
                    Ok(()) => tracing::info!("dispatcher task exited cleanly, restarting"),
                    Err(e) if e.is_cancelled() => {
                        tracing::info!("dispatcher task was cancelled, restarting")
                    }
                    Err(e) => tracing::error!(error = %e, "dispatcher task panicked, restarting"),
                }
            }
        }

        let ctx = self.ctx.clone();
        *guard = Some(tokio::spawn(dispatcher::run(ctx, shutdown)));
    }

    /// Drive the periodic health check forever. Exits when `shutdown`
    /// fires.
    pub async fn run(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(HEALTH_CHECK_INTERVAL) => {
                    self.ensure_running(shutdown.clone()).await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
