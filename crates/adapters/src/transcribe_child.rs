// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Child-Process Supervisor (C3): spawns the Transcription Runner (C2)
//! in an isolated OS process so it can be forcibly terminated without
//! corrupting the dispatcher, and ferries its result back over a pair of
//! one-shot channels.
//!
//! The caller assembles the [`tokio::process::Command`] (typically the
//! daemon's own binary re-invoked with a hidden worker subcommand); this
//! module only owns the spawn/poll/kill/await protocol, not the argv the
//! worker runs with.
//!
//! Wire protocol: on success the child writes exactly one line of JSON to
//! stdout before exiting 0 — either `{"tag":"ok","value":<T>}` or
//! `{"tag":"cancelled"}` — and nothing else. On unrecoverable failure it
//! writes a one-line error message to stderr and exits non-zero. Any other
//! exit code is surfaced to the caller as `Exited`.

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::sync::{oneshot, Mutex};
use tokio::time::{sleep, Instant};

/// Grace period after SIGTERM before escalating to SIGKILL.
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(5);
/// Additional wait after SIGKILL before giving up on the process exiting.
const FORCEFUL_TIMEOUT: Duration = Duration::from_secs(2);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum ChildError {
    #[error("failed to spawn child process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("io error waiting on child: {0}")]
    Io(#[source] std::io::Error),
    #[error("child exited 0 but stdout did not match the result protocol: {0}")]
    Protocol(String),
    #[error("child reported an error: {0}")]
    Reported(String),
}

/// The success payload a child can report, parameterized over the result
/// type `T` the caller expects from the Transcription Runner.
#[derive(Debug)]
pub enum ChildOutcome<T> {
    Success(T),
    Cancelled,
}

#[derive(Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
enum WireOutcome<T> {
    Ok { value: T },
    Cancelled,
}

/// Result of a non-blocking [`ChildHandle::poll`].
#[derive(Debug)]
pub enum ChildExit<T> {
    Running,
    Done(ChildOutcome<T>),
    Failed(ChildError),
    Exited(i32),
}

struct Streams {
    stdout: Mutex<Option<oneshot::Receiver<Vec<u8>>>>,
    stderr: Mutex<Option<oneshot::Receiver<Vec<u8>>>>,
}

/// Handle to a spawned child, returned by [`start`].
pub struct ChildHandle<T> {
    pid: u32,
    child: Mutex<Child>,
    streams: Streams,
    _marker: std::marker::PhantomData<T>,
}

/// Spawn `cmd` as an isolated child process, capturing stdout/stderr for
/// the one-shot result/error protocol.
pub fn start<T>(mut cmd: Command) -> Result<ChildHandle<T>, ChildError>
where
    T: DeserializeOwned + Send + 'static,
{
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());
    cmd.kill_on_drop(true);

    let mut child = cmd.spawn().map_err(ChildError::Spawn)?;
    let pid = child.id().ok_or_else(|| {
        ChildError::Spawn(std::io::Error::other("child exited before pid could be read"))
    })?;

    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();

    let (stdout_tx, stdout_rx) = oneshot::channel();
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(stdout) = stdout.as_mut() {
            let _ = stdout.read_to_end(&mut buf).await;
        }
        let _ = stdout_tx.send(buf);
    });

    let (stderr_tx, stderr_rx) = oneshot::channel();
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(stderr) = stderr.as_mut() {
            let _ = stderr.read_to_end(&mut buf).await;
        }
        let _ = stderr_tx.send(buf);
    });

    Ok(ChildHandle {
        pid,
        child: Mutex::new(child),
        streams: Streams {
            stdout: Mutex::new(Some(stdout_rx)),
            stderr: Mutex::new(Some(stderr_rx)),
        },
        _marker: std::marker::PhantomData,
    })
}

impl<T> ChildHandle<T>
where
    T: DeserializeOwned + Send + 'static,
{
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Non-blocking: check whether the child has exited and, if so, parse
    /// its outcome from the captured pipes.
    pub async fn poll(&self) -> ChildExit<T> {
        let status = match self.child.lock().await.try_wait() {
            Ok(Some(status)) => status,
            Ok(None) => return ChildExit::Running,
            Err(e) => return ChildExit::Failed(ChildError::Io(e)),
        };

        let code = status.code().unwrap_or(-1);
        if code != 0 {
            return ChildExit::Exited(code);
        }

        let stdout = self.drain_stdout().await;
        match serde_json::from_slice::<WireOutcome<T>>(&stdout) {
            Ok(WireOutcome::Ok { value }) => ChildExit::Done(ChildOutcome::Success(value)),
            Ok(WireOutcome::Cancelled) => ChildExit::Done(ChildOutcome::Cancelled),
            Err(_) => {
                let stderr = self.drain_stderr().await;
                if !stderr.is_empty() {
                    ChildExit::Failed(ChildError::Reported(
                        String::from_utf8_lossy(&stderr).into_owned(),
                    ))
                } else {
                    ChildExit::Failed(ChildError::Protocol(
                        String::from_utf8_lossy(&stdout).into_owned(),
                    ))
                }
            }
        }
    }

    async fn drain_stdout(&self) -> Vec<u8> {
        match self.streams.stdout.lock().await.take() {
            Some(rx) => rx.await.unwrap_or_default(),
            None => Vec::new(),
        }
    }

    async fn drain_stderr(&self) -> Vec<u8> {
        match self.streams.stderr.lock().await.take() {
            Some(rx) => rx.await.unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// Cooperative: poll until the child reaches a terminal state.
    pub async fn await_result(&self) -> ChildExit<T> {
        loop {
            match self.poll().await {
                ChildExit::Running => sleep(POLL_INTERVAL).await,
                terminal => return terminal,
            }
        }
    }

    /// Graceful-then-forceful termination: SIGTERM, wait up to 5s, then
    /// SIGKILL and wait up to 2s more. Idempotent and safe to call after
    /// the child has already exited naturally.
    pub async fn kill(&self) {
        if matches!(self.try_status().await, Some(_)) {
            return;
        }

        let pid = Pid::from_raw(self.pid as i32);
        let _ = signal::kill(pid, Signal::SIGTERM);

        if self.wait_until_exited(GRACEFUL_TIMEOUT).await {
            return;
        }

        let _ = signal::kill(pid, Signal::SIGKILL);
        let _ = self.wait_until_exited(FORCEFUL_TIMEOUT).await;
    }

    async fn try_status(&self) -> Option<std::process::ExitStatus> {
        self.child.lock().await.try_wait().ok().flatten()
    }

    async fn wait_until_exited(&self, budget: Duration) -> bool {
        let deadline = Instant::now() + budget;
        loop {
            if self.try_status().await.is_some() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
#[path = "transcribe_child_tests.rs"]
mod tests;
