// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Locating and foreground-launching `scribed` for `scribe serve`.
//! Grounded on `oj`'s `daemon_process::find_ojd_binary`, narrowed to the
//! sibling-binary lookup (this system has no background-respawn or
//! version-mismatch handling to do — `serve` just execs the daemon and
//! waits for it).

use std::path::PathBuf;
use std::process::Command;

/// Locate the `scribed` binary: first next to the running `scribe`
/// binary (the common case for an installed or `cargo build` tree),
/// falling back to `$PATH`.
pub fn find_scribed_binary() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("scribed");
            if sibling.exists() {
                return sibling;
            }
        }
    }
    PathBuf::from("scribed")
}

/// Run `scribed` in the foreground, inheriting stdio, and block until it
/// exits. Used by `scribe serve` for local development; production
/// deployments run `scribed` directly under their own supervisor.
pub fn run_foreground() -> std::io::Result<std::process::ExitStatus> {
    Command::new(find_scribed_binary()).status()
}

#[cfg(test)]
#[path = "daemon_process_tests.rs"]
mod tests;
