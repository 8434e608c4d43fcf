//! Test helpers for behavioral specifications.
//!
//! Provides a high-level DSL for driving `scribe`/`scribed` as black
//! boxes: spawn the daemon against an isolated state directory, run the
//! CLI against it, assert on stdout/exit code.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 2000;

/// Resolve a workspace binary, falling back to the test binary's own
/// directory when `CARGO_MANIFEST_DIR` points at a stale checkout.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }
    standard
}

pub fn scribe_binary() -> PathBuf {
    binary_path("scribe")
}

pub fn scribed_binary() -> PathBuf {
    binary_path("scribed")
}

pub fn wait_for<F: FnMut() -> bool>(timeout_ms: u64, mut condition: F) -> bool {
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    let poll = std::time::Duration::from_millis(SPEC_POLL_INTERVAL_MS);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll);
    }
    false
}

/// An isolated daemon instance for one test, backed by a fresh state
/// directory. The daemon process is killed on drop.
pub struct Daemon {
    state_dir: tempfile::TempDir,
    child: std::process::Child,
}

impl Daemon {
    /// Spawn `scribed` against a fresh state directory and wait for its
    /// socket to come up.
    pub fn spawn() -> Self {
        Self::spawn_with_env(&[])
    }

    /// Spawn `scribed` with extra environment overrides (e.g.
    /// `SCRIBE_MAX_FILE_SIZE_MB`) layered on top of the isolated state dir.
    pub fn spawn_with_env(extra_env: &[(&str, &str)]) -> Self {
        let state_dir = tempfile::tempdir().unwrap();
        let mut command = Command::new(scribed_binary());
        command
            .env("SCRIBE_STATE_DIR", state_dir.path())
            .env("SCRIBE_DOWNLOADS_POLL_INTERVAL_S", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        for (key, value) in extra_env {
            command.env(key, value);
        }
        let child = command.spawn().expect("scribed should spawn");

        let daemon = Self { state_dir, child };
        let socket = daemon.state_dir.path().join("daemon.sock");
        assert!(
            wait_for(SPEC_WAIT_MAX_MS, || socket.exists()),
            "scribed did not create its socket in time"
        );
        daemon
    }

    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    /// Build a `scribe` invocation wired to this daemon's state directory.
    pub fn cli(&self) -> CliBuilder {
        CliBuilder::new().env("SCRIBE_STATE_DIR", self.state_path())
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub struct CliBuilder {
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((
            key.to_string(),
            value.as_ref().to_string_lossy().to_string(),
        ));
        self
    }

    fn command(self) -> Command {
        let mut cmd = Command::new(scribe_binary());
        cmd.args(&self.args);
        for (key, value) in self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    pub fn passes(self) -> RunAssert {
        let output = self.command().output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    pub fn fails(self) -> RunAssert {
        let output = self.command().output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}",
            String::from_utf8_lossy(&output.stdout)
        );
        RunAssert { output }
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain '{}'\nstdout: {}",
            expected,
            stdout
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain '{}'\nstderr: {}",
            expected,
            stderr
        );
        self
    }
}

/// Write an n-megabyte dummy file under `dir` and return its path.
pub fn dummy_media_file(dir: &Path, name: &str, size_mb: usize) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, vec![0u8; size_mb * 1024 * 1024]).unwrap();
    path
}
