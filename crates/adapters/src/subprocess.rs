// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers, including `ffprobe`-based media duration
//! probing used by the ETA predictor (spec section 4.4.1).

use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Default timeout for `ffprobe` duration probes.
pub const FFPROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`, converting
/// timeout expiration into a descriptive error message. The child process
/// is killed automatically if the timeout elapses (via the tokio `Child`
/// drop implementation).
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{} failed: {}", description, io_err)),
        Err(_elapsed) => Err(format!(
            "{} timed out after {}s",
            description,
            timeout.as_secs()
        )),
    }
}

/// Outcome of an `ffprobe` duration probe. The ETA predictor (spec.md
/// section 4.4.1) applies a different size-based fallback depending on
/// which of the two failure shapes it sees, mirroring `examples/
/// original_source/audio_utils.py::predict_processing_time`'s own
/// distinction between "ffprobe ran but returned nothing usable" and
/// "ffprobe could not be run at all".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationProbe {
    /// `format.duration` was read successfully, in seconds.
    Probed(f64),
    /// `ffprobe` ran and exited, but the output had no usable duration.
    RanWithoutDuration,
    /// `ffprobe` could not be launched, or timed out.
    Unavailable,
}

/// Probe a media file's duration via `ffprobe`.
pub async fn probe_duration(file_path: &Path) -> DurationProbe {
    let mut cmd = Command::new("ffprobe");
    cmd.args([
        "-v",
        "error",
        "-show_entries",
        "format=duration",
        "-of",
        "json",
    ])
    .arg(file_path);

    let output = match run_with_timeout(cmd, FFPROBE_TIMEOUT, "ffprobe").await {
        Ok(output) => output,
        Err(_) => return DurationProbe::Unavailable,
    };
    if !output.status.success() {
        return DurationProbe::RanWithoutDuration;
    }

    let duration = serde_json::from_slice::<serde_json::Value>(&output.stdout)
        .ok()
        .and_then(|v| v.get("format")?.get("duration")?.as_str()?.parse::<f64>().ok());

    match duration {
        Some(d) => DurationProbe::Probed(d),
        None => DurationProbe::RanWithoutDuration,
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
