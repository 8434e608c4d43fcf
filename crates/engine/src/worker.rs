// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker process entry point: what actually runs inside the child
//! spawned by [`scribe_adapters::transcribe_child`]. Wraps
//! [`crate::runner::transcribe`] with a concrete
//! [`crate::whisper_cli::WhisperCliEngine`] and writes the one-line wire
//! protocol `transcribe_child` expects back out on stdout.
//!
//! `scribe-daemon` re-execs its own binary with a hidden subcommand that
//! calls [`run_worker`] and exits with the code it returns; everything
//! above this module is agnostic to how that re-exec is wired up.

use crate::cancel_flag;
use crate::runner::{self, Transcribed};
use crate::whisper_cli::WhisperCliEngine;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything the worker needs, handed down by the dispatcher via the
/// re-exec'd command's argv (as one JSON blob, to dodge shell-quoting
/// issues with file paths).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerArgs {
    pub job_id: String,
    pub file_path: PathBuf,
    pub model_name: String,
    pub condition_on_previous_text: bool,
    pub state_dir: PathBuf,
    pub scratch_dir: PathBuf,
}

#[derive(Serialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
enum WireOutcome {
    Ok { value: runner::TranscriptionResult },
    Cancelled,
}

/// Run one transcription to completion and serialize the single wire-
/// protocol line `transcribe_child` expects on stdout. Returns the line
/// on success or cancellation; an engine failure is returned as `Err`
/// for the caller to print to stderr instead.
async fn determine_outcome(args: &WorkerArgs) -> Result<String, String> {
    let engine = WhisperCliEngine::new(args.scratch_dir.clone());
    let state_dir = args.state_dir.clone();
    let job_id = args.job_id.clone();
    let probe = move || cancel_flag::is_raised(&state_dir, &job_id);

    let transcribed = runner::transcribe(
        &engine,
        &args.file_path,
        args.condition_on_previous_text,
        &args.model_name,
        probe,
    )
    .await
    .map_err(|e| e.to_string())?;

    let outcome = match transcribed {
        Transcribed::Success(result) => WireOutcome::Ok { value: result },
        Transcribed::Cancelled => WireOutcome::Cancelled,
    };
    serde_json::to_string(&outcome).map_err(|e| e.to_string())
}

/// Run one transcription to completion and print the wire-protocol line.
/// Returns the process exit code: `0` on success or cancellation (both
/// are reported via stdout, per `transcribe_child`'s protocol), nonzero
/// if the engine itself failed (reported via stderr).
pub async fn run_worker(args: WorkerArgs) -> i32 {
    match determine_outcome(&args).await {
        Ok(line) => {
            println!("{line}");
            0
        }
        Err(message) => {
            eprintln!("{message}");
            1
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
