// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Transcription Runner (C2): a pure wrapper around the recognition
//! engine, which spec.md section 1 treats as an out-of-scope black box.
//! [`RecognitionEngine`] is the seam that boundary sits at; `transcribe`
//! itself is plain Rust with no engine-specific knowledge beyond the
//! three cancellation checkpoints spec.md section 4.2 names.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use thiserror::Error;

/// One segment of recognized speech.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// What `RecognitionEngine::recognize` returns on success, before the
/// runner stamps it with model/timing/size metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRecognition {
    pub text: String,
    pub segments: Vec<Segment>,
    pub detected_language: String,
}

/// The structured result spec.md section 4.2 names:
/// `{text, segments[], detected_language, model_used, processing_time_s, file_size_mb}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptionResult {
    pub text: String,
    pub segments: Vec<Segment>,
    pub detected_language: String,
    pub model_used: String,
    pub processing_time_s: f64,
    pub file_size_mb: f64,
}

/// `transcribe`'s return: either a result, or `Cancelled` if
/// `cancelled_probe` fired at one of the three checkpoints.
#[derive(Debug, Clone, PartialEq)]
pub enum Transcribed {
    Success(TranscriptionResult),
    Cancelled,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("file does not exist or is empty: {0}")]
    FileMissing(std::path::PathBuf),
    #[error("engine failure: {0}")]
    Engine(String),
}

/// The out-of-scope recognition engine, as a black-box callable.
/// Engine-specific options (memory optimizations, precision, beam width)
/// are the concrete implementation's concern, selected internally from
/// `model_name` and the file's size.
#[async_trait]
pub trait RecognitionEngine: Send + Sync + 'static {
    async fn recognize(
        &self,
        file_path: &Path,
        model_name: &str,
        condition_on_previous_text: bool,
    ) -> Result<RawRecognition, RunnerError>;
}

/// Transcribe one file. Checks `cancelled_probe()` pre-convert (before any
/// work begins), pre-invoke (immediately before calling the engine), and
/// post-invoke (immediately after it returns) — spec.md section 4.2's
/// three checkpoints.
pub async fn transcribe<E, F>(
    engine: &E,
    file_path: &Path,
    condition_on_previous_text: bool,
    model_name: &str,
    cancelled_probe: F,
) -> Result<Transcribed, RunnerError>
where
    E: RecognitionEngine,
    F: Fn() -> bool,
{
    if cancelled_probe() {
        return Ok(Transcribed::Cancelled);
    }

    let metadata = tokio::fs::metadata(file_path)
        .await
        .map_err(|_| RunnerError::FileMissing(file_path.to_path_buf()))?;
    if metadata.len() == 0 {
        return Err(RunnerError::FileMissing(file_path.to_path_buf()));
    }
    let file_size_mb = metadata.len() as f64 / (1024.0 * 1024.0);

    if cancelled_probe() {
        return Ok(Transcribed::Cancelled);
    }

    let started = Instant::now();
    let raw = engine
        .recognize(file_path, model_name, condition_on_previous_text)
        .await?;
    let processing_time_s = started.elapsed().as_secs_f64();

    if cancelled_probe() {
        return Ok(Transcribed::Cancelled);
    }

    Ok(Transcribed::Success(TranscriptionResult {
        text: raw.text,
        segments: raw.segments,
        detected_language: raw.detected_language,
        model_used: model_name.to_string(),
        processing_time_s,
        file_size_mb,
    }))
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
