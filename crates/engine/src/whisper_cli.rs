// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One concrete [`RecognitionEngine`]: shells out to an external `whisper`
//! CLI. Keeps the actual speech-recognition model out of process (spec.md
//! section 1 treats it as a black box) the same way
//! `scribe_adapters::subprocess` shells out to `ffprobe` rather than
//! linking a media-probing library.

use crate::runner::{RawRecognition, RecognitionEngine, RunnerError, Segment};
use async_trait::async_trait;
use scribe_adapters::subprocess::run_with_timeout;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

/// Soft timeout on the external engine call itself; the child is killed
/// well before this via C3's own 5s+2s kill budget in practice, but this
/// bounds a `whisper` invocation run outside that supervision (e.g. in
/// tests).
const ENGINE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

#[derive(serde::Deserialize)]
struct WhisperJson {
    text: String,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
    #[serde(default)]
    language: String,
}

#[derive(serde::Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

/// Invokes `whisper <file> --model <model> --output_format json
/// --output_dir <dir>` and reads back the JSON transcript it writes.
pub struct WhisperCliEngine {
    output_dir: std::path::PathBuf,
}

impl WhisperCliEngine {
    pub fn new(output_dir: std::path::PathBuf) -> Self {
        Self { output_dir }
    }
}

#[async_trait]
impl RecognitionEngine for WhisperCliEngine {
    async fn recognize(
        &self,
        file_path: &Path,
        model_name: &str,
        condition_on_previous_text: bool,
    ) -> Result<RawRecognition, RunnerError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| RunnerError::Engine(e.to_string()))?;

        let mut cmd = Command::new("whisper");
        cmd.arg(file_path)
            .args(["--model", model_name])
            .args(["--output_format", "json"])
            .args(["--output_dir", &self.output_dir.to_string_lossy()])
            .args([
                "--condition_on_previous_text",
                if condition_on_previous_text { "True" } else { "False" },
            ]);

        let output = run_with_timeout(cmd, ENGINE_TIMEOUT, "whisper")
            .await
            .map_err(RunnerError::Engine)?;
        if !output.status.success() {
            return Err(RunnerError::Engine(format!(
                "whisper exited with {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let stem = file_path
            .file_stem()
            .ok_or_else(|| RunnerError::Engine("file has no stem".to_string()))?;
        let json_path = self.output_dir.join(stem).with_extension("json");
        let raw = tokio::fs::read(&json_path)
            .await
            .map_err(|e| RunnerError::Engine(format!("reading {}: {e}", json_path.display())))?;
        let parsed: WhisperJson =
            serde_json::from_slice(&raw).map_err(|e| RunnerError::Engine(e.to_string()))?;

        Ok(RawRecognition {
            text: parsed.text,
            segments: parsed
                .segments
                .into_iter()
                .map(|s| Segment {
                    start: s.start,
                    end: s.end,
                    text: s.text,
                })
                .collect(),
            detected_language: parsed.language,
        })
    }
}

#[cfg(test)]
#[path = "whisper_cli_tests.rs"]
mod tests;
