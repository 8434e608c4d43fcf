// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The artifact-writer collaborator the dispatcher hands a transcription
//! result to (spec.md section 4.4 step 12). Transcript-to-file formatting
//! itself is an out-of-scope external collaborator (spec.md section 1);
//! this is a thin port plus one plain-text default, not the full
//! subtitle-aware writer the original system has.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("io error writing artifact: {0}")]
    Io(#[from] std::io::Error),
}

/// Paths to the artifacts produced for one finished job.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub transcript_path: PathBuf,
    pub subtitle_path: Option<PathBuf>,
}

/// Everything the writer needs besides the transcription text itself.
pub struct ArtifactRequest<'a> {
    pub text: &'a str,
    pub user_id: i64,
    pub original_file_name: &'a str,
    pub is_voice_message: bool,
}

#[async_trait]
pub trait ArtifactWriter: Send + Sync + 'static {
    async fn write(&self, req: &ArtifactRequest<'_>, now: DateTime<Utc>)
        -> Result<ArtifactPaths, ArtifactError>;
}

/// Filename sanitization per spec.md section 6: strip the extension,
/// replace `<>:"/\|?*` with `_`, truncate to <= 200 chars, then append
/// `_{user_id}_{yyyymmdd_hhmmss}`. Voice messages use the literal base
/// `transcription`.
pub fn sanitize_artifact_stem(original_file_name: &str, user_id: i64, is_voice_message: bool, now: DateTime<Utc>) -> String {
    let base = if is_voice_message {
        "transcription".to_string()
    } else {
        // Strip the extension by hand rather than via `Path::file_stem`:
        // the original name may itself contain `/`, which Path would
        // otherwise treat as a directory separator instead of a
        // character to sanitize.
        let stem = match original_file_name.rfind('.') {
            Some(idx) if idx > 0 => &original_file_name[..idx],
            _ => original_file_name,
        };
        let cleaned: String = stem
            .chars()
            .map(|c| if "<>:\"/\\|?*".contains(c) { '_' } else { c })
            .take(200)
            .collect();
        cleaned
    };
    format!("{base}_{user_id}_{}", now.format("%Y%m%d_%H%M%S"))
}

/// Writes the transcript as a plain `.txt` file under `output_dir`. No
/// subtitle file is produced (subtitle formatting is out of scope, per
/// spec.md section 1).
pub struct PlainTextArtifactWriter {
    output_dir: PathBuf,
}

impl PlainTextArtifactWriter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }
}

#[async_trait]
impl ArtifactWriter for PlainTextArtifactWriter {
    async fn write(
        &self,
        req: &ArtifactRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<ArtifactPaths, ArtifactError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let stem = sanitize_artifact_stem(req.original_file_name, req.user_id, req.is_voice_message, now);
        let transcript_path = self.output_dir.join(format!("{stem}.txt"));

        let mut file = tokio::fs::File::create(&transcript_path).await?;
        file.write_all(req.text.as_bytes()).await?;
        file.sync_all().await?;

        Ok(ArtifactPaths {
            transcript_path,
            subtitle_path: None,
        })
    }
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
