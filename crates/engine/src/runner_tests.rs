// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct StubEngine {
    calls: Arc<AtomicUsize>,
    response: RawRecognition,
}

#[async_trait]
impl RecognitionEngine for StubEngine {
    async fn recognize(
        &self,
        _file_path: &Path,
        _model_name: &str,
        _condition_on_previous_text: bool,
    ) -> Result<RawRecognition, RunnerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

fn happy_response() -> RawRecognition {
    RawRecognition {
        text: "hello world".to_string(),
        segments: vec![Segment {
            start: 0.0,
            end: 1.2,
            text: "hello world".to_string(),
        }],
        detected_language: "en".to_string(),
    }
}

#[tokio::test]
async fn successful_transcription_carries_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("clip.mp3");
    tokio::fs::write(&file, vec![0u8; 1024 * 1024]).await.unwrap();

    let engine = StubEngine {
        calls: Arc::new(AtomicUsize::new(0)),
        response: happy_response(),
    };

    let result = transcribe(&engine, &file, true, "small", || false)
        .await
        .unwrap();

    match result {
        Transcribed::Success(r) => {
            assert_eq!(r.text, "hello world");
            assert_eq!(r.model_used, "small");
            assert!((r.file_size_mb - 1.0).abs() < 0.01);
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_file_is_an_error() {
    let engine = StubEngine {
        calls: Arc::new(AtomicUsize::new(0)),
        response: happy_response(),
    };
    let result = transcribe(&engine, Path::new("/nonexistent/clip.mp3"), true, "small", || false).await;
    assert!(matches!(result, Err(RunnerError::FileMissing(_))));
}

#[tokio::test]
async fn empty_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("empty.mp3");
    tokio::fs::write(&file, b"").await.unwrap();

    let engine = StubEngine {
        calls: Arc::new(AtomicUsize::new(0)),
        response: happy_response(),
    };
    let result = transcribe(&engine, &file, true, "small", || false).await;
    assert!(matches!(result, Err(RunnerError::FileMissing(_))));
}

#[tokio::test]
async fn cancellation_pre_invoke_skips_the_engine_call() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("clip.mp3");
    tokio::fs::write(&file, vec![0u8; 1024]).await.unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let engine = StubEngine {
        calls: calls.clone(),
        response: happy_response(),
    };

    // Cancel on the second probe call (pre-invoke), not the first
    // (pre-convert), to prove the checkpoint ordering matters.
    let probe_calls = AtomicUsize::new(0);
    let cancelled_probe = || probe_calls.fetch_add(1, Ordering::SeqCst) >= 1;

    let result = transcribe(&engine, &file, true, "small", cancelled_probe)
        .await
        .unwrap();

    assert_eq!(result, Transcribed::Cancelled);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancellation_post_invoke_still_discards_an_already_fetched_result() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("clip.mp3");
    tokio::fs::write(&file, vec![0u8; 1024]).await.unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let engine = StubEngine {
        calls: calls.clone(),
        response: happy_response(),
    };

    // False on the pre-convert and pre-invoke checkpoints (indices 0, 1),
    // true on the post-invoke checkpoint (index 2) — the engine call must
    // still have happened by then.
    let probe_calls = AtomicUsize::new(0);
    let cancelled_probe = || probe_calls.fetch_add(1, Ordering::SeqCst) >= 2;

    let result = transcribe(&engine, &file, true, "small", cancelled_probe)
        .await
        .unwrap();
    assert_eq!(result, Transcribed::Cancelled);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
