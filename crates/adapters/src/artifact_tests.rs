// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 7, 29, 12, 30, 0).unwrap()
}

#[test]
fn sanitizes_unsafe_characters_and_strips_extension() {
    let stem = sanitize_artifact_stem("weird<name>:/file.mp3", 42, false, fixed_now());
    assert_eq!(stem, "weird_name___file_42_20260729_123000");
}

#[test]
fn voice_messages_use_literal_base() {
    let stem = sanitize_artifact_stem("ignored.ogg", 7, true, fixed_now());
    assert_eq!(stem, "transcription_7_20260729_123000");
}

#[test]
fn truncates_long_names_to_200_chars() {
    let long_name = format!("{}.mp3", "a".repeat(500));
    let stem = sanitize_artifact_stem(&long_name, 1, false, fixed_now());
    let prefix_len = stem.len() - "_1_20260729_123000".len();
    assert_eq!(prefix_len, 200);
}

#[test]
fn truncates_multibyte_names_without_panicking() {
    let long_name = format!("{}.mp3", "привет_мир_".repeat(50));
    let stem = sanitize_artifact_stem(&long_name, 1, false, fixed_now());
    let suffix = "_1_20260729_123000";
    assert!(stem.ends_with(suffix));
    let prefix = &stem[..stem.len() - suffix.len()];
    assert_eq!(prefix.chars().count(), 200);
}

#[tokio::test]
async fn writes_transcript_file_and_no_subtitle() {
    let dir = tempfile::tempdir().unwrap();
    let writer = PlainTextArtifactWriter::new(dir.path().to_path_buf());

    let req = ArtifactRequest {
        text: "hello world",
        user_id: 1,
        original_file_name: "clip.mp3",
        is_voice_message: false,
    };
    let paths = writer.write(&req, fixed_now()).await.unwrap();

    assert!(paths.transcript_path.exists());
    assert!(paths.subtitle_path.is_none());
    let contents = tokio::fs::read_to_string(&paths.transcript_path).await.unwrap();
    assert_eq!(contents, "hello world");
}
