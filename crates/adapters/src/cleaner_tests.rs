// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[tokio::test]
async fn removes_stale_files_and_preserves_fresh_ones() {
    let dir = tempfile::tempdir().unwrap();
    let stale = dir.path().join("stale.mp3");
    let fresh = dir.path().join("fresh.mp3");
    tokio::fs::write(&stale, b"x").await.unwrap();
    tokio::fs::write(&fresh, b"x").await.unwrap();

    // Backdate the "stale" file's mtime well past the retention window.
    let old = SystemTime::now() - Duration::from_secs(48 * 60 * 60);
    filetime_set_mtime(&stale, old);

    let cleaner = FsTempCleaner::new(vec![dir.path().to_path_buf()], Duration::from_secs(60 * 60));
    cleaner.cleanup_stale(&HashSet::new()).await;

    assert!(!stale.exists());
    assert!(fresh.exists());
}

#[tokio::test]
async fn preserves_files_in_the_preserve_set() {
    let dir = tempfile::tempdir().unwrap();
    let still_uploading = dir.path().join("uploading.mp4");
    tokio::fs::write(&still_uploading, b"x").await.unwrap();
    let old = SystemTime::now() - Duration::from_secs(48 * 60 * 60);
    filetime_set_mtime(&still_uploading, old);

    let mut preserve = HashSet::new();
    preserve.insert(still_uploading.clone());

    let cleaner = FsTempCleaner::new(vec![dir.path().to_path_buf()], Duration::from_secs(60 * 60));
    cleaner.cleanup_stale(&preserve).await;

    assert!(still_uploading.exists());
}

#[tokio::test]
async fn cleanup_file_ignores_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let cleaner = FsTempCleaner::new(vec![dir.path().to_path_buf()], DEFAULT_MAX_AGE);
    cleaner.cleanup_file(&dir.path().join("missing.mp3")).await;
}

#[tokio::test]
async fn cleanup_file_removes_an_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("done.mp3");
    tokio::fs::write(&file, b"x").await.unwrap();

    let cleaner = FsTempCleaner::new(vec![dir.path().to_path_buf()], DEFAULT_MAX_AGE);
    cleaner.cleanup_file(&file).await;

    assert!(!file.exists());
}

/// Minimal mtime backdating without pulling in the `filetime` crate: sets
/// both atime and mtime via `std::fs::File::set_times` (stable since
/// Rust 1.75).
fn filetime_set_mtime(path: &Path, time: SystemTime) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    let times = std::fs::FileTimes::new().set_modified(time).set_accessed(time);
    file.set_times(times).unwrap();
}
