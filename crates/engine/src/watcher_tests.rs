// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use scribe_core::FakeClock;
use std::time::Duration;

fn fast_config(ingest_dir: PathBuf) -> WatcherConfig {
    WatcherConfig {
        ingest_dir,
        poll_interval: Duration::from_millis(50),
        stability_interval: Duration::from_millis(20),
        stability_checks: 3,
        max_file_size_bytes: 0,
    }
}

fn open_store(dir: &Path) -> Arc<parking_lot::Mutex<QueueStore>> {
    Arc::new(parking_lot::Mutex::new(QueueStore::open(dir).unwrap()))
}

#[tokio::test]
async fn a_stable_audio_file_is_enrolled_as_a_downloads_job() {
    let store_dir = tempfile::tempdir().unwrap();
    let ingest_dir = tempfile::tempdir().unwrap();
    let clip = ingest_dir.path().join("clip.mp3");
    tokio::fs::write(&clip, vec![0u8; 1024]).await.unwrap();

    let store = open_store(store_dir.path());
    let watcher = DownloadsWatcher::new(
        store.clone(),
        Arc::new(FakeClock::new()),
        fast_config(ingest_dir.path().to_path_buf()),
    );
    let mut state = WatcherState::new();
    watcher.tick(&mut state).await.unwrap();

    let jobs = store.lock().list_active();
    assert_eq!(jobs.len(), 0); // not active until claimed

    let ready_found = {
        let locked = store.lock();
        locked.file_in_queue(&clip)
    };
    assert!(ready_found);
}

#[tokio::test]
async fn an_empty_file_is_never_enrolled() {
    let store_dir = tempfile::tempdir().unwrap();
    let ingest_dir = tempfile::tempdir().unwrap();
    let clip = ingest_dir.path().join("empty.wav");
    tokio::fs::write(&clip, b"").await.unwrap();

    let store = open_store(store_dir.path());
    let watcher = DownloadsWatcher::new(
        store.clone(),
        Arc::new(FakeClock::new()),
        fast_config(ingest_dir.path().to_path_buf()),
    );
    let mut state = WatcherState::new();
    watcher.tick(&mut state).await.unwrap();

    assert!(!store.lock().file_in_queue(&clip));
}

#[tokio::test]
async fn a_file_that_grows_mid_probe_is_not_enrolled_on_that_cycle() {
    let store_dir = tempfile::tempdir().unwrap();
    let ingest_dir = tempfile::tempdir().unwrap();
    let clip = ingest_dir.path().join("growing.mp3");
    tokio::fs::write(&clip, vec![0u8; 512]).await.unwrap();

    let store = open_store(store_dir.path());
    let config = fast_config(ingest_dir.path().to_path_buf());
    let watcher = DownloadsWatcher::new(store.clone(), Arc::new(FakeClock::new()), config.clone());
    let mut state = WatcherState::new();

    let clip_clone = clip.clone();
    let grower = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        tokio::fs::write(&clip_clone, vec![0u8; 4096]).await.unwrap();
    });

    watcher.tick(&mut state).await.unwrap();
    grower.await.unwrap();

    assert!(!store.lock().file_in_queue(&clip));
    assert!(state.tracked_paths().contains(&clip));
}

#[tokio::test]
async fn an_oversize_file_is_marked_processed_without_enrollment() {
    let store_dir = tempfile::tempdir().unwrap();
    let ingest_dir = tempfile::tempdir().unwrap();
    let clip = ingest_dir.path().join("huge.mp3");
    tokio::fs::write(&clip, vec![0u8; 4096]).await.unwrap();

    let store = open_store(store_dir.path());
    let mut config = fast_config(ingest_dir.path().to_path_buf());
    config.max_file_size_bytes = 1024;
    let watcher = DownloadsWatcher::new(store.clone(), Arc::new(FakeClock::new()), config);
    let mut state = WatcherState::new();
    watcher.tick(&mut state).await.unwrap();

    assert!(!store.lock().file_in_queue(&clip));

    // a second tick must not re-enroll it either, since it's in `processed`.
    watcher.tick(&mut state).await.unwrap();
    assert!(!store.lock().file_in_queue(&clip));
}

#[tokio::test]
async fn non_media_extensions_are_ignored() {
    let store_dir = tempfile::tempdir().unwrap();
    let ingest_dir = tempfile::tempdir().unwrap();
    let doc = ingest_dir.path().join("readme.txt");
    tokio::fs::write(&doc, b"hello").await.unwrap();

    let store = open_store(store_dir.path());
    let watcher = DownloadsWatcher::new(
        store.clone(),
        Arc::new(FakeClock::new()),
        fast_config(ingest_dir.path().to_path_buf()),
    );
    let mut state = WatcherState::new();
    watcher.tick(&mut state).await.unwrap();

    assert!(!store.lock().file_in_queue(&doc));
}

#[tokio::test]
async fn a_file_already_in_the_queue_is_marked_processed_and_not_re_enqueued() {
    let store_dir = tempfile::tempdir().unwrap();
    let ingest_dir = tempfile::tempdir().unwrap();
    let clip = ingest_dir.path().join("clip.mp3");
    tokio::fs::write(&clip, vec![0u8; 256]).await.unwrap();

    let store = open_store(store_dir.path());
    {
        let mut locked = store.lock();
        locked
            .enqueue(
                JobSubmission {
                    user_id: DOWNLOADS_USER_ID,
                    chat_id: 0,
                    message_id: 0,
                    file_path: clip.clone(),
                    file_name: "clip.mp3".to_string(),
                    file_size_mb: 0.001,
                },
                chrono::Utc::now(),
            )
            .unwrap();
    }

    let watcher = DownloadsWatcher::new(
        store.clone(),
        Arc::new(FakeClock::new()),
        fast_config(ingest_dir.path().to_path_buf()),
    );
    let mut state = WatcherState::new();
    watcher.tick(&mut state).await.unwrap();

    // still exactly one job for that user, not two.
    let jobs = store.lock().list_user_ready_or_active(DOWNLOADS_USER_ID);
    assert_eq!(jobs.len(), 1);
}
