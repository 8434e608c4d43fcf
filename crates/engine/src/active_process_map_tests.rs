// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use scribe_adapters::transcribe_child;
use tokio::process::Command;

fn shell(script: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(script);
    cmd
}

#[tokio::test]
async fn starts_empty() {
    let map = ActiveProcessMap::new();
    assert!(map.is_empty());
    assert!(map.get(JobId::new(1)).is_none());
}

#[tokio::test]
async fn insert_and_remove_round_trip() {
    let map = ActiveProcessMap::new();
    let handle: ChildHandle<TranscriptionResult> =
        transcribe_child::start(shell("sleep 5")).unwrap();
    let id = JobId::new(1);

    map.insert(id, Arc::new(handle));
    assert_eq!(map.len(), 1);
    assert!(map.get(id).is_some());

    if let Some(h) = map.get(id) {
        h.kill().await;
    }
    map.remove(id);
    assert!(map.is_empty());
}

#[tokio::test]
async fn at_most_one_entry_at_a_time_per_job_id() {
    let map = ActiveProcessMap::new();
    let id = JobId::new(7);
    let first: ChildHandle<TranscriptionResult> = transcribe_child::start(shell("sleep 5")).unwrap();
    map.insert(id, Arc::new(first));
    let second: ChildHandle<TranscriptionResult> = transcribe_child::start(shell("sleep 5")).unwrap();
    map.insert(id, Arc::new(second));

    assert_eq!(map.len(), 1);
    if let Some(h) = map.get(id) {
        h.kill().await;
    }
}
