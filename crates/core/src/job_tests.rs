// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Utc;

fn submission() -> JobSubmission {
    JobSubmission {
        user_id: 42,
        chat_id: 100,
        message_id: 1,
        file_path: PathBuf::from("/tmp/downloads/clip.mp3"),
        file_name: "clip.mp3".into(),
        file_size_mb: 3.0,
    }
}

#[test]
fn new_ready_job_is_ready() {
    let job = Job::new_ready(JobId::new(1), submission(), Utc::now());
    assert_eq!(job.status(), JobStatus::Ready);
    assert!(job.is_ready());
    assert!(!job.is_terminal());
}

#[test]
fn active_job_is_not_ready() {
    let mut job = Job::new_ready(JobId::new(1), submission(), Utc::now());
    job.is_active = true;
    assert_eq!(job.status(), JobStatus::Active);
    assert!(!job.is_ready());
}

#[test]
fn finished_takes_precedence_in_status() {
    let mut job = Job::new_ready(JobId::new(1), submission(), Utc::now());
    job.is_active = true;
    job.finished = true;
    assert_eq!(job.status(), JobStatus::Finished);
}

#[test]
fn cancelled_job_is_terminal() {
    let mut job = Job::new_ready(JobId::new(1), submission(), Utc::now());
    job.cancelled = true;
    assert_eq!(job.status(), JobStatus::Cancelled);
    assert!(job.is_terminal());
}

#[test]
fn job_id_display_and_ordering() {
    assert_eq!(JobId::new(7).to_string(), "7");
    assert!(JobId::new(1) < JobId::new(2));
}
