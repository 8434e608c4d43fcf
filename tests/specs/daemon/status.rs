use crate::prelude::*;

#[test]
fn status_reports_uptime_and_empty_queue_on_a_fresh_daemon() {
    let daemon = Daemon::spawn();
    daemon
        .cli()
        .args(&["status"])
        .passes()
        .stdout_has("uptime:")
        .stdout_has("queue depth: 0")
        .stdout_has("active job: none");
}

#[test]
fn status_reflects_queue_depth_after_a_submission() {
    let daemon = Daemon::spawn();
    let media_dir = tempfile::tempdir().unwrap();
    let file = dummy_media_file(media_dir.path(), "clip.mp3", 2);

    daemon
        .cli()
        .args(&["submit", file.to_str().unwrap(), "--user-id", "1"])
        .passes();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || {
        daemon
            .cli()
            .args(&["status"])
            .passes()
            .stdout()
            .contains("queue depth: 1")
    }));
}
