use crate::prelude::*;

#[test]
fn submit_enqueues_and_list_reports_it_ready() {
    let daemon = Daemon::spawn();
    let media_dir = tempfile::tempdir().unwrap();
    let file = dummy_media_file(media_dir.path(), "memo.mp3", 3);

    daemon
        .cli()
        .args(&[
            "submit",
            file.to_str().unwrap(),
            "--user-id",
            "42",
            "--chat-id",
            "7",
        ])
        .passes()
        .stdout_has("submitted job");

    daemon
        .cli()
        .args(&["list", "--user-id", "42"])
        .passes()
        .stdout_has("ready")
        .stdout_has("memo.mp3");
}

#[test]
fn list_is_empty_for_a_user_with_no_jobs() {
    let daemon = Daemon::spawn();
    daemon
        .cli()
        .args(&["list", "--user-id", "99"])
        .passes()
        .stdout_has("no ready or active jobs");
}

#[test]
fn submit_rejects_a_nonexistent_file() {
    let daemon = Daemon::spawn();
    daemon
        .cli()
        .args(&["submit", "/no/such/file.mp3"])
        .fails()
        .stderr_has("error:");
}
