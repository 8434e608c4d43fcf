use crate::prelude::*;

#[test]
fn cancel_removes_a_ready_job_from_the_listing() {
    let daemon = Daemon::spawn();
    let media_dir = tempfile::tempdir().unwrap();
    let file = dummy_media_file(media_dir.path(), "note.wav", 1);

    let submitted = daemon
        .cli()
        .args(&["submit", file.to_str().unwrap(), "--user-id", "5"])
        .passes()
        .stdout();
    let id = submitted
        .trim()
        .rsplit(' ')
        .next()
        .expect("submitted output should end with the job id")
        .to_string();

    daemon
        .cli()
        .args(&["cancel", &id])
        .passes()
        .stdout_has("cancelled job");

    daemon
        .cli()
        .args(&["list", "--user-id", "5"])
        .passes()
        .stdout_has("no ready or active jobs");
}

#[test]
fn cancelling_an_unknown_job_is_reported_but_does_not_fail() {
    let daemon = Daemon::spawn();
    daemon
        .cli()
        .args(&["cancel", "999999"])
        .passes()
        .stdout_has("already finished or cancelled");
}
