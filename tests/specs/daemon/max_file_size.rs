use crate::prelude::*;

#[test]
fn submit_is_rejected_once_it_exceeds_the_configured_max_file_size() {
    let daemon = Daemon::spawn_with_env(&[("SCRIBE_MAX_FILE_SIZE_MB", "1")]);
    let media_dir = tempfile::tempdir().unwrap();
    let file = dummy_media_file(media_dir.path(), "big.mp3", 5);

    daemon
        .cli()
        .args(&["submit", file.to_str().unwrap()])
        .fails()
        .stderr_has("exceeds max_file_size");
}
