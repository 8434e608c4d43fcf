// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-extension classification shared by the ETA predictor (duration
//! heuristic differs for audio vs. video sources) and the downloads
//! watcher (ingest filter).

/// Coarse media type inferred from a file name's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "ogg", "flac", "m4a", "aac", "wma", "opus", "amr",
];

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "mkv", "avi", "webm", "m4v", "3gp", "flv", "wmv", "ogv",
];

/// Classify a file name by its extension. Returns `None` for unrecognized
/// extensions (such a file should not be enrolled by the downloads watcher).
pub fn classify(file_name: &str) -> Option<MediaKind> {
    let ext = file_name.rsplit('.').next()?.to_ascii_lowercase();
    if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Audio)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// True if the extension is one the downloads watcher should consider at all.
pub fn is_recognized_media(file_name: &str) -> bool {
    classify(file_name).is_some()
}

#[cfg(test)]
#[path = "media_kind_tests.rs"]
mod tests;
