// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Estimated-time predictor (spec.md section 4.4.1), ported from
//! `examples/original_source/audio_utils.py::predict_processing_time`.

use scribe_adapters::subprocess::DurationProbe;
use std::time::Duration;

/// Audio-source fallback: `D = S * 60` seconds when no duration could be
/// probed.
const AUDIO_FALLBACK_SECONDS_PER_MB: f64 = 60.0;
/// Video-source fallback when `ffprobe` ran but returned nothing usable.
const VIDEO_RAN_WITHOUT_DURATION_SECONDS_PER_MB: f64 = 20.0;
/// Video-source fallback when `ffprobe` could not be run at all.
const VIDEO_UNAVAILABLE_SECONDS_PER_MB: f64 = 27.0;

/// Size penalty breakpoint and per-MB rate above it.
const SIZE_PENALTY_BREAKPOINT_MB: f64 = 15.0;
const SIZE_PENALTY_RATE: f64 = 0.015;

/// Slack applied to the final estimate.
const SLACK_MULTIPLIER: f64 = 1.05;

/// `(real_time_speed_factor, fixed_init_cost_seconds)` per model.
fn model_factors(model: &str) -> (f64, f64) {
    match model {
        "tiny" => (10.0, 1.0),
        "base" => (6.0, 2.0),
        "small" => (3.0, 3.0),
        "medium" => (2.0, 5.0),
        "large" => (1.0, 8.0),
        "large-v1" => (1.0, 8.0),
        "large-v2" => (0.8, 10.0),
        "large-v3" => (0.7, 12.0),
        "turbo" => (1.7, 10.0),
        _ => (2.0, 5.0),
    }
}

fn estimate_source_duration_s(file_size_mb: f64, is_video: bool, probe: DurationProbe) -> f64 {
    match probe {
        DurationProbe::Probed(seconds) => seconds,
        DurationProbe::RanWithoutDuration if is_video => {
            file_size_mb * VIDEO_RAN_WITHOUT_DURATION_SECONDS_PER_MB
        }
        DurationProbe::Unavailable if is_video => {
            file_size_mb * VIDEO_UNAVAILABLE_SECONDS_PER_MB
        }
        _ => file_size_mb * AUDIO_FALLBACK_SECONDS_PER_MB,
    }
}

/// Estimate total processing time for a job (spec.md section 4.4.1).
/// `is_video` is determined from the *original* file name's extension,
/// not the on-disk (possibly re-muxed) file.
pub fn estimate_processing_time(
    file_size_mb: f64,
    effective_model: &str,
    is_video: bool,
    probe: DurationProbe,
) -> Duration {
    let duration_s = estimate_source_duration_s(file_size_mb, is_video, probe);
    let (speed_factor, init_cost_s) = model_factors(effective_model);
    let size_penalty = 1.0 + (file_size_mb - SIZE_PENALTY_BREAKPOINT_MB).max(0.0) * SIZE_PENALTY_RATE;

    let seconds = ((duration_s / speed_factor) * size_penalty + init_cost_s) * SLACK_MULTIPLIER;
    Duration::from_secs_f64(seconds.max(0.0))
}

/// Percent complete, capped at 95% (spec.md section 4.4 step 9) — the
/// dispatcher never claims 100% until the job is actually done.
pub fn percent_complete(elapsed: Duration, estimate: Duration) -> u8 {
    if estimate.as_secs_f64() <= 0.0 {
        return 0;
    }
    let pct = (elapsed.as_secs_f64() / estimate.as_secs_f64() * 100.0).clamp(0.0, 95.0);
    pct as u8
}

/// Render a 20-segment progress bar, e.g. `[████████████░░░░░░░░] 62%`.
pub fn render_progress_bar(percent: u8, width: usize) -> String {
    let filled = percent as usize / 5;
    let empty = width.saturating_sub(filled);
    format!("[{}{}] {percent}%", "█".repeat(filled), "░".repeat(empty))
}

#[cfg(test)]
#[path = "eta_tests.rs"]
mod tests;
