// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Model-selection policy (spec.md section 4.4 step 6), ported verbatim
//! from `examples/original_source/audio_utils.py`'s
//! `should_use_smaller_model`/`should_condition_on_previous_text`.

/// Models expensive enough to be downgraded under memory pressure.
pub const HEAVY_MODELS: &[&str] = &["medium", "large", "large-v2", "large-v3", "turbo"];

/// File size above which `condition_on_previous_text` is disabled, to
/// bound the context window fed back into the engine on small clips.
pub const CONDITION_ON_PREVIOUS_TEXT_THRESHOLD_MB: f64 = 2.0;

/// The model a job should actually run with, and whether a downgrade
/// notice is owed to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDecision {
    pub effective_model: String,
    pub downgraded: bool,
    pub condition_on_previous_text: bool,
}

/// Apply spec.md section 4.4 step 6: downgrade a heavy default model to
/// `"small"` once the file exceeds `small_model_threshold_mb` (strict
/// `>`, per P8 — a file exactly at the threshold keeps the default).
pub fn decide(default_model: &str, file_size_mb: f64, small_model_threshold_mb: f64) -> ModelDecision {
    let downgraded =
        file_size_mb > small_model_threshold_mb && HEAVY_MODELS.contains(&default_model);
    let effective_model = if downgraded {
        "small".to_string()
    } else {
        default_model.to_string()
    };
    ModelDecision {
        effective_model,
        downgraded,
        condition_on_previous_text: file_size_mb <= CONDITION_ON_PREVIOUS_TEXT_THRESHOLD_MB,
    }
}

#[cfg(test)]
#[path = "model_policy_tests.rs"]
mod tests;
