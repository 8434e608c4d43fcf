// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The transcription job pipeline's execution engine: the model-selection
//! policy and ETA predictor (section 4.4.1), the Transcription Runner
//! (C2) and its concrete `whisper` CLI engine, the cancellation sentinel
//! and worker entry point the Child-Process Supervisor spawns, the
//! Active Process Map, the Job Dispatcher (C4), its Supervisor (C5), and
//! the Downloads Watcher (C6).

pub mod active_process_map;
pub mod cancel_flag;
pub mod dispatcher;
pub mod error;
pub mod eta;
pub mod model_policy;
pub mod runner;
pub mod supervisor;
pub mod watcher;
pub mod whisper_cli;
pub mod worker;

pub use active_process_map::ActiveProcessMap;
pub use dispatcher::{
    ChildCommandBuilder, CurrentExeChildCommandBuilder, DispatcherConfig, DispatcherContext,
    TickOutcome, WORKER_SUBCOMMAND,
};
pub use error::{DispatchError, WatcherError};
pub use eta::{estimate_processing_time, percent_complete, render_progress_bar};
pub use model_policy::{decide, ModelDecision};
pub use runner::{RawRecognition, RecognitionEngine, RunnerError, Segment, Transcribed, TranscriptionResult};
pub use supervisor::DispatcherSupervisor;
pub use watcher::{DownloadsWatcher, WatcherConfig, WatcherState, DOWNLOADS_USER_ID};
pub use whisper_cli::WhisperCliEngine;
pub use worker::{run_worker, WorkerArgs};
