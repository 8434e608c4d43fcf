// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Job Dispatcher (C4): the single cooperative worker loop that never
//! processes two jobs in parallel. Follows the 15-step per-tick recipe of
//! spec.md section 4.4, grounded in control-flow shape on
//! `oj-adapters/src/agent/watcher.rs`'s `tokio::select!`-over-timer loop
//! and in step-by-step semantics on
//! `examples/original_source/audio_service.py`'s dispatcher.

use crate::active_process_map::ActiveProcessMap;
use crate::cancel_flag;
use crate::eta::{estimate_processing_time, percent_complete, render_progress_bar};
use crate::error::DispatchError;
use crate::model_policy;
use crate::runner::TranscriptionResult;
use crate::worker::WorkerArgs;
use scribe_adapters::subprocess::{probe_duration, DurationProbe};
use scribe_adapters::transcribe_child::{self, ChildExit, ChildHandle};
use scribe_adapters::{ArtifactRequest, ArtifactWriter, NotifyAdapter, TempCleaner};
use scribe_core::{Clock, Job, JobId};
use scribe_storage::QueueStore;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::process::Command;

/// Builds the `Command` used to spawn one transcription child. Kept as a
/// seam so the dispatcher never hardcodes how the worker binary is found
/// or invoked (spec.md section 9: ports, not concrete back-references).
pub trait ChildCommandBuilder: Send + Sync + 'static {
    fn build(&self, args: &WorkerArgs) -> Command;
}

/// The subcommand name `scribe-daemon` dispatches to
/// `crate::worker::run_worker`.
pub const WORKER_SUBCOMMAND: &str = "__transcribe-worker";

/// Re-execs the currently running binary with [`WORKER_SUBCOMMAND`] and
/// the worker args serialized as one JSON argument.
pub struct CurrentExeChildCommandBuilder;

impl ChildCommandBuilder for CurrentExeChildCommandBuilder {
    fn build(&self, args: &WorkerArgs) -> Command {
        let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("scribed"));
        let mut cmd = Command::new(exe);
        cmd.arg(WORKER_SUBCOMMAND)
            .arg(serde_json::to_string(args).unwrap_or_default());
        cmd
    }
}

/// Tunables spec.md section 6 and section 4.4 name explicitly.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub default_model: String,
    pub small_model_threshold_mb: f64,
    /// Wait-loop poll period (spec.md section 4.4 step 9): 1s.
    pub wait_tick: StdDuration,
    /// Progress-notification cadence (spec.md section 4.4 step 9): 30s.
    pub progress_interval: StdDuration,
    /// No-job-ready sleep (spec.md section 4.4 step 2): 1s.
    pub idle_sleep: StdDuration,
    pub cleanup_every_n_ticks: u64,
    pub heartbeat_every_n_iterations: u64,
    pub max_consecutive_errors: u32,
    pub backoff: StdDuration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            default_model: "small".to_string(),
            small_model_threshold_mb: 20.0,
            wait_tick: StdDuration::from_secs(1),
            progress_interval: StdDuration::from_secs(30),
            idle_sleep: StdDuration::from_secs(1),
            cleanup_every_n_ticks: 10,
            heartbeat_every_n_iterations: 50,
            max_consecutive_errors: 5,
            backoff: StdDuration::from_secs(30),
        }
    }
}

/// Everything one dispatcher iteration needs. Shared, `Arc`-wrapped
/// fields mirror spec.md section 9's "global mutable state becomes an
/// injected context object" redesign note.
pub struct DispatcherContext {
    pub store: Arc<parking_lot::Mutex<QueueStore>>,
    pub notify: Arc<dyn NotifyAdapter>,
    pub artifact_writer: Arc<dyn ArtifactWriter>,
    pub cleaner: Arc<dyn TempCleaner>,
    pub child_builder: Arc<dyn ChildCommandBuilder>,
    pub active_map: Arc<ActiveProcessMap>,
    pub clock: Arc<dyn Clock>,
    /// Snapshot of paths C6 currently considers "still uploading"; read
    /// here only to pass through to the cleaner's preserve set (spec.md
    /// section 4.4 step 1), never mutated by the dispatcher.
    pub uploading_paths: Arc<parking_lot::Mutex<HashSet<PathBuf>>>,
    pub state_dir: PathBuf,
    pub scratch_dir: PathBuf,
    pub config: DispatcherConfig,

    cleanup_tick: AtomicU64,
    iteration: AtomicU64,
    consecutive_errors: AtomicU32,
}

impl DispatcherContext {
    pub fn new(
        store: Arc<parking_lot::Mutex<QueueStore>>,
        notify: Arc<dyn NotifyAdapter>,
        artifact_writer: Arc<dyn ArtifactWriter>,
        cleaner: Arc<dyn TempCleaner>,
        child_builder: Arc<dyn ChildCommandBuilder>,
        active_map: Arc<ActiveProcessMap>,
        clock: Arc<dyn Clock>,
        uploading_paths: Arc<parking_lot::Mutex<HashSet<PathBuf>>>,
        state_dir: PathBuf,
        scratch_dir: PathBuf,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            store,
            notify,
            artifact_writer,
            cleaner,
            child_builder,
            active_map,
            clock,
            uploading_paths,
            state_dir,
            scratch_dir,
            config,
            cleanup_tick: AtomicU64::new(0),
            iteration: AtomicU64::new(0),
            consecutive_errors: AtomicU32::new(0),
        }
    }
}

/// One pass over the main loop body: either there was no ready job, or
/// one job was carried through to a terminal (or cancelled) outcome, or
/// the store itself misbehaved.
#[derive(Debug, PartialEq)]
pub enum TickOutcome {
    NoJobReady,
    JobProcessed(JobId),
    StoreError,
}

const TELEGRAM_MESSAGE_CAP: usize = 4096;
const MESSAGE_HEADER_OVERHEAD: usize = 200;
const MESSAGE_SAFETY_MARGIN: usize = 50;
const INLINE_TEXT_THRESHOLD: usize =
    TELEGRAM_MESSAGE_CAP - MESSAGE_HEADER_OVERHEAD - MESSAGE_SAFETY_MARGIN;

/// Drive one full tick of the dispatcher's main loop (spec.md section 4.4
/// steps 1-15, minus the outer sleep-when-idle and heartbeat/backoff
/// bookkeeping, which `run` layers on top so each can be tested in
/// isolation).
pub async fn tick(ctx: &DispatcherContext) -> TickOutcome {
    run_cleanup_if_due(ctx).await;

    let job = {
        let store = ctx.store.lock();
        store.take_next_ready()
    };
    let Some(job) = job else {
        return TickOutcome::NoJobReady;
    };

    let claimed = {
        let mut store = ctx.store.lock();
        match store.claim(job.id, ctx.clock.now_utc()) {
            Ok(ok) => ok,
            Err(_) => return on_store_error(ctx),
        }
    };
    if !claimed {
        return TickOutcome::NoJobReady;
    }

    ctx.consecutive_errors.store(0, Ordering::SeqCst);

    match process_claimed_job(ctx, &job).await {
        Ok(()) => TickOutcome::JobProcessed(job.id),
        Err(DispatchError::TransientStore(_)) => on_store_error(ctx),
        Err(_) => TickOutcome::JobProcessed(job.id),
    }
}

fn on_store_error(ctx: &DispatcherContext) -> TickOutcome {
    ctx.consecutive_errors.fetch_add(1, Ordering::SeqCst);
    TickOutcome::StoreError
}

async fn run_cleanup_if_due(ctx: &DispatcherContext) {
    let tick = ctx.cleanup_tick.fetch_add(1, Ordering::SeqCst) + 1;
    if tick % ctx.config.cleanup_every_n_ticks == 0 {
        let mut preserve = ctx.uploading_paths.lock().clone();
        preserve.extend(ctx.store.lock().unfinished_file_paths());
        ctx.cleaner.cleanup_stale(&preserve).await;
    }
}

fn is_voice_message(job: &Job) -> bool {
    job.file_name.trim().is_empty()
}

async fn process_claimed_job(ctx: &DispatcherContext, job: &Job) -> Result<(), DispatchError> {
    if tokio::fs::metadata(&job.file_path).await.is_err() {
        notify_ignore_failure(ctx, job, "⚠️ Файл не найден.").await;
        finish(ctx, job.id)?;
        return Err(DispatchError::FileMissing(job.file_path.clone()));
    }

    notify_ignore_failure(
        ctx,
        job,
        &format!("🎙 Транскрибирую «{}»...", job.file_name),
    )
    .await;

    let decision = model_policy::decide(
        &ctx.config.default_model,
        job.file_size_mb,
        ctx.config.small_model_threshold_mb,
    );
    if decision.downgraded {
        notify_ignore_failure(
            ctx,
            job,
            "⚠️ Файл большой, использую модель меньшего размера для экономии памяти.",
        )
        .await;
    }

    if is_cancelled(ctx, job.id) {
        notify_ignore_failure(ctx, job, "❌ Транскрибация отменена.").await;
        cancel(ctx, job.id)?;
        return Err(DispatchError::UserCancelled);
    }

    let worker_args = WorkerArgs {
        job_id: job.id.to_string(),
        file_path: job.file_path.clone(),
        model_name: decision.effective_model.clone(),
        condition_on_previous_text: decision.condition_on_previous_text,
        state_dir: ctx.state_dir.clone(),
        scratch_dir: ctx.scratch_dir.clone(),
    };
    cancel_flag::clear(&ctx.state_dir, &worker_args.job_id);

    let cmd = ctx.child_builder.build(&worker_args);
    let handle: ChildHandle<TranscriptionResult> = match transcribe_child::start(cmd) {
        Ok(h) => h,
        Err(e) => {
            notify_ignore_failure(ctx, job, &format!("⚠️ Ошибка распознавания: {e}")).await;
            finish(ctx, job.id)?;
            cancel_flag::clear(&ctx.state_dir, &worker_args.job_id);
            return Err(DispatchError::ChildFailure(e.to_string()));
        }
    };
    let handle = Arc::new(handle);
    ctx.active_map.insert(job.id, handle.clone());

    let is_video = scribe_core::classify(&job.file_name) == Some(scribe_core::MediaKind::Video);
    let probe = probe_duration(&job.file_path).await;
    let estimate = estimate_processing_time(job.file_size_mb, &decision.effective_model, is_video, probe);

    let outcome = wait_for_child(ctx, job, &handle, &worker_args, estimate).await;
    ctx.active_map.remove(job.id);
    cancel_flag::clear(&ctx.state_dir, &worker_args.job_id);

    match outcome {
        WaitOutcome::Cancelled => {
            notify_ignore_failure(ctx, job, "❌ Транскрибация отменена.").await;
            cancel(ctx, job.id)?;
            Err(DispatchError::UserCancelled)
        }
        WaitOutcome::Failed(message) => {
            notify_ignore_failure(ctx, job, &format!("⚠️ Ошибка распознавания: {message}")).await;
            finish(ctx, job.id)?;
            Err(DispatchError::ChildFailure(message))
        }
        WaitOutcome::Success(result) => finish_successful_job(ctx, job, result).await,
    }
}

enum WaitOutcome {
    Success(TranscriptionResult),
    Failed(String),
    Cancelled,
}

/// Spec.md section 4.4 step 9: the wait-with-poll loop.
async fn wait_for_child(
    ctx: &DispatcherContext,
    job: &Job,
    handle: &ChildHandle<TranscriptionResult>,
    worker_args: &WorkerArgs,
    estimate: StdDuration,
) -> WaitOutcome {
    let started = ctx.clock.now();
    let mut next_progress_at = ctx.config.progress_interval;

    loop {
        if is_cancelled(ctx, job.id) {
            cancel_flag::raise(&ctx.state_dir, &worker_args.job_id).ok();
            handle.kill().await;
            return WaitOutcome::Cancelled;
        }

        let elapsed = ctx.clock.now().saturating_duration_since(started);
        if elapsed >= next_progress_at {
            let percent = percent_complete(elapsed, estimate);
            let bar = render_progress_bar(percent, 20);
            notify_ignore_failure(
                ctx,
                job,
                &format!(
                    "⏳ {bar}\n{} | прошло {}s | файл: {} | модель: {}",
                    percent,
                    elapsed.as_secs(),
                    job.file_name,
                    worker_args.model_name,
                ),
            )
            .await;
            next_progress_at += ctx.config.progress_interval;
        }

        match handle.poll().await {
            ChildExit::Running => {
                tokio::time::sleep(ctx.config.wait_tick).await;
            }
            ChildExit::Done(outcome) => {
                return match outcome {
                    transcribe_child::ChildOutcome::Success(result) => WaitOutcome::Success(result),
                    transcribe_child::ChildOutcome::Cancelled => WaitOutcome::Cancelled,
                };
            }
            ChildExit::Failed(err) => return WaitOutcome::Failed(err.to_string()),
            ChildExit::Exited(code) => return WaitOutcome::Failed(format!("child exited with code {code}")),
        }
    }
}

async fn finish_successful_job(
    ctx: &DispatcherContext,
    job: &Job,
    result: TranscriptionResult,
) -> Result<(), DispatchError> {
    if result.text.trim().is_empty() {
        notify_ignore_failure(ctx, job, "⚠️ Речь не распознана.").await;
        finish(ctx, job.id)?;
        ctx.cleaner.cleanup_file(&job.file_path).await;
        return Err(DispatchError::EmptyTranscription);
    }

    let request = ArtifactRequest {
        text: &result.text,
        user_id: job.user_id,
        original_file_name: &job.file_name,
        is_voice_message: is_voice_message(job),
    };
    let paths = ctx
        .artifact_writer
        .write(&request, ctx.clock.now_utc())
        .await?;

    if result.text.chars().count() > INLINE_TEXT_THRESHOLD {
        let preview: String = result.text.chars().take(INLINE_TEXT_THRESHOLD).collect();
        notify_ignore_failure(ctx, job, &format!("✅ Готово (превью):\n\n{preview}...")).await;
    } else {
        notify_ignore_failure(ctx, job, &format!("✅ Готово:\n\n{}", result.text)).await;
    }
    send_artifact_ignore_failure(ctx, job, &paths.transcript_path, "Транскрибация аудио в виде файла").await;
    if let Some(subtitle) = &paths.subtitle_path {
        send_artifact_ignore_failure(ctx, job, subtitle, "Субтитры").await;
    }

    finish(ctx, job.id)?;
    ctx.cleaner.cleanup_file(&job.file_path).await;
    Ok(())
}

fn is_cancelled(ctx: &DispatcherContext, id: JobId) -> bool {
    ctx.store.lock().is_cancelled(id)
}

fn finish(ctx: &DispatcherContext, id: JobId) -> Result<bool, DispatchError> {
    let now = ctx.clock.now_utc();
    Ok(ctx.store.lock().finish(id, now)?)
}

fn cancel(ctx: &DispatcherContext, id: JobId) -> Result<bool, DispatchError> {
    let now = ctx.clock.now_utc();
    Ok(ctx.store.lock().cancel(id, now)?)
}

/// Notification failures must never fail the job (spec.md section 7,
/// `NotificationFailure`): log and swallow.
async fn notify_ignore_failure(ctx: &DispatcherContext, job: &Job, text: &str) {
    if let Err(e) = ctx.notify.notify_status(job.chat_id, job.message_id, text).await {
        tracing::warn!(job_id = %job.id, error = %e, "notify_status failed");
    }
}

async fn send_artifact_ignore_failure(ctx: &DispatcherContext, job: &Job, path: &Path, caption: &str) {
    if let Err(e) = ctx.notify.send_artifact(job.chat_id, path, caption).await {
        tracing::warn!(job_id = %job.id, error = %e, "send_artifact failed");
    }
}

/// Run the dispatcher forever, applying the housekeeping spec.md section
/// 4.4 step 15 describes: heartbeat logging every N iterations, and
/// exponential-style backoff after `max_consecutive_errors` store
/// failures in a row. Exits when `shutdown` is signalled.
pub async fn run(ctx: Arc<DispatcherContext>, mut shutdown: tokio::sync::watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            return;
        }

        let outcome = tick(&ctx).await;

        let iteration = ctx.iteration.fetch_add(1, Ordering::SeqCst) + 1;
        if iteration % ctx.config.heartbeat_every_n_iterations == 0 {
            tracing::info!(iteration, "dispatcher heartbeat");
        }

        match outcome {
            TickOutcome::NoJobReady => {
                tokio::select! {
                    _ = tokio::time::sleep(ctx.config.idle_sleep) => {}
                    _ = shutdown.changed() => {}
                }
            }
            TickOutcome::StoreError => {
                if ctx.consecutive_errors.load(Ordering::SeqCst) >= ctx.config.max_consecutive_errors {
                    tracing::warn!("too many consecutive store errors, backing off");
                    tokio::select! {
                        _ = tokio::time::sleep(ctx.config.backoff) => {}
                        _ = shutdown.changed() => {}
                    }
                    ctx.consecutive_errors.store(0, Ordering::SeqCst);
                }
            }
            TickOutcome::JobProcessed(_) => {}
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
