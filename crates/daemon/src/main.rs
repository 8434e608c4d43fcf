// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `scribed`: the long-running transcription job daemon. Owns the WAL/
//! snapshot files, spawns the Job Dispatcher (C4) supervised by the
//! Dispatcher Supervisor (C5) and the Downloads Watcher (C6), and answers
//! the control socket (SPEC_FULL.md section 3). Also doubles as the
//! re-exec target for the Child-Process Supervisor's worker: invoked with
//! [`scribe_engine::WORKER_SUBCOMMAND`] it runs one transcription and
//! exits, the way `CurrentExeChildCommandBuilder` expects.

use scribe_daemon::config::Config;
use scribe_daemon::lifecycle;
use scribe_daemon::listener;
use scribe_engine::{run_worker, WorkerArgs, WORKER_SUBCOMMAND};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_worker_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

fn init_daemon_tracing(log_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, "scribed.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .init();
    guard
}

#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1);

    if let Some(first) = args.next() {
        if first == WORKER_SUBCOMMAND {
            init_worker_tracing();
            let payload = args.next().unwrap_or_default();
            let worker_args: WorkerArgs = match serde_json::from_str(&payload) {
                Ok(args) => args,
                Err(e) => {
                    eprintln!("malformed worker args: {e}");
                    std::process::exit(1);
                }
            };
            std::process::exit(run_worker(worker_args).await);
        }
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = config.ensure_dirs() {
        eprintln!("failed to create state directories: {e}");
        std::process::exit(1);
    }

    let _guard = init_daemon_tracing(&config.log_dir);
    tracing::info!(state_dir = %config.state_dir.display(), "starting scribed");

    let config_arc = Arc::new(config.clone());
    let daemon = match lifecycle::start(config).await {
        Ok(d) => d,
        Err(e) => {
            tracing::error!(error = %e, "failed to start daemon");
            eprintln!("failed to start daemon: {e}");
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let supervisor = daemon.supervisor.clone();
    let supervisor_shutdown = shutdown_rx.clone();
    let supervisor_task = tokio::spawn(async move {
        supervisor.start(supervisor_shutdown).await;
    });

    let watcher = daemon.watcher.clone();
    let watcher_shutdown = shutdown_rx.clone();
    // SPEC_FULL.md section 2: stagger the watcher's first tick so it
    // doesn't hammer the store at the same instant the dispatcher
    // supervisor resets stale active flags on cold start.
    let watcher_task = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_secs(10)).await;
        watcher.run(watcher_shutdown).await;
    });

    let listener_task = tokio::spawn(listener::run(
        daemon.listener,
        daemon.store.clone(),
        daemon.clock.clone(),
        config_arc,
        daemon.start_time,
        shutdown_rx.clone(),
    ));

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received shutdown signal"),
        Err(e) => tracing::error!(error = %e, "failed to listen for shutdown signal"),
    }

    let _ = shutdown_tx.send(true);
    let _ = tokio::join!(supervisor_task, watcher_task, listener_task);
    {
        let mut store = daemon.store.lock();
        let seq = store.write_seq();
        if let Err(e) = store.checkpoint(seq) {
            tracing::warn!(error = %e, "failed to checkpoint on shutdown");
        }
    }
    tracing::info!("scribed stopped");
}
