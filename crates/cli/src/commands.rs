// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Implementations of each `scribe` subcommand. Thin wrappers around
//! [`crate::client::send`] plus plain-text rendering of the responses,
//! grounded on `oj`'s command modules but narrowed to this protocol's
//! four IPC operations and the local `serve` launcher.

use crate::client::{send, ClientError};
use crate::daemon_process;
use scribe_daemon::{JobSummary, Request, Response};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("could not read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unexpected response from daemon")]
    UnexpectedResponse,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn file_size_mb(path: &Path) -> Result<f64, CommandError> {
    let metadata = std::fs::metadata(path).map_err(|source| CommandError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    Ok(metadata.len() as f64 / (1024.0 * 1024.0))
}

pub async fn submit(
    file: &Path,
    user_id: i64,
    chat_id: i64,
    message_id: i64,
) -> Result<(), CommandError> {
    let file_path = file
        .canonicalize()
        .map_err(|source| CommandError::ReadFile {
            path: file.display().to_string(),
            source,
        })?;
    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_path.display().to_string());
    let size_mb = file_size_mb(&file_path)?;

    let request = Request::Submit {
        user_id,
        chat_id,
        message_id,
        file_path: file_path.display().to_string(),
        file_name,
        file_size_mb: size_mb,
    };

    match send(request).await? {
        Response::Submitted { id } => {
            println!("submitted job {id}");
            Ok(())
        }
        Response::Error { message } => Err(CommandError::Client(ClientError::Daemon(message))),
        _ => Err(CommandError::UnexpectedResponse),
    }
}

fn print_job_row(job: &JobSummary) {
    println!(
        "{:>6}  {:<10}  {:<30}  {:>8.1} MB  updated {}",
        job.id, job.status, job.file_name, job.file_size_mb, job.updated_at
    );
}

pub async fn list(user_id: i64) -> Result<(), CommandError> {
    match send(Request::List { user_id }).await? {
        Response::Jobs { jobs } => {
            if jobs.is_empty() {
                println!("no ready or active jobs for user {user_id}");
            } else {
                for job in &jobs {
                    print_job_row(job);
                }
            }
            Ok(())
        }
        Response::Error { message } => Err(CommandError::Client(ClientError::Daemon(message))),
        _ => Err(CommandError::UnexpectedResponse),
    }
}

pub async fn cancel(job_id: i64) -> Result<(), CommandError> {
    match send(Request::Cancel { id: job_id }).await? {
        Response::Cancelled { ok } => {
            if ok {
                println!("cancelled job {job_id}");
            } else {
                println!("job {job_id} was already finished or cancelled");
            }
            Ok(())
        }
        Response::Error { message } => Err(CommandError::Client(ClientError::Daemon(message))),
        _ => Err(CommandError::UnexpectedResponse),
    }
}

pub async fn status() -> Result<(), CommandError> {
    match send(Request::Status).await? {
        Response::Status {
            uptime_secs,
            queue_depth,
            active_job_id,
        } => {
            println!("uptime: {uptime_secs}s");
            println!("queue depth: {queue_depth}");
            match active_job_id {
                Some(id) => println!("active job: {id}"),
                None => println!("active job: none"),
            }
            Ok(())
        }
        Response::Error { message } => Err(CommandError::Client(ClientError::Daemon(message))),
        _ => Err(CommandError::UnexpectedResponse),
    }
}

/// Run `scribed` in the foreground. For local development only; a real
/// deployment runs `scribed` directly under its own supervisor.
pub fn serve() -> Result<(), CommandError> {
    let status = daemon_process::run_foreground()?;
    std::process::exit(status.code().unwrap_or(1));
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
