// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol between `scribe` (CLI) and `scribed` (daemon).
//!
//! Wire format: 4-byte big-endian length prefix + JSON payload, the same
//! framing the teacher's `oj-daemon::protocol` uses, narrowed to the
//! handful of operations the Queue Store (C1) exposes externally
//! (SPEC_FULL.md section 3): submit, list, cancel, status.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Request from CLI to daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping.
    Ping,
    /// Enqueue a new transcription job (spec.md section 4.1 `enqueue`).
    Submit {
        user_id: i64,
        chat_id: i64,
        message_id: i64,
        file_path: String,
        file_name: String,
        file_size_mb: f64,
    },
    /// List one user's ready-or-active jobs (spec.md section 4.1
    /// `list_user_ready_or_active`).
    List { user_id: i64 },
    /// Cancel a job by id (spec.md section 4.1 `cancel`).
    Cancel { id: i64 },
    /// Daemon status (uptime, queue depth, whether a job is active).
    Status,
}

/// Response from daemon to CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Pong,
    Submitted { id: i64 },
    Jobs { jobs: Vec<JobSummary> },
    Cancelled { ok: bool },
    Status {
        uptime_secs: u64,
        queue_depth: usize,
        active_job_id: Option<i64>,
    },
    Error { message: String },
}

/// Flattened view of a [`scribe_core::Job`] for CLI display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobSummary {
    pub id: i64,
    pub user_id: i64,
    pub chat_id: i64,
    pub message_id: i64,
    pub file_name: String,
    pub file_size_mb: f64,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&scribe_core::Job> for JobSummary {
    fn from(job: &scribe_core::Job) -> Self {
        JobSummary {
            id: job.id.get(),
            user_id: job.user_id,
            chat_id: job.chat_id,
            message_id: job.message_id,
            file_name: job.file_name.clone(),
            file_size_mb: job.file_size_mb,
            status: job.status().to_string(),
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        }
    }
}

/// Protocol (framing/encoding) errors, distinct from application-level
/// `Response::Error`.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },
    #[error("connection closed")]
    ConnectionClosed,
    #[error("timeout")]
    Timeout,
}

/// Maximum message size (16 MiB — comfortably above any status/list
/// payload this protocol ever carries).
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Default request/response round-trip timeout.
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let json = serde_json::to_vec(msg)?;
    if json.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: json.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(json)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

async fn read_message<R: tokio::io::AsyncReadExt + Unpin>(
    reader: &mut R,
) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed)
        }
        Err(e) => return Err(ProtocolError::Io(e)),
    }
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

async fn write_message<W: tokio::io::AsyncWriteExt + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    writer.write_all(&(data.len() as u32).to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one request, with a timeout (used by the daemon's listener so a
/// half-open connection can't block a listener task forever).
pub async fn read_request<R: tokio::io::AsyncReadExt + Unpin>(
    reader: &mut R,
    timeout: std::time::Duration,
) -> Result<Request, ProtocolError> {
    let bytes = tokio::time::timeout(timeout, read_message(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&bytes)
}

/// Write one response, with a timeout.
pub async fn write_response<W: tokio::io::AsyncWriteExt + Unpin>(
    writer: &mut W,
    response: &Response,
    timeout: std::time::Duration,
) -> Result<(), ProtocolError> {
    let data = encode(response)?;
    tokio::time::timeout(timeout, write_message(writer, &data))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

/// Write one request (CLI side).
pub async fn write_request<W: tokio::io::AsyncWriteExt + Unpin>(
    writer: &mut W,
    request: &Request,
    timeout: std::time::Duration,
) -> Result<(), ProtocolError> {
    let data = encode(request)?;
    tokio::time::timeout(timeout, write_message(writer, &data))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

/// Read one response (CLI side).
pub async fn read_response<R: tokio::io::AsyncReadExt + Unpin>(
    reader: &mut R,
    timeout: std::time::Duration,
) -> Result<Response, ProtocolError> {
    let bytes = tokio::time::timeout(timeout, read_message(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&bytes)
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
