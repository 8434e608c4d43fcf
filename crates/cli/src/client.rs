// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-socket client used by every `scribe` subcommand except `serve`.
//! Grounded on `oj`'s `client.rs` connect-send-receive shape, narrowed to
//! one round trip per invocation (no long-lived session, no retry/
//! reconnect loop — this CLI is a thin exerciser for C1-C7, not a full
//! interactive client).

use scribe_daemon::protocol::{self, DEFAULT_TIMEOUT};
use scribe_daemon::{Request, Response};
use std::path::PathBuf;
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not determine the daemon socket path: {0}")]
    Config(#[from] scribe_daemon::ConfigError),
    #[error("could not connect to scribed at {path}: {source}\nis the daemon running? try `scribe serve`")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),
    #[error("daemon returned an error: {0}")]
    Daemon(String),
}

/// Send one request to the running daemon and return its response.
pub async fn send(request: Request) -> Result<Response, ClientError> {
    let config = scribe_daemon::Config::load()?;
    let mut stream = UnixStream::connect(&config.socket_path)
        .await
        .map_err(|source| ClientError::Connect {
            path: config.socket_path.clone(),
            source,
        })?;

    protocol::write_request(&mut stream, &request, DEFAULT_TIMEOUT).await?;
    let response = protocol::read_response(&mut stream, DEFAULT_TIMEOUT).await?;

    if let Response::Error { message } = &response {
        return Err(ClientError::Daemon(message.clone()));
    }
    Ok(response)
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
