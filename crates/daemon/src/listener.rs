// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-socket request loop answering the CLI's `submit`/`list`/`cancel`/
//! `status` operations against the shared Queue Store (SPEC_FULL.md
//! section 3). One task per connection, narrowed from
//! `oj-daemon`'s `UnixListener` accept loop down to this protocol's four
//! operations.

use crate::config::Config;
use crate::protocol::{self, DEFAULT_TIMEOUT};
use crate::protocol::{JobSummary, Request, Response};
use scribe_core::{Clock, JobId, JobSubmission};
use scribe_storage::QueueStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::{UnixListener, UnixStream};

pub async fn run(
    listener: UnixListener,
    store: Arc<parking_lot::Mutex<QueueStore>>,
    clock: Arc<dyn Clock>,
    config: Arc<Config>,
    start_time: Instant,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let store = store.clone();
                        let clock = clock.clone();
                        let config = config.clone();
                        tokio::spawn(async move {
                            handle_connection(stream, store, clock, config, start_time).await;
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to accept connection");
                    }
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    return;
                }
            }
        }
    }
}

async fn handle_connection(
    mut stream: UnixStream,
    store: Arc<parking_lot::Mutex<QueueStore>>,
    clock: Arc<dyn Clock>,
    config: Arc<Config>,
    start_time: Instant,
) {
    let request = match protocol::read_request(&mut stream, DEFAULT_TIMEOUT).await {
        Ok(req) => req,
        Err(e) => {
            tracing::debug!(error = %e, "failed to read request");
            return;
        }
    };

    let response = handle_request(request, &store, &clock, &config, start_time);

    if let Err(e) = protocol::write_response(&mut stream, &response, DEFAULT_TIMEOUT).await {
        tracing::debug!(error = %e, "failed to write response");
    }
}

fn handle_request(
    request: Request,
    store: &Arc<parking_lot::Mutex<QueueStore>>,
    clock: &Arc<dyn Clock>,
    config: &Config,
    start_time: Instant,
) -> Response {
    match request {
        Request::Ping => Response::Pong,
        Request::Submit {
            user_id,
            chat_id,
            message_id,
            file_path,
            file_name,
            file_size_mb,
        } => {
            if file_size_mb > config.max_file_size_mb {
                return Response::Error {
                    message: format!(
                        "file_size_mb {file_size_mb} exceeds max_file_size {}",
                        config.max_file_size_mb
                    ),
                };
            }
            let submission = JobSubmission {
                user_id,
                chat_id,
                message_id,
                file_path: PathBuf::from(file_path),
                file_name,
                file_size_mb,
            };
            let mut store = store.lock();
            match store.enqueue(submission, clock.now_utc()) {
                Ok(id) => Response::Submitted { id: id.get() },
                Err(e) => Response::Error {
                    message: e.to_string(),
                },
            }
        }
        Request::List { user_id } => {
            let store = store.lock();
            let jobs: Vec<JobSummary> = store
                .list_user_ready_or_active(user_id)
                .iter()
                .map(JobSummary::from)
                .collect();
            Response::Jobs { jobs }
        }
        Request::Cancel { id } => {
            let mut store = store.lock();
            match store.cancel(JobId::new(id), clock.now_utc()) {
                Ok(ok) => Response::Cancelled { ok },
                Err(e) => Response::Error {
                    message: e.to_string(),
                },
            }
        }
        Request::Status => {
            let store = store.lock();
            let active = store.list_active();
            Response::Status {
                uptime_secs: start_time.elapsed().as_secs(),
                queue_depth: active.len() + usize::from(store.take_next_ready().is_some()),
                active_job_id: active.first().map(|j| j.id.get()),
            }
        }
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
