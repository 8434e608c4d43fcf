// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `scribe`: the control-surface CLI for `scribed` (SPEC_FULL.md section
//! 3). Each subcommand is one IPC round trip over the Unix socket,
//! except `serve`, which launches the daemon itself in the foreground.

mod client;
mod commands;
mod daemon_process;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "scribe", about = "control surface for the scribed transcription daemon")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enqueue a media file for transcription.
    Submit {
        file: PathBuf,
        #[arg(long, default_value_t = 0)]
        user_id: i64,
        #[arg(long, default_value_t = 0)]
        chat_id: i64,
        #[arg(long, default_value_t = 0)]
        message_id: i64,
    },
    /// List a user's ready or active jobs.
    List {
        #[arg(long, default_value_t = 0)]
        user_id: i64,
    },
    /// Cancel a queued or active job by id.
    Cancel { job_id: i64 },
    /// Report daemon uptime, queue depth, and the active job.
    Status,
    /// Run scribed in the foreground (local development).
    Serve,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Submit {
            file,
            user_id,
            chat_id,
            message_id,
        } => commands::submit(&file, user_id, chat_id, message_id).await,
        Commands::List { user_id } => commands::list(user_id).await,
        Commands::Cancel { job_id } => commands::cancel(job_id).await,
        Commands::Status => commands::status().await,
        Commands::Serve => commands::serve(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
