// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds the dispatcher distinguishes (spec.md section 7). Every
//! variant but `TransientStore` maps to a terminal transition; a
//! `TransientStore` error increments the dispatcher's consecutive-error
//! counter instead (section 4.4 step 15) and leaves the job untouched.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("store error: {0}")]
    TransientStore(#[from] scribe_storage::StoreError),

    #[error("file missing: {0}")]
    FileMissing(std::path::PathBuf),

    #[error("child failed: {0}")]
    ChildFailure(String),

    #[error("engine returned no recognizable speech")]
    EmptyTranscription,

    #[error("job was cancelled")]
    UserCancelled,

    #[error("artifact write failed: {0}")]
    Artifact(#[from] scribe_adapters::ArtifactError),
}

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("store error: {0}")]
    Store(#[from] scribe_storage::StoreError),

    #[error("io error reading ingest directory: {0}")]
    Io(#[from] std::io::Error),
}
