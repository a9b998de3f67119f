// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types shared across the broker, storage and transport layers.

use crate::id::JobId;
use thiserror::Error;

/// Errors surfaced by the broker's public API.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("job {0} not found")]
    NotFound(JobId),

    #[error("job {0} already exists")]
    JobExists(JobId),

    #[error("timed out waiting for job {0} to complete")]
    Timeout(JobId),

    #[error("job {job} cannot transition from {from} to {to}")]
    InvalidTransition { job: JobId, from: String, to: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("another broker instance holds the data directory lock")]
    LockHeld,
}

/// Errors surfaced by the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("state file at {0} is corrupt")]
    Corrupt(String),
}
