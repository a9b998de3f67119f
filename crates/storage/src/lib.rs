// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relayq-storage: durable persistence for the queue list and the status
//! map, each in its own JSON file under the broker's data directory,
//! written with atomic tmp-then-rename semantics.

mod atomic;

use relayq_core::{Job, JobId, StorageError};
use std::collections::HashMap;
use std::path::PathBuf;

const QUEUE_FILE: &str = "jobs.json";
const STATUS_FILE: &str = "jobs-status.json";

/// Persists the two pieces of broker state that must survive a restart:
/// the pending queue and the status map.
#[derive(Debug, Clone)]
pub struct Storage {
    queue_path: PathBuf,
    status_path: PathBuf,
}

impl Storage {
    /// Point a `Storage` at `data_dir`. Does not create the directory;
    /// callers are expected to have already created it (the broker does
    /// this while acquiring its lockfile).
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self { queue_path: data_dir.join(QUEUE_FILE), status_path: data_dir.join(STATUS_FILE) }
    }

    pub fn save_queue(&self, jobs: &[Job]) -> Result<(), StorageError> {
        atomic::write_json(&self.queue_path, &jobs)?;
        tracing::trace!(path = %self.queue_path.display(), len = jobs.len(), "queue saved");
        Ok(())
    }

    /// Loads the persisted queue list, or an empty list if none exists yet.
    pub fn load_queue(&self) -> Result<Vec<Job>, StorageError> {
        let jobs: Vec<Job> = atomic::read_json(&self.queue_path)?.unwrap_or_default();
        tracing::trace!(path = %self.queue_path.display(), len = jobs.len(), "queue loaded");
        Ok(jobs)
    }

    pub fn save_status(&self, status: &HashMap<JobId, Job>) -> Result<(), StorageError> {
        // JSON object keys must be strings; JobId serializes transparently
        // as a UUID string already, so a plain HashMap round-trips cleanly.
        atomic::write_json(&self.status_path, &status)?;
        tracing::trace!(path = %self.status_path.display(), len = status.len(), "status saved");
        Ok(())
    }

    /// Loads the persisted status map, or an empty map if none exists yet.
    pub fn load_status(&self) -> Result<HashMap<JobId, Job>, StorageError> {
        let status: HashMap<JobId, Job> = atomic::read_json(&self.status_path)?.unwrap_or_default();
        tracing::trace!(path = %self.status_path.display(), len = status.len(), "status loaded");
        Ok(status)
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
