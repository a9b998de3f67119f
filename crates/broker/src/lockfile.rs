// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive advisory lock over a broker's storage directory.
//!
//! A broker is a process-wide singleton with respect to its storage
//! directory: two instances over the same directory would race
//! destructively on the queue/status files. The lock is acquired once at
//! startup and released implicitly when the file handle is dropped.

use fs2::FileExt;
use relayq_core::BrokerError;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const LOCK_FILE: &str = "broker.lock";

/// Holds the open, exclusively-locked `broker.lock` file for as long as
/// this broker instance runs.
pub struct DataDirLock {
    #[allow(dead_code)]
    file: File,
}

impl DataDirLock {
    /// Acquire the lock in `data_dir`, creating the directory and the
    /// lockfile if needed. Fails with `LockHeld` if another process
    /// already holds it.
    pub fn acquire(data_dir: &Path) -> Result<Self, BrokerError> {
        std::fs::create_dir_all(data_dir)
            .map_err(|e| relayq_core::StorageError::Io { path: data_dir.display().to_string(), source: e })?;

        let lock_path = data_dir.join(LOCK_FILE);
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| relayq_core::StorageError::Io { path: lock_path.display().to_string(), source: e })?;

        file.try_lock_exclusive().map_err(|_| BrokerError::LockHeld)?;

        file.set_len(0).ok();
        let _ = writeln!(file, "{}", std::process::id());

        Ok(Self { file })
    }
}

#[cfg(test)]
#[path = "lockfile_tests.rs"]
mod tests;
