// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic, corruption-resistant JSON persistence: write to a sibling `.tmp`
//! file, then rename over the target. Rename is atomic within a single
//! filesystem, which keeps readers from ever observing a half-written file.

use relayq_core::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

fn io_err(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io { path: path.display().to_string(), source }
}

/// The sibling `<path>.tmp` used as the atomic-write staging file, e.g.
/// `jobs.json` -> `jobs.json.tmp`.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Serialize `value` and atomically replace the contents of `path`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let tmp_path = tmp_path(path);
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(&tmp_path, json.as_bytes()).map_err(|e| io_err(&tmp_path, e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

/// Load and deserialize `path`. A missing file yields `Ok(None)`; a present
/// but malformed file fails loudly rather than silently resetting state.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let value = serde_json::from_str(&contents)
                .map_err(|_| StorageError::Corrupt(path.display().to_string()))?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err(path, e)),
    }
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
