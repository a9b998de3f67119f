// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the broker crate.

use std::path::PathBuf;

/// Resolve the storage directory: `BROKER_STORAGE_DIR`, defaulting to `./data`.
pub fn storage_dir() -> PathBuf {
    std::env::var("BROKER_STORAGE_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("./data"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
