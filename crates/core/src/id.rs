// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier and ID generation abstractions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Unique identity of a job, assigned at submission and immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generate a new random job id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a job id from its string form. Used to validate path/body ids
    /// coming in over a transport before they reach the broker.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    /// Returns a string slice of the id truncated to at most `n` characters,
    /// for compact log lines.
    pub fn short(&self, n: usize) -> String {
        short(&self.0.to_string(), n).to_string()
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for JobId {
    fn from(u: Uuid) -> Self {
        Self(u)
    }
}

/// Returns a string slice truncated to at most `n` characters (for log lines).
pub fn short(s: &str, n: usize) -> &str {
    if s.len() <= n {
        s
    } else {
        &s[..n]
    }
}

/// Abstraction over id generation, so tests can assert on predictable ids
/// instead of random UUIDs.
pub trait IdGen: Send + Sync {
    fn next(&self) -> JobId;
}

/// Production id generator: random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> JobId {
        JobId::new()
    }
}

/// Deterministic id generator for tests: `{prefix}-{n}` hashed into a UUID
/// so the rest of the system can stay typed on `JobId`.
#[derive(Debug, Clone)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), counter: Arc::new(AtomicU64::new(0)) }
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> JobId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let name = format!("{}-{n}", self.prefix);
        JobId(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
