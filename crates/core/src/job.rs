// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The [`Job`] record and its status machine.

use crate::id::JobId;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Lifecycle state of a job. Transitions are one-way along a DAG; see
/// [`JobStatus::can_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Processing => "processing",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl JobStatus {
    /// Terminal states are absorbing: nothing may transition out of them.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Whether moving from `self` to `next` is a legal edge in the state machine.
    pub fn can_transition_to(self, next: Self) -> bool {
        use JobStatus::*;
        match (self, next) {
            (Pending, Processing | Cancelled) => true,
            (Processing, Completed | Failed | Cancelled) => true,
            // submit_result tolerates firing directly from pending (§4.2).
            (Pending, Completed | Failed) => true,
            _ => false,
        }
    }
}

/// A unit of work tracked end to end by the broker.
///
/// The broker owns every `Job` exclusively; transports only ever see
/// immutable copies produced through the broker's public operations.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Job {
    pub id: JobId,
    pub payload: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Construct a freshly submitted job in `pending` state.
    pub fn new(id: JobId, payload: String, headers: HashMap<String, String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            payload,
            headers,
            status: JobStatus::Pending,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Attempt to move to `next`, stamping `updated_at` (and `completed_at`
    /// if `next` is terminal). Returns the previous status on success so
    /// callers can log a transition, or `Err(())` if the edge is illegal.
    pub fn transition(&mut self, next: JobStatus, now: DateTime<Utc>) -> Result<JobStatus, ()> {
        if !self.status.can_transition_to(next) {
            return Err(());
        }
        let prev = self.status;
        self.status = next;
        self.updated_at = now;
        if next.is_terminal() {
            self.completed_at = Some(now);
        }
        Ok(prev)
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn builder() -> JobBuilder {
        JobBuilder::default()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct JobBuilder {
    id: JobId,
    payload: String,
    headers: HashMap<String, String>,
    status: JobStatus,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for JobBuilder {
    fn default() -> Self {
        Self {
            id: JobId::new(),
            payload: String::new(),
            headers: HashMap::new(),
            status: JobStatus::Pending,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl JobBuilder {
    pub fn id(mut self, id: JobId) -> Self {
        self.id = id;
        self
    }

    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn header(mut self, k: impl Into<String>, v: impl Into<String>) -> Self {
        self.headers.insert(k.into(), v.into());
        self
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> Job {
        let now = Utc::now();
        Job {
            id: self.id,
            payload: self.payload,
            headers: self.headers,
            status: self.status,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
            completed_at: if self.status.is_terminal() { Some(now) } else { None },
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
