// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The façade that composes [`Queue`], [`StatusTracker`] and [`Storage`]
//! into the operations transports consume.

use crate::lockfile::DataDirLock;
use crate::queue::Queue;
use crate::status::{Counts, StatusTracker};
use relayq_core::{BrokerError, Clock, IdGen, Job, JobId, SystemClock, UuidIdGen};
use relayq_storage::Storage;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Submit requests that omit a timeout fall back to this duration,
/// matching the reference implementation's default.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// The broker façade: one per storage directory, for the lifetime of the process.
pub struct Broker<C: Clock = SystemClock, G: IdGen = UuidIdGen> {
    queue: Queue,
    status: StatusTracker<C>,
    clock: C,
    id_gen: G,
    _lock: DataDirLock,
}

impl Broker<SystemClock, UuidIdGen> {
    /// Open (creating if absent) the broker backed by `data_dir`, acquiring
    /// its exclusive lockfile and recovering any persisted state.
    pub fn open(data_dir: &Path) -> Result<Self, BrokerError> {
        Self::open_with(data_dir, SystemClock, UuidIdGen)
    }
}

impl<C: Clock, G: IdGen> Broker<C, G> {
    /// Same as [`Broker::open`] but with injectable clock/id-generator, for tests.
    pub fn open_with(data_dir: &Path, clock: C, id_gen: G) -> Result<Self, BrokerError> {
        let lock = DataDirLock::acquire(data_dir)?;
        let storage = Storage::new(data_dir);
        let queue = Queue::load(storage.clone())?;
        let status = StatusTracker::load(storage, clock.clone())?;
        Ok(Self { queue, status, clock, id_gen, _lock: lock })
    }

    /// Assign an id, register it pending, and push it onto the queue.
    /// Atomic: a queue-push failure reverts the status registration.
    pub fn submit(&self, payload: String, headers: HashMap<String, String>) -> Result<JobId, BrokerError> {
        let id = self.id_gen.next();
        let now = self.clock.now_utc();
        let job = Job::new(id, payload, headers, now);

        self.status.register(job.clone())?;
        if let Err(e) = self.queue.push(job) {
            let _ = self.status.remove(id);
            return Err(e);
        }
        Ok(id)
    }

    /// Submit then await the terminal record, defaulting to
    /// [`DEFAULT_SUBMIT_TIMEOUT`] when `timeout` is absent or zero.
    pub async fn submit_and_wait(
        &self,
        payload: String,
        headers: HashMap<String, String>,
        timeout: Option<Duration>,
    ) -> Result<Job, BrokerError> {
        let id = self.submit(payload, headers)?;
        let timeout = match timeout {
            Some(d) if !d.is_zero() => Some(d),
            _ => Some(DEFAULT_SUBMIT_TIMEOUT),
        };
        self.status.wait(id, timeout).await
    }

    /// Pop the head of the queue, transitioning it to `processing`.
    pub fn poll(&self) -> Result<Option<Job>, BrokerError> {
        let Some(job) = self.queue.pop()? else { return Ok(None) };
        self.status.transition_processing(job.id)?;
        self.status.snapshot(job.id).map(Some)
    }

    pub fn complete(&self, id: JobId, result: String) -> Result<(), BrokerError> {
        self.status.submit_result(id, Some(result), None)
    }

    pub fn fail(&self, id: JobId, error: String) -> Result<(), BrokerError> {
        self.status.submit_result(id, None, Some(error))
    }

    /// Recover the terminal or in-flight record for `id`.
    pub fn snapshot(&self, id: JobId) -> Result<Job, BrokerError> {
        self.status.snapshot(id)
    }

    pub fn stats(&self) -> Counts {
        self.status.counts()
    }

    /// Drain the pending queue, cancelling the waiters of drained jobs.
    pub fn clear_queue(&self) -> Result<(), BrokerError> {
        let drained = self.queue.clear()?;
        let ids: Vec<JobId> = drained.iter().map(|job| job.id).collect();
        self.status.cancel(&ids)
    }

    /// Empty the status map, delivering an explicit `Cancelled` record to
    /// any still-live waiter first.
    pub fn clear_status(&self) -> Result<(), BrokerError> {
        self.status.clear()
    }
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;
