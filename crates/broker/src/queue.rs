// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pending-job FIFO.

use parking_lot::Mutex;
use relayq_core::{BrokerError, Job};
use relayq_storage::Storage;
use std::collections::VecDeque;

/// Thread-safe FIFO of pending jobs with durable backing.
///
/// All operations serialize on a single mutex that protects both the
/// in-memory deque and the persistence step: persisting under the lock
/// keeps on-disk state a prefix of in-memory truth, at the cost of
/// throughput. Callers must not hold other broker locks while calling
/// into `Queue` — this lock's scope never nests with another.
pub struct Queue {
    storage: Storage,
    jobs: Mutex<VecDeque<Job>>,
}

impl Queue {
    /// Load a queue from `storage`, recovering any persisted pending jobs.
    pub fn load(storage: Storage) -> Result<Self, BrokerError> {
        let jobs = storage.load_queue()?;
        Ok(Self { storage, jobs: Mutex::new(VecDeque::from(jobs)) })
    }

    /// Append `job` to the tail and persist. On persistence failure the
    /// in-memory append is rolled back so memory and disk stay consistent.
    pub fn push(&self, job: Job) -> Result<(), BrokerError> {
        let mut jobs = self.jobs.lock();
        let job_id = job.id;
        jobs.push_back(job);
        if let Err(e) = self.persist(&jobs) {
            jobs.pop_back();
            return Err(e.into());
        }
        tracing::debug!(job_id = %job_id.short(8), queue_size = jobs.len(), "job pushed");
        Ok(())
    }

    /// Remove and return the head, persisting the shortened list. Rolls
    /// back the removal on persistence failure.
    pub fn pop(&self) -> Result<Option<Job>, BrokerError> {
        let mut jobs = self.jobs.lock();
        let Some(job) = jobs.pop_front() else { return Ok(None) };
        if let Err(e) = self.persist(&jobs) {
            jobs.push_front(job);
            return Err(e.into());
        }
        tracing::debug!(job_id = %job.id.short(8), queue_size = jobs.len(), "job popped");
        Ok(Some(job))
    }

    /// Current length, observed atomically.
    pub fn size(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Empty the list and persist, returning the drained jobs so the
    /// caller can cancel their waiters.
    pub fn clear(&self) -> Result<Vec<Job>, BrokerError> {
        let mut jobs = self.jobs.lock();
        let drained: Vec<Job> = jobs.drain(..).collect();
        if let Err(e) = self.persist(&jobs) {
            jobs.extend(drained);
            return Err(e.into());
        }
        tracing::info!(drained = drained.len(), "queue cleared");
        Ok(drained)
    }

    fn persist(&self, jobs: &VecDeque<Job>) -> Result<(), relayq_core::StorageError> {
        let list: Vec<Job> = jobs.iter().cloned().collect();
        self.storage.save_queue(&list)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
