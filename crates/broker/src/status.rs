// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The status map, the waiter registry, and the result-submission /
//! completion-wait rendezvous.

use parking_lot::Mutex;
use relayq_core::{BrokerError, Clock, Job, JobId, JobStatus, StorageError};
use relayq_storage::Storage;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::oneshot;

/// Counts of jobs by status, as returned by [`StatusTracker::counts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Counts {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
}

/// Reason attached to a job cancelled by an administrative clear.
const CLEARED_BY_ADMIN: &str = "cleared by administrator";

struct Waiter {
    sender: oneshot::Sender<Job>,
    receiver: Option<oneshot::Receiver<Job>>,
}

#[derive(Default)]
struct Inner {
    jobs: HashMap<JobId, Job>,
    waiters: HashMap<JobId, Waiter>,
}

/// Owns the status map (id → Job) and the single-capacity waiter channel
/// per job. A single mutex guards both maps; persistence happens under
/// that same mutex, so the last writer is the last holder.
pub struct StatusTracker<C: Clock> {
    storage: Storage,
    clock: C,
    inner: Mutex<Inner>,
}

impl<C: Clock> StatusTracker<C> {
    /// Load a tracker from `storage`, recovering any persisted status map.
    /// Waiters are never persisted — a restart always loses in-flight
    /// `wait` calls, which is fine: the status map backstops late lookups.
    pub fn load(storage: Storage, clock: C) -> Result<Self, BrokerError> {
        let jobs = storage.load_status()?;
        Ok(Self { storage, clock, inner: Mutex::new(Inner { jobs, waiters: HashMap::new() }) })
    }

    /// Register a freshly submitted job and open its waiter channel.
    /// Idempotent registration of a duplicate id is a `JobExists` error.
    pub fn register(&self, job: Job) -> Result<(), BrokerError> {
        let mut inner = self.inner.lock();
        if inner.jobs.contains_key(&job.id) {
            return Err(BrokerError::JobExists(job.id));
        }
        let id = job.id;
        let (tx, rx) = oneshot::channel();
        inner.jobs.insert(id, job);
        inner.waiters.insert(id, Waiter { sender: tx, receiver: Some(rx) });
        if let Err(e) = self.persist(&inner.jobs) {
            inner.jobs.remove(&id);
            inner.waiters.remove(&id);
            return Err(e.into());
        }
        Ok(())
    }

    /// Undo a `register` that a subsequent step failed to commit
    /// (used by the façade to roll back a `submit` whose queue push failed).
    pub fn remove(&self, id: JobId) -> Result<(), BrokerError> {
        let mut inner = self.inner.lock();
        inner.jobs.remove(&id);
        inner.waiters.remove(&id);
        self.persist(&inner.jobs)?;
        Ok(())
    }

    /// Move `id` to `processing`. A no-op if already processing; an error
    /// if the job is unknown or already terminal.
    pub fn transition_processing(&self, id: JobId) -> Result<(), BrokerError> {
        let mut inner = self.inner.lock();
        let now = self.clock.now_utc();
        {
            let job = inner.jobs.get_mut(&id).ok_or(BrokerError::NotFound(id))?;
            if job.status == JobStatus::Processing {
                return Ok(());
            }
            let from = job.status;
            job.transition(JobStatus::Processing, now).map_err(|_| BrokerError::InvalidTransition {
                job: id,
                from: from.to_string(),
                to: JobStatus::Processing.to_string(),
            })?;
        }
        self.persist(&inner.jobs)?;
        tracing::debug!(job_id = %id.short(8), status = %JobStatus::Processing, "job transitioned");
        Ok(())
    }

    /// Record a terminal result. `error.is_some()` moves the job to
    /// `failed`, otherwise `completed`. A late result for an id that was
    /// never registered creates a new terminal record rather than erroring.
    /// Signals the waiter non-blockingly and deletes its channel entry.
    pub fn submit_result(
        &self,
        id: JobId,
        result: Option<String>,
        error: Option<String>,
    ) -> Result<(), BrokerError> {
        let mut inner = self.inner.lock();
        let now = self.clock.now_utc();
        let next = if error.is_some() { JobStatus::Failed } else { JobStatus::Completed };

        let job = match inner.jobs.get_mut(&id) {
            Some(job) => {
                let from = job.status;
                job.transition(next, now).map_err(|_| BrokerError::InvalidTransition {
                    job: id,
                    from: from.to_string(),
                    to: next.to_string(),
                })?;
                job.result = result;
                job.error = error;
                job.clone()
            }
            None => {
                let mut job = Job::new(id, String::new(), HashMap::new(), now);
                job.status = next;
                job.result = result;
                job.error = error;
                job.completed_at = Some(now);
                inner.jobs.insert(id, job.clone());
                job
            }
        };

        if let Some(waiter) = inner.waiters.remove(&id) {
            // Non-blocking by construction: dropped or not, the terminal
            // state is already in `jobs`, so a subsequent `wait` recovers
            // it via `snapshot` regardless of whether anyone was listening.
            let _ = waiter.sender.send(job);
        }
        self.persist(&inner.jobs)?;
        tracing::info!(job_id = %id, status = %next, "job reached terminal state");
        Ok(())
    }

    /// Await completion of `id`. Returns immediately with a snapshot if
    /// the job is already terminal; otherwise suspends on the waiter
    /// channel (no lock held while suspended) until a terminal record
    /// arrives or `timeout` elapses.
    pub async fn wait(&self, id: JobId, timeout: Option<Duration>) -> Result<Job, BrokerError> {
        let receiver = {
            let mut inner = self.inner.lock();
            match inner.jobs.get(&id) {
                None => return Err(BrokerError::NotFound(id)),
                Some(job) if job.status.is_terminal() => return Ok(job.clone()),
                Some(_) => {}
            }
            inner.waiters.get_mut(&id).and_then(|w| w.receiver.take())
        };

        match receiver {
            Some(rx) => self.await_receiver(id, rx, timeout).await,
            // No receiver left (already consumed by a concurrent waiter) —
            // fall back to polling the authoritative status map.
            None => self.poll_until_terminal(id, timeout).await,
        }
    }

    async fn await_receiver(
        &self,
        id: JobId,
        rx: oneshot::Receiver<Job>,
        timeout: Option<Duration>,
    ) -> Result<Job, BrokerError> {
        match timeout {
            Some(d) => match tokio::time::timeout(d, rx).await {
                Ok(Ok(job)) => Ok(job),
                Ok(Err(_)) => self.snapshot(id),
                Err(_) => Err(BrokerError::Timeout(id)),
            },
            None => match rx.await {
                Ok(job) => Ok(job),
                Err(_) => self.snapshot(id),
            },
        }
    }

    async fn poll_until_terminal(&self, id: JobId, timeout: Option<Duration>) -> Result<Job, BrokerError> {
        let deadline = timeout.map(|d| tokio::time::Instant::now() + d);
        loop {
            if let Ok(job) = self.snapshot(id) {
                if job.status.is_terminal() {
                    return Ok(job);
                }
            }
            if let Some(deadline) = deadline {
                if tokio::time::Instant::now() >= deadline {
                    return Err(BrokerError::Timeout(id));
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// Returns a copy of `id`'s current record, or `NotFound`.
    pub fn snapshot(&self, id: JobId) -> Result<Job, BrokerError> {
        self.inner.lock().jobs.get(&id).cloned().ok_or(BrokerError::NotFound(id))
    }

    /// Partition the status map by status field, observed atomically.
    pub fn counts(&self) -> Counts {
        let inner = self.inner.lock();
        let mut counts = Counts { total: inner.jobs.len(), ..Counts::default() };
        for job in inner.jobs.values() {
            match job.status {
                JobStatus::Pending => counts.pending += 1,
                JobStatus::Processing => counts.processing += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
                JobStatus::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }

    /// Cancel the waiters of `ids` (used by `clear_queue` for jobs that were
    /// drained from the pending queue). Jobs move to `cancelled` but remain
    /// in the status map; only their waiter is notified and removed.
    pub fn cancel(&self, ids: &[JobId]) -> Result<(), BrokerError> {
        let mut inner = self.inner.lock();
        let now = self.clock.now_utc();
        for id in ids {
            if let Some(job) = inner.jobs.get_mut(id) {
                job.error = Some(CLEARED_BY_ADMIN.to_string());
                let _ = job.transition(JobStatus::Cancelled, now);
            }
            if let Some(waiter) = inner.waiters.remove(id) {
                if let Some(job) = inner.jobs.get(id) {
                    let _ = waiter.sender.send(job.clone());
                }
            }
            tracing::info!(job_id = %id, "job cancelled by administrative clear");
        }
        self.persist(&inner.jobs)?;
        Ok(())
    }

    /// Empty the status map and waiter registry, delivering an explicit
    /// `Cancelled` terminal record to every live waiter first.
    pub fn clear(&self) -> Result<(), BrokerError> {
        let mut inner = self.inner.lock();
        let now = self.clock.now_utc();
        for (id, waiter) in inner.waiters.drain() {
            if let Some(job) = inner.jobs.get(&id) {
                let mut cancelled = job.clone();
                cancelled.error = Some(CLEARED_BY_ADMIN.to_string());
                let _ = cancelled.transition(JobStatus::Cancelled, now);
                let _ = waiter.sender.send(cancelled);
            }
        }
        let cleared = inner.jobs.len();
        inner.jobs.clear();
        self.persist(&inner.jobs)?;
        tracing::info!(cleared, "status map cleared");
        Ok(())
    }

    fn persist(&self, jobs: &HashMap<JobId, Job>) -> Result<(), StorageError> {
        self.storage.save_status(jobs)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
