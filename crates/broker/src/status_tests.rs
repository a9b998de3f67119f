// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use relayq_core::FakeClock;
use std::sync::Arc;
use tempfile::tempdir;

fn tracker(dir: &std::path::Path) -> StatusTracker<FakeClock> {
    StatusTracker::load(Storage::new(dir), FakeClock::new()).unwrap()
}

#[test]
fn register_then_duplicate_is_job_exists() {
    let dir = tempdir().unwrap();
    let tracker = tracker(dir.path());
    let job = Job::builder().build();
    tracker.register(job.clone()).unwrap();
    assert!(matches!(tracker.register(job), Err(BrokerError::JobExists(_))));
}

#[test]
fn transition_processing_unknown_job_is_not_found() {
    let dir = tempdir().unwrap();
    let tracker = tracker(dir.path());
    assert!(matches!(tracker.transition_processing(JobId::new()), Err(BrokerError::NotFound(_))));
}

#[test]
fn transition_processing_is_idempotent() {
    let dir = tempdir().unwrap();
    let tracker = tracker(dir.path());
    let job = Job::builder().build();
    tracker.register(job.clone()).unwrap();
    tracker.transition_processing(job.id).unwrap();
    tracker.transition_processing(job.id).unwrap();
    assert_eq!(tracker.snapshot(job.id).unwrap().status, JobStatus::Processing);
}

#[test]
fn transition_processing_rejects_terminal_job() {
    let dir = tempdir().unwrap();
    let tracker = tracker(dir.path());
    let job = Job::builder().build();
    tracker.register(job.clone()).unwrap();
    tracker.submit_result(job.id, Some("ok".into()), None).unwrap();
    assert!(matches!(
        tracker.transition_processing(job.id),
        Err(BrokerError::InvalidTransition { .. })
    ));
}

#[test]
fn submit_result_without_error_completes() {
    let dir = tempdir().unwrap();
    let tracker = tracker(dir.path());
    let job = Job::builder().build();
    tracker.register(job.clone()).unwrap();
    tracker.submit_result(job.id, Some("done".into()), None).unwrap();
    let snap = tracker.snapshot(job.id).unwrap();
    assert_eq!(snap.status, JobStatus::Completed);
    assert_eq!(snap.result.as_deref(), Some("done"));
    assert!(snap.completed_at.is_some());
}

#[test]
fn submit_result_with_error_fails() {
    let dir = tempdir().unwrap();
    let tracker = tracker(dir.path());
    let job = Job::builder().build();
    tracker.register(job.clone()).unwrap();
    tracker.submit_result(job.id, None, Some("boom".into())).unwrap();
    let snap = tracker.snapshot(job.id).unwrap();
    assert_eq!(snap.status, JobStatus::Failed);
    assert_eq!(snap.error.as_deref(), Some("boom"));
}

#[test]
fn submit_result_twice_is_invalid_transition() {
    let dir = tempdir().unwrap();
    let tracker = tracker(dir.path());
    let job = Job::builder().build();
    tracker.register(job.clone()).unwrap();
    tracker.submit_result(job.id, Some("a".into()), None).unwrap();
    assert!(matches!(
        tracker.submit_result(job.id, Some("b".into()), None),
        Err(BrokerError::InvalidTransition { .. })
    ));
}

#[test]
fn late_result_for_unknown_job_creates_terminal_record() {
    let dir = tempdir().unwrap();
    let tracker = tracker(dir.path());
    let id = JobId::new();
    tracker.submit_result(id, Some("late".into()), None).unwrap();
    let snap = tracker.snapshot(id).unwrap();
    assert_eq!(snap.status, JobStatus::Completed);
    assert_eq!(snap.result.as_deref(), Some("late"));
}

#[tokio::test]
async fn wait_returns_immediately_for_terminal_job() {
    let dir = tempdir().unwrap();
    let tracker = tracker(dir.path());
    let job = Job::builder().build();
    tracker.register(job.clone()).unwrap();
    tracker.submit_result(job.id, Some("x".into()), None).unwrap();

    let result = tracker.wait(job.id, None).await.unwrap();
    assert_eq!(result.status, JobStatus::Completed);
}

#[tokio::test]
async fn wait_unknown_job_is_not_found() {
    let dir = tempdir().unwrap();
    let tracker = tracker(dir.path());
    assert!(matches!(tracker.wait(JobId::new(), None).await, Err(BrokerError::NotFound(_))));
}

#[tokio::test]
async fn wait_times_out_when_no_result_arrives() {
    let dir = tempdir().unwrap();
    let tracker = tracker(dir.path());
    let job = Job::builder().build();
    tracker.register(job.clone()).unwrap();

    let result = tracker.wait(job.id, Some(Duration::from_millis(50))).await;
    assert!(matches!(result, Err(BrokerError::Timeout(_))));
}

#[tokio::test]
async fn wait_wakes_when_worker_completes_concurrently() {
    let dir = tempdir().unwrap();
    let tracker = Arc::new(tracker(dir.path()));
    let job = Job::builder().build();
    tracker.register(job.clone()).unwrap();

    let worker_tracker = Arc::clone(&tracker);
    let job_id = job.id;
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        worker_tracker.submit_result(job_id, Some("worked".into()), None).unwrap();
    });

    let result = tracker.wait(job.id, Some(Duration::from_secs(5))).await.unwrap();
    assert_eq!(result.result.as_deref(), Some("worked"));
}

#[tokio::test]
async fn late_result_after_timeout_is_recoverable_via_snapshot() {
    let dir = tempdir().unwrap();
    let tracker = Arc::new(tracker(dir.path()));
    let job = Job::builder().build();
    tracker.register(job.clone()).unwrap();

    let timed_out = tracker.wait(job.id, Some(Duration::from_millis(20))).await;
    assert!(matches!(timed_out, Err(BrokerError::Timeout(_))));

    tracker.submit_result(job.id, Some("R".into()), None).unwrap();
    let snap = tracker.snapshot(job.id).unwrap();
    assert_eq!(snap.status, JobStatus::Completed);
    assert_eq!(snap.result.as_deref(), Some("R"));
}

#[test]
fn counts_partitions_by_status() {
    let dir = tempdir().unwrap();
    let tracker = tracker(dir.path());
    let pending = Job::builder().build();
    let done = Job::builder().build();
    tracker.register(pending).unwrap();
    tracker.register(done.clone()).unwrap();
    tracker.submit_result(done.id, Some("ok".into()), None).unwrap();

    let counts = tracker.counts();
    assert_eq!(counts.total, 2);
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.completed, 1);
}

#[test]
fn cancel_marks_jobs_cancelled_but_keeps_them_in_status_map() {
    let dir = tempdir().unwrap();
    let tracker = tracker(dir.path());
    let job = Job::builder().build();
    tracker.register(job.clone()).unwrap();

    tracker.cancel(&[job.id]).unwrap();
    let snap = tracker.snapshot(job.id).unwrap();
    assert_eq!(snap.status, JobStatus::Cancelled);
}

#[tokio::test]
async fn clear_delivers_cancelled_record_to_live_waiter() {
    let dir = tempdir().unwrap();
    let tracker = Arc::new(tracker(dir.path()));
    let job = Job::builder().build();
    tracker.register(job.clone()).unwrap();

    let waiter_tracker = Arc::clone(&tracker);
    let job_id = job.id;
    let waiting = tokio::spawn(async move {
        waiter_tracker.wait(job_id, Some(Duration::from_secs(5))).await
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    tracker.clear().unwrap();

    let result = waiting.await.unwrap().unwrap();
    assert_eq!(result.status, JobStatus::Cancelled);
}

#[test]
fn clear_empties_status_map() {
    let dir = tempdir().unwrap();
    let tracker = tracker(dir.path());
    tracker.register(Job::builder().build()).unwrap();
    tracker.register(Job::builder().build()).unwrap();
    tracker.clear().unwrap();
    assert_eq!(tracker.counts().total, 0);
}

#[test]
fn status_persists_across_reload() {
    let dir = tempdir().unwrap();
    let job = Job::builder().build();
    {
        let tracker = tracker(dir.path());
        tracker.register(job.clone()).unwrap();
        tracker.submit_result(job.id, Some("x".into()), None).unwrap();
    }
    let reloaded = tracker(dir.path());
    assert_eq!(reloaded.snapshot(job.id).unwrap().status, JobStatus::Completed);
}

proptest! {
    // counts() must equal the exact partition of the status map by status
    // field, for any mix of pending/completed/failed registrations.
    #[test]
    fn counts_equals_partition_of_status_map(
        n_pending in 0usize..8,
        n_completed in 0usize..8,
        n_failed in 0usize..8,
    ) {
        let dir = tempdir().unwrap();
        let tracker = tracker(dir.path());

        for _ in 0..n_pending {
            tracker.register(Job::builder().build()).unwrap();
        }
        for _ in 0..n_completed {
            let job = Job::builder().build();
            tracker.register(job.clone()).unwrap();
            tracker.submit_result(job.id, Some("ok".into()), None).unwrap();
        }
        for _ in 0..n_failed {
            let job = Job::builder().build();
            tracker.register(job.clone()).unwrap();
            tracker.submit_result(job.id, None, Some("boom".into())).unwrap();
        }

        let counts = tracker.counts();
        prop_assert_eq!(counts.total, n_pending + n_completed + n_failed);
        prop_assert_eq!(counts.pending, n_pending);
        prop_assert_eq!(counts.completed, n_completed);
        prop_assert_eq!(counts.failed, n_failed);
        prop_assert_eq!(counts.processing, 0);
        prop_assert_eq!(counts.cancelled, 0);
    }
}
