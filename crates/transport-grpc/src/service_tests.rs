// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use relayq_core::SystemClock;
use tempfile::tempdir;
use tonic::Code;

fn service(dir: &std::path::Path) -> WorkerServiceImpl {
    let broker = Arc::new(Broker::open_with(dir, SystemClock, relayq_core::UuidIdGen).unwrap());
    WorkerServiceImpl::new(broker)
}

#[tokio::test]
async fn request_job_on_empty_queue_is_not_found() {
    let dir = tempdir().unwrap();
    let svc = service(dir.path());
    let err = svc.request_job(Request::new(Empty {})).await.unwrap_err();
    assert_eq!(err.code(), Code::NotFound);
}

#[tokio::test]
async fn request_job_returns_pending_job_as_processing() {
    let dir = tempdir().unwrap();
    let broker = Arc::new(Broker::open_with(dir.path(), SystemClock, relayq_core::UuidIdGen).unwrap());
    let id = broker.submit("p".into(), Default::default()).unwrap();
    let svc = WorkerServiceImpl::new(broker);

    let response = svc.request_job(Request::new(Empty {})).await.unwrap();
    let job = response.into_inner();
    assert_eq!(job.id, id.to_string());
    assert_eq!(job.status, "processing");
}

#[tokio::test]
async fn complete_job_round_trip() {
    let dir = tempdir().unwrap();
    let broker = Arc::new(Broker::open_with(dir.path(), SystemClock, relayq_core::UuidIdGen).unwrap());
    let id = broker.submit("p".into(), Default::default()).unwrap();
    broker.poll().unwrap();
    let svc = WorkerServiceImpl::new(Arc::clone(&broker));

    let response = svc
        .complete_job(Request::new(JobResult { job_id: id.to_string(), result: "done".into() }))
        .await
        .unwrap();
    assert_eq!(response.into_inner().job_id, id.to_string());
    assert_eq!(broker.snapshot(id).unwrap().result.as_deref(), Some("done"));
}

#[tokio::test]
async fn complete_job_with_malformed_id_is_invalid_argument() {
    let dir = tempdir().unwrap();
    let svc = service(dir.path());
    let err = svc
        .complete_job(Request::new(JobResult { job_id: "not-a-uuid".into(), result: "x".into() }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn fail_job_never_registered_creates_a_late_terminal_record() {
    // submit_result tolerates a missing id: it's a late result for a job
    // the tracker never saw register, not an error.
    let dir = tempdir().unwrap();
    let broker = Arc::new(Broker::open_with(dir.path(), SystemClock, relayq_core::UuidIdGen).unwrap());
    let id = relayq_core::JobId::new();
    let svc = WorkerServiceImpl::new(Arc::clone(&broker));

    let response = svc
        .fail_job(Request::new(JobFailure { job_id: id.to_string(), error: "boom".into() }))
        .await
        .unwrap();
    assert_eq!(response.into_inner().job_id, id.to_string());
    assert_eq!(broker.snapshot(id).unwrap().error.as_deref(), Some("boom"));
}
