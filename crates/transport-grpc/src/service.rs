// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `WorkerService` implementation: `RequestJob`, `CompleteJob`, `FailJob`.

use crate::conversions::job_to_proto;
use crate::proto::worker_service_server::WorkerService;
use crate::proto::{CompleteResponse, Empty, Job, JobFailure, JobResult};
use relayq_broker::Broker;
use relayq_core::{BrokerError, JobId};
use std::sync::Arc;
use tonic::{Request, Response, Status};

pub struct WorkerServiceImpl {
    broker: Arc<Broker>,
}

impl WorkerServiceImpl {
    pub fn new(broker: Arc<Broker>) -> Self {
        Self { broker }
    }
}

fn broker_err_to_status(e: BrokerError) -> Status {
    match e {
        BrokerError::NotFound(_) => Status::not_found(e.to_string()),
        BrokerError::JobExists(_) => Status::already_exists(e.to_string()),
        BrokerError::Timeout(_) => Status::deadline_exceeded(e.to_string()),
        BrokerError::InvalidTransition { .. } => Status::failed_precondition(e.to_string()),
        BrokerError::InvalidInput(_) => Status::invalid_argument(e.to_string()),
        BrokerError::Storage(_) | BrokerError::LockHeld => Status::internal(e.to_string()),
    }
}

fn parse_job_id(raw: &str) -> Result<JobId, Status> {
    JobId::parse(raw).map_err(|_| Status::invalid_argument(format!("invalid job id: {raw}")))
}

#[tonic::async_trait]
impl WorkerService for WorkerServiceImpl {
    async fn request_job(&self, _request: Request<Empty>) -> Result<Response<Job>, Status> {
        match self.broker.poll().map_err(broker_err_to_status)? {
            Some(job) => {
                tracing::debug!(job_id = %job.id.short(8), "job dispatched to worker");
                Ok(Response::new(job_to_proto(&job)))
            }
            // "no job available" is distinct from a transport error.
            None => Err(Status::not_found("no job available")),
        }
    }

    async fn complete_job(
        &self,
        request: Request<JobResult>,
    ) -> Result<Response<CompleteResponse>, Status> {
        let req = request.into_inner();
        let id = parse_job_id(&req.job_id)?;
        self.broker.complete(id, req.result).map_err(broker_err_to_status)?;
        tracing::debug!(job_id = %id, "worker reported job complete");
        Ok(Response::new(CompleteResponse { job_id: id.to_string() }))
    }

    async fn fail_job(
        &self,
        request: Request<JobFailure>,
    ) -> Result<Response<CompleteResponse>, Status> {
        let req = request.into_inner();
        let id = parse_job_id(&req.job_id)?;
        self.broker.fail(id, req.error).map_err(broker_err_to_status)?;
        tracing::debug!(job_id = %id, "worker reported job failure");
        Ok(Response::new(CompleteResponse { job_id: id.to_string() }))
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
