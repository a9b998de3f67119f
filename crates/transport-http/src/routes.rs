// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handlers for the JSON HTTP surface. Each handler decodes its request,
//! calls exactly one broker operation, and maps the result to a response.

use crate::dto::{CompleteRequest, FailRequest, JobIdResponse, SubmitRequest};
use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use relayq_broker::DEFAULT_SUBMIT_TIMEOUT;
use relayq_core::JobId;
use std::time::Duration;

pub async fn submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let timeout = req.timeout_ms.map(Duration::from_millis).filter(|d| !d.is_zero());
    let job = state
        .submit_and_wait(req.payload, req.headers, Some(timeout.unwrap_or(DEFAULT_SUBMIT_TIMEOUT)))
        .await?;
    Ok(Json(job))
}

pub async fn poll(State(state): State<AppState>) -> Result<axum::response::Response, ApiError> {
    match state.poll()? {
        Some(job) => {
            tracing::debug!(job_id = %job.id.short(8), "job dispatched to worker");
            Ok(Json(job).into_response())
        }
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CompleteRequest>,
) -> Result<Json<JobIdResponse>, ApiError> {
    let id = parse_id(&id)?;
    state.complete(id, req.result)?;
    tracing::debug!(job_id = %id, "worker reported job complete");
    Ok(Json(JobIdResponse { job_id: id.to_string() }))
}

pub async fn fail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<FailRequest>,
) -> Result<Json<JobIdResponse>, ApiError> {
    let id = parse_id(&id)?;
    state.fail(id, req.error)?;
    tracing::debug!(job_id = %id, "worker reported job failure");
    Ok(Json(JobIdResponse { job_id: id.to_string() }))
}

pub async fn stats(State(state): State<AppState>) -> Json<relayq_broker::Counts> {
    Json(state.stats())
}

pub async fn clear(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.clear_queue()?;
    state.clear_status()?;
    tracing::info!("admin clear: queue and status both reset");
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(raw: &str) -> Result<JobId, ApiError> {
    JobId::parse(raw)
        .map_err(|_| ApiError(relayq_core::BrokerError::InvalidInput(format!("invalid job id: {raw}"))))
}
