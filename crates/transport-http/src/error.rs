// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps [`BrokerError`] onto HTTP status codes and JSON error bodies.

use crate::dto::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use relayq_core::BrokerError;

pub struct ApiError(pub BrokerError);

impl From<BrokerError> for ApiError {
    fn from(e: BrokerError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BrokerError::NotFound(_) => StatusCode::NOT_FOUND,
            BrokerError::JobExists(_) => StatusCode::CONFLICT,
            BrokerError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            BrokerError::InvalidTransition { .. } => StatusCode::CONFLICT,
            BrokerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            BrokerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BrokerError::LockHeld => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorResponse { error: self.0.to_string() })).into_response()
    }
}
