// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire types for the JSON HTTP surface. Kept separate from the core
//! `Job` type so the transport can evolve its request/response shapes
//! without touching broker internals.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub payload: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    pub result: String,
}

#[derive(Debug, Deserialize)]
pub struct FailRequest {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct JobIdResponse {
    pub job_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
