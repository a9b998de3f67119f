// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conversions between the wire `Job` message and the core `Job` type,
//! isolated from the tonic service impl.

use crate::proto;
use relayq_core::Job;

pub fn job_to_proto(job: &Job) -> proto::Job {
    proto::Job {
        id: job.id.to_string(),
        payload: job.payload.clone(),
        headers: job.headers.clone(),
        status: job.status.to_string(),
        result: job.result.clone(),
        error: job.error.clone(),
        created_at: job.created_at.to_rfc3339(),
        updated_at: job.updated_at.to_rfc3339(),
        completed_at: job.completed_at.map(|t| t.to_rfc3339()),
    }
}

#[cfg(test)]
#[path = "conversions_tests.rs"]
mod tests;
