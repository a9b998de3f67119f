// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relayq-grpc: the worker-facing gRPC surface over the broker façade.
//! Admin/submit operations stay HTTP-only (see `relayq-http`), matching
//! the reference source's worker-only gRPC service.

mod conversions;
mod service;

pub mod proto {
    tonic::include_proto!("worker.v1");
}

pub use service::WorkerServiceImpl;
