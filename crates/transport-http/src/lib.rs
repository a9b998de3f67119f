// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relayq-http: the JSON HTTP surface over the broker façade.

mod dto;
mod error;
mod routes;

use axum::routing::{delete, get, post};
use axum::Router;
use relayq_broker::Broker;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler: one broker per process.
pub type AppState = Arc<Broker>;

/// Build the router. Every route lives under `/api`, with a tracing span
/// per request (method, path, latency) via `tower_http`'s `TraceLayer`.
pub fn router(broker: AppState) -> Router {
    Router::new()
        .route("/api/submit", post(routes::submit))
        .route("/api/worker/poll", get(routes::poll))
        .route("/api/worker/complete/:id", post(routes::complete))
        .route("/api/worker/fail/:id", post(routes::fail))
        .route("/api/admin/stats", get(routes::stats))
        .route("/api/admin/clear", delete(routes::clear))
        .layer(TraceLayer::new_for_http())
        .with_state(broker)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
