// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relayqd — the broker process: one `Broker` shared between an HTTP surface
//! (submit/admin/worker) and a gRPC worker surface.
//!
//! Reads config from env vars:
//!   BROKER_STORAGE_DIR — persisted state directory (default: ./data)
//!   PORT               — HTTP listen port (default: 3000)
//!   GRPC_PORT          — gRPC listen port (default: 50051)
//!   RUST_LOG           — tracing filter (default: info)

mod env;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use relayq_broker::Broker;
use relayq_grpc::proto::worker_service_server::WorkerServiceServer;
use relayq_grpc::WorkerServiceImpl;
use tokio::net::TcpListener;
use tonic::transport::Server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "relayqd failed to start");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let data_dir = relayq_broker::config::storage_dir();
    let broker = Arc::new(
        Broker::open(&data_dir)
            .with_context(|| format!("opening broker at {}", data_dir.display()))?,
    );
    tracing::info!(data_dir = %data_dir.display(), "broker opened");

    let http_addr = SocketAddr::from(([0, 0, 0, 0], env::http_port()));
    let grpc_addr = SocketAddr::from(([0, 0, 0, 0], env::grpc_port()));

    let http_listener = TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("binding HTTP listener on {http_addr}"))?;
    let http_router = relayq_http::router(Arc::clone(&broker));
    tracing::info!(addr = %http_addr, "HTTP listener bound");

    let grpc_service = WorkerServiceImpl::new(Arc::clone(&broker));
    tracing::info!(addr = %grpc_addr, "gRPC listener bound");

    let http_server = async {
        axum::serve(http_listener, http_router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server error")
    };

    let grpc_server = async {
        Server::builder()
            .add_service(WorkerServiceServer::new(grpc_service))
            .serve_with_shutdown(grpc_addr, shutdown_signal())
            .await
            .context("gRPC server error")
    };

    tokio::try_join!(http_server, grpc_server)?;
    tracing::info!("relayqd shut down cleanly");
    Ok(())
}

/// Resolves once SIGINT or (on unix) SIGTERM arrives, for graceful shutdown
/// of both listeners. The broker's lockfile is released when `Broker` drops
/// at the end of `run`.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
