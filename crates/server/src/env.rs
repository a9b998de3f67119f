// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the server binary.

/// HTTP listener port (default 3000).
pub fn http_port() -> u16 {
    std::env::var("PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(3000)
}

/// gRPC listener port (default 50051).
pub fn grpc_port() -> u16 {
    std::env::var("GRPC_PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(50051)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
