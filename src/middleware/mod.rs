// ABOUTME: HTTP middleware layers applied to the whole router
// ABOUTME: Cross-origin policy and per-request tracing spans
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

/// CORS configuration
pub mod cors;
/// Request tracing with generated request IDs
pub mod tracing;

pub use self::cors::setup_cors;
pub use self::tracing::http_trace_layer;
