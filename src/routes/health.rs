// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Liveness plus a reachability probe for the configured language model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tracing::warn;

use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::health_handler))
            .route("/api/llm/status", get(Self::llm_status_handler))
            .with_state(resources)
    }

    async fn health_handler() -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }

    /// Handle GET /api/llm/status - whether the model endpoint answers
    async fn llm_status_handler(State(resources): State<Arc<ServerResources>>) -> Json<Value> {
        let provider = &resources.llm_provider;
        let (available, error) = match provider.health_check().await {
            Ok(ok) => (ok, None),
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "Model health check failed");
                (false, Some(e.message))
            }
        };

        Json(json!({
            "provider": provider.display_name(),
            "model": provider.default_model(),
            "available": available,
            "error": error,
        }))
    }
}
