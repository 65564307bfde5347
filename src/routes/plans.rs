// ABOUTME: Weekly diet and workout plan route handlers
// ABOUTME: Current plan lookup, explicit generation, and per-item completion toggling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

//! Plan routes
//!
//! `:kind` is `diet` (alias `meal`) or `workout`. Generation is always
//! explicit: reading a plan never triggers a model call.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use kinetic_core::errors::AppError;
use kinetic_core::models::{CompletedItems, PlanKind, PlanRecord};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resources::ServerResources;
use crate::routes::authenticate;
use crate::services::{current_plan, toggle_item};

/// Current plan lookup response
#[derive(Debug, Serialize)]
pub struct CurrentPlanResponse {
    pub kind: PlanKind,
    pub plan: Option<PlanRecord>,
}

/// Completion toggle request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToggleRequest {
    pub plan_id: Option<String>,
    pub item_key: Option<String>,
}

/// Completion toggle response
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub completed: bool,
    pub completed_items: CompletedItems,
}

/// Plan routes
pub struct PlanRoutes;

impl PlanRoutes {
    /// Create all plan routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/plans/:kind", get(Self::handle_current))
            .route("/api/plans/:kind/generate", post(Self::handle_generate))
            .route("/api/plans/:kind/toggle", post(Self::handle_toggle))
            .with_state(resources)
    }

    /// Handle GET /api/plans/:kind
    async fn handle_current(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(kind): Path<String>,
    ) -> Result<Json<CurrentPlanResponse>, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let kind = PlanKind::from_str(&kind)?;
        let today = Utc::now().date_naive();

        let plan = current_plan(&resources.database, auth.user_id, kind, today).await?;
        Ok(Json(CurrentPlanResponse { kind, plan }))
    }

    /// Handle POST /api/plans/:kind/generate
    async fn handle_generate(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(kind): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let kind = PlanKind::from_str(&kind)?;
        let today = Utc::now().date_naive();

        let record = resources
            .plan_generator
            .generate(auth.user_id, kind, today)
            .await?
            .ok_or_else(|| AppError::invalid_input("No BMI found. Calculate BMI first."))?;

        Ok((StatusCode::CREATED, Json(record)).into_response())
    }

    /// Handle POST /api/plans/:kind/toggle
    async fn handle_toggle(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(kind): Path<String>,
        Json(body): Json<ToggleRequest>,
    ) -> Result<Json<ToggleResponse>, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let kind = PlanKind::from_str(&kind)?;

        let plan_id = body
            .plan_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|_| AppError::invalid_input("Invalid plan_id format"))?;

        let outcome = toggle_item(
            &resources.database,
            auth.user_id,
            kind,
            plan_id,
            body.item_key.as_deref(),
        )
        .await?;

        Ok(Json(ToggleResponse {
            success: true,
            completed: outcome.completed,
            completed_items: outcome.completed_items,
        }))
    }
}
