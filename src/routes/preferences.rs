// ABOUTME: Profile preference route handlers
// ABOUTME: Reads and replaces the diet and fitness profile used by plan generation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use kinetic_core::errors::AppError;
use kinetic_core::models::{PreferencesUpdate, UserPreferences};
use tracing::info;

use crate::resources::ServerResources;
use crate::routes::authenticate;

/// Preference routes
pub struct PreferencesRoutes;

impl PreferencesRoutes {
    /// Create all preference routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/preferences",
                get(Self::handle_get).put(Self::handle_update),
            )
            .with_state(resources)
    }

    /// Handle GET /api/preferences - stored profile, or blanks if never saved
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Json<UserPreferences>, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let prefs = resources
            .database
            .preferences()
            .get_or_default(auth.user_id)
            .await?;
        Ok(Json(prefs))
    }

    /// Handle PUT /api/preferences - validate and replace the whole profile
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(update): Json<PreferencesUpdate>,
    ) -> Result<Json<UserPreferences>, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let prefs = update.validate(auth.user_id)?;
        resources.database.preferences().upsert(&prefs).await?;

        info!(user_id = %auth.user_id, goals = %prefs.goals, "Updated preferences");
        Ok(Json(prefs))
    }
}
