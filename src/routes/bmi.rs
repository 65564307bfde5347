// ABOUTME: BMI calculator, dashboard, and progress chart route handlers
// ABOUTME: Records measurements and shapes history into chart series for the user and friends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use kinetic_core::errors::AppError;
use kinetic_core::models::bmi::validate_measurement;
use kinetic_core::models::{BmiCategory, BmiCategoryInfo, BmiRecord, ChartData, UserProfile};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::resources::ServerResources;
use crate::routes::authenticate;

/// Calculator submission
#[derive(Debug, Clone, Deserialize)]
pub struct BmiRequest {
    /// Weight in kilograms
    pub weight: f64,
    /// Height in centimetres
    pub height: f64,
}

/// A record together with its category description
#[derive(Debug, Serialize)]
pub struct BmiReading {
    #[serde(flatten)]
    pub record: BmiRecord,
    pub category_info: Option<BmiCategoryInfo>,
}

impl From<BmiRecord> for BmiReading {
    fn from(record: BmiRecord) -> Self {
        let category_info = BmiCategory::from_label(&record.category).map(Into::into);
        Self {
            record,
            category_info,
        }
    }
}

/// Calculator page data: every reading, newest first
#[derive(Debug, Serialize)]
pub struct BmiHistoryResponse {
    pub records: Vec<BmiReading>,
    pub total: usize,
}

/// Dashboard data
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user: UserProfile,
    pub latest: Option<BmiReading>,
}

/// One friend's chart
#[derive(Debug, Serialize)]
pub struct FriendChart {
    pub user_id: Uuid,
    pub username: String,
    pub chart: ChartData,
}

/// Progress page data
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub chart: ChartData,
    pub friends: Vec<FriendChart>,
}

/// BMI routes
pub struct BmiRoutes;

impl BmiRoutes {
    /// Create all BMI routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/bmi", get(Self::handle_list).post(Self::handle_record))
            .route("/api/dashboard", get(Self::handle_dashboard))
            .route("/api/progress", get(Self::handle_progress))
            .with_state(resources)
    }

    /// Handle GET /api/bmi
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Json<BmiHistoryResponse>, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let records = resources.database.bmi().list_newest_first(auth.user_id).await?;

        Ok(Json(BmiHistoryResponse {
            total: records.len(),
            records: records.into_iter().map(Into::into).collect(),
        }))
    }

    /// Handle POST /api/bmi
    async fn handle_record(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<BmiRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        validate_measurement(body.weight, body.height)?;

        let record = BmiRecord::measure(auth.user_id, body.weight, body.height);
        resources.database.bmi().insert(&record).await?;
        info!(user_id = %auth.user_id, bmi = record.bmi, category = %record.category, "Recorded BMI");

        Ok((StatusCode::CREATED, Json(BmiReading::from(record))).into_response())
    }

    /// Handle GET /api/dashboard
    async fn handle_dashboard(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Json<DashboardResponse>, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let user = resources
            .database
            .users()
            .get_by_id(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        let latest = resources.database.bmi().latest(auth.user_id).await?;

        Ok(Json(DashboardResponse {
            user: UserProfile::from(&user),
            latest: latest.map(Into::into),
        }))
    }

    /// Handle GET /api/progress - own chart plus every accepted friend's
    async fn handle_progress(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Json<ProgressResponse>, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let bmi = resources.database.bmi();

        let own = bmi.list_oldest_first(auth.user_id).await?;
        let friends = resources.database.social().get_friends(auth.user_id).await?;

        let mut friend_charts = Vec::with_capacity(friends.len());
        for friend in friends {
            let records = bmi.list_oldest_first(friend.user_id).await?;
            friend_charts.push(FriendChart {
                user_id: friend.user_id,
                username: friend.username,
                chart: ChartData::from_records(&records),
            });
        }

        Ok(Json(ProgressResponse {
            chart: ChartData::from_records(&own),
            friends: friend_charts,
        }))
    }
}
