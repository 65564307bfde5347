// ABOUTME: Route module organization for the Kinetic Edge JSON API
// ABOUTME: Builds the full router from per-domain route groups and shared middleware
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

//! Route module for Kinetic Edge
//!
//! Each domain module owns its route definitions and thin handlers that
//! delegate to the database managers and service layer. Every handler except
//! health and sign-in authenticates through [`authenticate`].

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::Router;
use kinetic_core::errors::AppError;

use crate::auth::AuthResult;
use crate::middleware::{http_trace_layer, setup_cors};
use crate::resources::ServerResources;

/// Registration, login, logout, and current-user routes
pub mod auth;
/// BMI calculator, dashboard, and progress chart routes
pub mod bmi;
/// Coach chat routes
pub mod chat;
/// Health check and model status routes
pub mod health;
/// Weekly diet and workout plan routes
pub mod plans;
/// Profile preference routes
pub mod preferences;
/// Friend connection and shared progress routes
pub mod social;

pub use auth::AuthRoutes;
pub use bmi::BmiRoutes;
pub use chat::ChatRoutes;
pub use health::HealthRoutes;
pub use plans::PlanRoutes;
pub use preferences::PreferencesRoutes;
pub use social::SocialRoutes;

/// Authenticate a request from its `Authorization` header or session cookie
///
/// # Errors
///
/// Returns an authentication error when credentials are missing or invalid
pub fn authenticate(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> Result<AuthResult, AppError> {
    resources.auth_manager.authenticate_headers(headers)
}

/// Assemble every route group with tracing and CORS layers
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let cors = setup_cors(&resources.config.cors);

    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(AuthRoutes::routes(Arc::clone(&resources)))
        .merge(BmiRoutes::routes(Arc::clone(&resources)))
        .merge(PreferencesRoutes::routes(Arc::clone(&resources)))
        .merge(PlanRoutes::routes(Arc::clone(&resources)))
        .merge(ChatRoutes::routes(Arc::clone(&resources)))
        .merge(SocialRoutes::routes(resources))
        .layer(http_trace_layer())
        .layer(cors)
}
