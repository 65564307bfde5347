// ABOUTME: User authentication route handlers for registration, login, and logout
// ABOUTME: Issues the session token in the body and as an HttpOnly cookie
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

//! Authentication routes
//!
//! Registration does not sign the user in; clients call login afterwards.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use kinetic_core::errors::AppError;
use kinetic_core::models::UserProfile;
use serde::{Deserialize, Serialize};

use crate::resources::ServerResources;
use crate::routes::authenticate;
use crate::security::cookies::{clear_auth_cookie, set_auth_cookie};

/// User registration request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// User registration response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user: UserProfile,
    pub message: String,
}

/// User login request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// User login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub user: UserProfile,
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/auth/logout", post(Self::handle_logout))
            .route("/api/auth/me", get(Self::handle_me))
            .with_state(resources)
    }

    /// Handle POST /api/auth/register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        let user = resources
            .auth_manager
            .register(
                &resources.database,
                &request.username,
                &request.password,
                &request.confirm_password,
            )
            .await?;

        let response = RegisterResponse {
            user: UserProfile::from(&user),
            message: "Registration successful! Please login.".to_owned(),
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle POST /api/auth/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let (user, session) = resources
            .auth_manager
            .login(&resources.database, &request.username, &request.password)
            .await?;

        let mut headers = HeaderMap::new();
        set_auth_cookie(
            &mut headers,
            &session.token,
            resources.auth_manager.token_lifetime_secs(),
        );

        let response = LoginResponse {
            token: session.token,
            expires_at: session.expires_at.to_rfc3339(),
            user: UserProfile::from(&user),
        };
        Ok((StatusCode::OK, headers, Json(response)).into_response())
    }

    /// Handle POST /api/auth/logout
    async fn handle_logout() -> Response {
        let mut headers = HeaderMap::new();
        clear_auth_cookie(&mut headers);
        (
            StatusCode::OK,
            headers,
            Json(serde_json::json!({ "message": "You have been logged out." })),
        )
            .into_response()
    }

    /// Handle GET /api/auth/me
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Json<UserProfile>, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let user = resources
            .database
            .users()
            .get_by_id(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        Ok(Json(UserProfile::from(&user)))
    }
}
