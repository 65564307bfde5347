// ABOUTME: Route handlers for friend connections and shared progress
// ABOUTME: Requests by username, accept/decline by the receiver, removal by either side
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

//! Social routes
//!
//! Friends can see each other's progress chart once a request is accepted.
//! All endpoints require authentication.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use kinetic_core::errors::AppError;
use kinetic_core::models::{
    ChartData, FriendConnection, FriendStatus, FriendSummary, PendingRequests,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::database::SocialManager;
use crate::resources::ServerResources;
use crate::routes::authenticate;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of a friend request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SendFriendRequestBody {
    /// Username of the person to befriend
    pub username: String,
}

/// Response for listing friends
#[derive(Debug, Serialize)]
pub struct ListFriendsResponse {
    pub friends: Vec<FriendSummary>,
    pub total: usize,
}

/// A friend's progress chart
#[derive(Debug, Serialize)]
pub struct FriendProgressResponse {
    pub user_id: Uuid,
    pub username: String,
    pub chart: ChartData,
}

// ============================================================================
// Routes
// ============================================================================

/// Social routes handler
pub struct SocialRoutes;

impl SocialRoutes {
    /// Create all social routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/friends", get(Self::handle_list_friends))
            .route("/api/friends/pending", get(Self::handle_pending_requests))
            .route("/api/friends/requests", post(Self::handle_send_request))
            .route(
                "/api/friends/requests/:id/accept",
                post(Self::handle_accept_request),
            )
            .route(
                "/api/friends/requests/:id/decline",
                post(Self::handle_decline_request),
            )
            .route("/api/friends/:id", delete(Self::handle_unfriend))
            .route(
                "/api/friends/:id/progress",
                get(Self::handle_friend_progress),
            )
            .with_state(resources)
    }

    fn parse_id(id: &str, what: &str) -> Result<Uuid, AppError> {
        Uuid::parse_str(id).map_err(|_| AppError::invalid_input(format!("Invalid {what} format")))
    }

    /// Load a pending request that `user_id` is allowed to answer
    async fn pending_for_receiver(
        social: &SocialManager,
        connection_id: Uuid,
        user_id: Uuid,
        action: &str,
    ) -> Result<FriendConnection, AppError> {
        let connection = social
            .get_friend_connection(connection_id)
            .await?
            .ok_or_else(|| AppError::not_found("Friend request"))?;

        if connection.receiver_id != user_id {
            return Err(AppError::permission_denied(format!(
                "Only the receiver can {action} a friend request"
            )));
        }

        if connection.status != FriendStatus::Pending {
            return Err(AppError::invalid_input(format!(
                "Cannot {action} request with status: {}",
                connection.status
            )));
        }

        Ok(connection)
    }

    /// Handle GET /api/friends - List accepted friends
    async fn handle_list_friends(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Json<ListFriendsResponse>, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let friends = resources.database.social().get_friends(auth.user_id).await?;

        Ok(Json(ListFriendsResponse {
            total: friends.len(),
            friends,
        }))
    }

    /// Handle GET /api/friends/pending - Sent and received requests
    async fn handle_pending_requests(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Json<PendingRequests>, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let social = resources.database.social();

        Ok(Json(PendingRequests {
            sent: social.get_sent_requests(auth.user_id).await?,
            received: social.get_received_requests(auth.user_id).await?,
        }))
    }

    /// Handle POST /api/friends/requests - Send friend request by username
    async fn handle_send_request(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<SendFriendRequestBody>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let username = body.username.trim();
        if username.is_empty() {
            return Err(AppError::invalid_input("Username is required"));
        }

        let receiver = resources
            .database
            .users()
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        if receiver.id == auth.user_id {
            return Err(AppError::invalid_input(
                "Cannot send friend request to yourself",
            ));
        }

        let social = resources.database.social();
        let connection = match social
            .get_friend_connection_between(auth.user_id, receiver.id)
            .await?
        {
            Some(existing) if existing.status == FriendStatus::Declined => {
                social
                    .reopen_friend_connection(existing.id, auth.user_id, receiver.id)
                    .await?;
                social
                    .get_friend_connection(existing.id)
                    .await?
                    .ok_or_else(|| AppError::internal("Failed to fetch reopened connection"))?
            }
            Some(existing) if existing.status == FriendStatus::Accepted => {
                return Err(AppError::already_exists("You are already friends"));
            }
            Some(_) => {
                return Err(AppError::already_exists(
                    "A friend request between you is already pending",
                ));
            }
            None => {
                let connection = FriendConnection::new(auth.user_id, receiver.id);
                social.create_friend_connection(&connection).await?;
                connection
            }
        };

        info!(
            initiator = %auth.user_id,
            receiver = %receiver.id,
            connection_id = %connection.id,
            "Friend request sent"
        );
        Ok((StatusCode::CREATED, Json(connection)).into_response())
    }

    /// Handle POST /api/friends/requests/:id/accept
    async fn handle_accept_request(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Json<FriendConnection>, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let connection_id = Self::parse_id(&id, "connection ID")?;
        let social = resources.database.social();

        Self::pending_for_receiver(&social, connection_id, auth.user_id, "accept").await?;
        social
            .update_friend_connection_status(connection_id, FriendStatus::Accepted)
            .await?;

        let updated = social
            .get_friend_connection(connection_id)
            .await?
            .ok_or_else(|| AppError::internal("Failed to fetch updated connection"))?;

        info!(connection_id = %connection_id, "Friend request accepted");
        Ok(Json(updated))
    }

    /// Handle POST /api/friends/requests/:id/decline
    async fn handle_decline_request(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<StatusCode, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let connection_id = Self::parse_id(&id, "connection ID")?;
        let social = resources.database.social();

        Self::pending_for_receiver(&social, connection_id, auth.user_id, "decline").await?;
        social
            .update_friend_connection_status(connection_id, FriendStatus::Declined)
            .await?;

        Ok(StatusCode::NO_CONTENT)
    }

    /// Handle DELETE /api/friends/:id - Remove a connection; either side may
    async fn handle_unfriend(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<StatusCode, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let connection_id = Self::parse_id(&id, "connection ID")?;
        let social = resources.database.social();

        let connection = social
            .get_friend_connection(connection_id)
            .await?
            .ok_or_else(|| AppError::not_found("Friend connection"))?;

        if !connection.involves_user(auth.user_id) {
            return Err(AppError::permission_denied(
                "You are not part of this connection",
            ));
        }

        social.delete_friend_connection(connection_id).await?;
        Ok(StatusCode::NO_CONTENT)
    }

    /// Handle GET /api/friends/:id/progress - `:id` is the friend's user ID
    async fn handle_friend_progress(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Json<FriendProgressResponse>, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let friend_id = Self::parse_id(&id, "user ID")?;

        if friend_id != auth.user_id
            && !resources
                .database
                .social()
                .are_friends(auth.user_id, friend_id)
                .await?
        {
            return Err(AppError::permission_denied(
                "You can only view progress of your friends",
            ));
        }

        let friend = resources
            .database
            .users()
            .get_by_id(friend_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        let records = resources.database.bmi().list_oldest_first(friend_id).await?;

        Ok(Json(FriendProgressResponse {
            user_id: friend.id,
            username: friend.username,
            chart: ChartData::from_records(&records),
        }))
    }
}
