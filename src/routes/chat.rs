// ABOUTME: Coach chat route handlers
// ABOUTME: Lists the conversation and sends new messages to the coach
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use kinetic_core::errors::AppError;
use kinetic_core::models::ChatExchange;
use serde::{Deserialize, Serialize};

use crate::resources::ServerResources;
use crate::routes::authenticate;
use crate::services::ChatReply;

/// Message sent by the user
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SendMessageRequest {
    pub message: String,
}

/// Stored conversation
#[derive(Debug, Serialize)]
pub struct ChatHistoryResponse {
    pub messages: Vec<ChatExchange>,
    pub total: usize,
}

/// Chat routes
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/chat/messages",
                get(Self::get_messages).post(Self::send_message),
            )
            .with_state(resources)
    }

    /// Handle GET /api/chat/messages
    async fn get_messages(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Json<ChatHistoryResponse>, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let messages = resources.coach_chat.history(auth.user_id).await?;
        Ok(Json(ChatHistoryResponse {
            total: messages.len(),
            messages,
        }))
    }

    /// Handle POST /api/chat/messages
    async fn send_message(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<SendMessageRequest>,
    ) -> Result<Json<ChatReply>, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let reply = resources
            .coach_chat
            .send(auth.user_id, &request.message)
            .await?;
        Ok(Json(reply))
    }
}
