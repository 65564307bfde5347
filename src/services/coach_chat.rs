// ABOUTME: AI coach chat built on the user's recent conversation and latest BMI
// ABOUTME: Falls back to a fixed apology when the model is unavailable
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

use std::sync::Arc;

use kinetic_core::constants::plans::{CHAT_FALLBACK_REPLY, CHAT_HISTORY_LIMIT};
use kinetic_core::errors::{AppError, AppResult};
use kinetic_core::models::ChatExchange;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::llm::prompts::chat_system_prompt;
use crate::llm::{clean_ai_response, coach_messages, ChatRequest, LlmProvider};

/// Reply returned to the chat client
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatReply {
    /// The message as sent
    pub message: String,
    /// Cleaned coach reply
    pub response: String,
    /// `HH:MM` of the exchange
    pub timestamp: String,
}

/// Render stored exchanges as the history block sent to the coach
#[must_use]
pub fn render_history(exchanges: &[ChatExchange]) -> String {
    exchanges
        .iter()
        .map(|e| {
            format!(
                "User: {}\nAI: {}",
                clean_ai_response(&e.message),
                clean_ai_response(&e.response)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Coach chat service
pub struct CoachChat {
    database: Database,
    provider: Arc<dyn LlmProvider>,
}

impl CoachChat {
    /// Create the service
    #[must_use]
    pub fn new(database: Database, provider: Arc<dyn LlmProvider>) -> Self {
        Self { database, provider }
    }

    /// Answer one message and store the exchange.
    ///
    /// Business rules:
    /// - Blank messages are rejected before anything is stored
    /// - The last ten exchanges are sent back as history, oldest first
    /// - A model failure stores and returns the fallback reply instead of an error
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank message, `ResourceNotFound` when the
    /// user no longer exists, or a database error
    pub async fn send(&self, user_id: Uuid, message: &str) -> AppResult<ChatReply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::invalid_input("Message cannot be empty"));
        }

        let user = self
            .database
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        let latest = self.database.bmi().latest(user_id).await?;
        let recent = self
            .database
            .chat()
            .recent(user_id, CHAT_HISTORY_LIMIT)
            .await?;

        let system_prompt = chat_system_prompt(
            &user.username,
            latest.as_ref().map(|r| (r.bmi, r.category.as_str())),
        );
        let history = render_history(&recent);
        debug!(user_id = %user_id, history_len = recent.len(), "Sending coach chat message");

        let request = ChatRequest::new(coach_messages(&system_prompt, &history, message));
        let response = match self.provider.complete(&request).await {
            Ok(reply) => clean_ai_response(&reply.content),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Coach chat call failed, using fallback reply");
                CHAT_FALLBACK_REPLY.to_owned()
            }
        };

        let exchange = ChatExchange::new(user_id, message.to_owned(), response);
        self.database.chat().insert(&exchange).await?;

        Ok(ChatReply {
            message: exchange.message,
            response: exchange.response,
            timestamp: exchange.created_at.format("%H:%M").to_string(),
        })
    }

    /// Full conversation, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn history(&self, user_id: Uuid) -> AppResult<Vec<ChatExchange>> {
        self.database.chat().list(user_id).await
    }
}
