// ABOUTME: Database operations for coach chat exchanges
// ABOUTME: Stores message/reply pairs and lists recent history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

use kinetic_core::errors::{AppError, AppResult};
use kinetic_core::models::ChatExchange;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{parse_db_timestamp, parse_db_uuid, to_db_timestamp};

/// Coach chat storage
pub struct ChatManager {
    pool: SqlitePool,
}

impl ChatManager {
    /// Create a new chat manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store one exchange
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn insert(&self, exchange: &ChatExchange) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO chat_messages (id, user_id, message, response, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(exchange.id.to_string())
        .bind(exchange.user_id.to_string())
        .bind(&exchange.message)
        .bind(&exchange.response)
        .bind(to_db_timestamp(&exchange.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to save chat message: {e}")))?;
        Ok(())
    }

    /// The most recent `limit` exchanges, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn recent(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<ChatExchange>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, message, response, created_at
            FROM chat_messages
            WHERE user_id = $1
            ORDER BY created_at DESC, rowid DESC
            LIMIT $2
            ",
        )
        .bind(user_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get chat history: {e}")))?;

        let mut exchanges = rows
            .iter()
            .map(row_to_exchange)
            .collect::<AppResult<Vec<_>>>()?;
        exchanges.reverse();
        Ok(exchanges)
    }

    /// Full history, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<ChatExchange>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, message, response, created_at
            FROM chat_messages
            WHERE user_id = $1
            ORDER BY created_at ASC, rowid ASC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list chat messages: {e}")))?;

        rows.iter().map(row_to_exchange).collect()
    }
}

fn row_to_exchange(row: &SqliteRow) -> AppResult<ChatExchange> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let created_at: String = row.get("created_at");
    Ok(ChatExchange {
        id: parse_db_uuid(&id)?,
        user_id: parse_db_uuid(&user_id)?,
        message: row.get("message"),
        response: row.get("response"),
        created_at: parse_db_timestamp(&created_at)?,
    })
}
