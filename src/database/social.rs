// ABOUTME: Database operations for friend connections
// ABOUTME: Request lifecycle plus friend and pending-request listings joined with usernames
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

use chrono::Utc;
use kinetic_core::errors::{AppError, AppResult};
use kinetic_core::models::{FriendConnection, FriendStatus, FriendSummary};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{parse_db_timestamp, parse_db_uuid, to_db_timestamp};

/// Friend connection storage
pub struct SocialManager {
    pool: SqlitePool,
}

impl SocialManager {
    /// Create a new social manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a new connection
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the pair is already connected in
    /// either direction, or a database error
    pub async fn create_friend_connection(&self, connection: &FriendConnection) -> AppResult<Uuid> {
        let result = sqlx::query(
            r"
            INSERT INTO friend_connections (id, initiator_id, receiver_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(connection.id.to_string())
        .bind(connection.initiator_id.to_string())
        .bind(connection.receiver_id.to_string())
        .bind(connection.status.as_str())
        .bind(to_db_timestamp(&connection.created_at))
        .bind(to_db_timestamp(&connection.updated_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(connection.id),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                AppError::already_exists("A friend request between you is already pending"),
            ),
            Err(e) => Err(AppError::database(format!(
                "Failed to create friend connection: {e}"
            ))),
        }
    }

    /// Get a connection by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_friend_connection(&self, id: Uuid) -> AppResult<Option<FriendConnection>> {
        let row = sqlx::query(
            r"
            SELECT id, initiator_id, receiver_id, status, created_at, updated_at
            FROM friend_connections
            WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get friend connection: {e}")))?;

        row.as_ref().map(row_to_friend_connection).transpose()
    }

    /// Connection between two users in either direction
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_friend_connection_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> AppResult<Option<FriendConnection>> {
        let row = sqlx::query(
            r"
            SELECT id, initiator_id, receiver_id, status, created_at, updated_at
            FROM friend_connections
            WHERE (initiator_id = $1 AND receiver_id = $2)
               OR (initiator_id = $2 AND receiver_id = $1)
            ",
        )
        .bind(user_a.to_string())
        .bind(user_b.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get friend connection: {e}")))?;

        row.as_ref().map(row_to_friend_connection).transpose()
    }

    /// Whether an accepted connection exists between two users
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn are_friends(&self, user_a: Uuid, user_b: Uuid) -> AppResult<bool> {
        Ok(self
            .get_friend_connection_between(user_a, user_b)
            .await?
            .is_some_and(|c| c.status.is_connected()))
    }

    /// Change a connection's status
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn update_friend_connection_status(
        &self,
        id: Uuid,
        status: FriendStatus,
    ) -> AppResult<()> {
        sqlx::query("UPDATE friend_connections SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(status.as_str())
            .bind(to_db_timestamp(&Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to update friend connection: {e}"))
            })?;
        Ok(())
    }

    /// Turn a declined connection back into a pending request from `initiator_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn reopen_friend_connection(
        &self,
        id: Uuid,
        initiator_id: Uuid,
        receiver_id: Uuid,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE friend_connections
            SET initiator_id = $1, receiver_id = $2, status = 'pending', updated_at = $3
            WHERE id = $4
            ",
        )
        .bind(initiator_id.to_string())
        .bind(receiver_id.to_string())
        .bind(to_db_timestamp(&Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to reopen friend connection: {e}")))?;
        Ok(())
    }

    /// Delete a connection
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete_friend_connection(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM friend_connections WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to delete friend connection: {e}"))
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Accepted connections, seen from `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_friends(&self, user_id: Uuid) -> AppResult<Vec<FriendSummary>> {
        let rows = sqlx::query(
            r"
            SELECT fc.id AS connection_id, u.id AS other_id, u.username, fc.status, fc.created_at
            FROM friend_connections fc
            JOIN users u ON u.id = CASE WHEN fc.initiator_id = $1 THEN fc.receiver_id ELSE fc.initiator_id END
            WHERE (fc.initiator_id = $1 OR fc.receiver_id = $1) AND fc.status = 'accepted'
            ORDER BY u.username ASC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get friends: {e}")))?;

        rows.iter().map(row_to_summary).collect()
    }

    /// Pending requests this user sent
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_sent_requests(&self, user_id: Uuid) -> AppResult<Vec<FriendSummary>> {
        let rows = sqlx::query(
            r"
            SELECT fc.id AS connection_id, u.id AS other_id, u.username, fc.status, fc.created_at
            FROM friend_connections fc
            JOIN users u ON u.id = fc.receiver_id
            WHERE fc.initiator_id = $1 AND fc.status = 'pending'
            ORDER BY fc.created_at DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get sent requests: {e}")))?;

        rows.iter().map(row_to_summary).collect()
    }

    /// Pending requests waiting on this user
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_received_requests(&self, user_id: Uuid) -> AppResult<Vec<FriendSummary>> {
        let rows = sqlx::query(
            r"
            SELECT fc.id AS connection_id, u.id AS other_id, u.username, fc.status, fc.created_at
            FROM friend_connections fc
            JOIN users u ON u.id = fc.initiator_id
            WHERE fc.receiver_id = $1 AND fc.status = 'pending'
            ORDER BY fc.created_at DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get received requests: {e}")))?;

        rows.iter().map(row_to_summary).collect()
    }
}

fn row_to_friend_connection(row: &SqliteRow) -> AppResult<FriendConnection> {
    let id: String = row.get("id");
    let initiator_id: String = row.get("initiator_id");
    let receiver_id: String = row.get("receiver_id");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(FriendConnection {
        id: parse_db_uuid(&id)?,
        initiator_id: parse_db_uuid(&initiator_id)?,
        receiver_id: parse_db_uuid(&receiver_id)?,
        status: status.parse()?,
        created_at: parse_db_timestamp(&created_at)?,
        updated_at: parse_db_timestamp(&updated_at)?,
    })
}

fn row_to_summary(row: &SqliteRow) -> AppResult<FriendSummary> {
    let connection_id: String = row.get("connection_id");
    let other_id: String = row.get("other_id");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");

    Ok(FriendSummary {
        connection_id: parse_db_uuid(&connection_id)?,
        user_id: parse_db_uuid(&other_id)?,
        username: row.get("username"),
        status: status.parse()?,
        created_at: parse_db_timestamp(&created_at)?,
    })
}
