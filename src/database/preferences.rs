// ABOUTME: Database operations for user profile preferences
// ABOUTME: One row per user, replaced wholesale on every save
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

use kinetic_core::errors::{AppError, AppResult};
use kinetic_core::models::{Goal, UserPreferences};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{parse_db_timestamp, to_db_timestamp};

/// Profile storage
pub struct PreferencesManager {
    pool: SqlitePool,
}

impl PreferencesManager {
    /// Create a new preferences manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Saved profile for a user, if they ever saved one
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get(&self, user_id: Uuid) -> AppResult<Option<UserPreferences>> {
        let row = sqlx::query(
            r"
            SELECT dietary_preferences, allergies, goals, target_weight, gender, age,
                   activity_level, previous_history, preferred_cuisine, meal_frequency,
                   updated_at
            FROM user_preferences
            WHERE user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get preferences: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let goals: String = row.get("goals");
        let updated_at: String = row.get("updated_at");
        Ok(Some(UserPreferences {
            user_id,
            dietary_preferences: row.get("dietary_preferences"),
            allergies: row.get("allergies"),
            goals: Goal::parse_lenient(&goals),
            target_weight: row.get("target_weight"),
            gender: row.get("gender"),
            age: row.get("age"),
            activity_level: row.get("activity_level"),
            previous_history: row.get("previous_history"),
            preferred_cuisine: row.get("preferred_cuisine"),
            meal_frequency: row.get("meal_frequency"),
            updated_at: parse_db_timestamp(&updated_at)?,
        }))
    }

    /// Saved profile, or an empty one
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_or_default(&self, user_id: Uuid) -> AppResult<UserPreferences> {
        Ok(self
            .get(user_id)
            .await?
            .unwrap_or_else(|| UserPreferences::empty(user_id)))
    }

    /// Insert or replace the user's profile
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn upsert(&self, prefs: &UserPreferences) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO user_preferences (
                user_id, dietary_preferences, allergies, goals, target_weight, gender, age,
                activity_level, previous_history, preferred_cuisine, meal_frequency, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT(user_id) DO UPDATE SET
                dietary_preferences = excluded.dietary_preferences,
                allergies = excluded.allergies,
                goals = excluded.goals,
                target_weight = excluded.target_weight,
                gender = excluded.gender,
                age = excluded.age,
                activity_level = excluded.activity_level,
                previous_history = excluded.previous_history,
                preferred_cuisine = excluded.preferred_cuisine,
                meal_frequency = excluded.meal_frequency,
                updated_at = excluded.updated_at
            ",
        )
        .bind(prefs.user_id.to_string())
        .bind(&prefs.dietary_preferences)
        .bind(&prefs.allergies)
        .bind(prefs.goals.as_str())
        .bind(prefs.target_weight)
        .bind(&prefs.gender)
        .bind(prefs.age)
        .bind(&prefs.activity_level)
        .bind(&prefs.previous_history)
        .bind(&prefs.preferred_cuisine)
        .bind(&prefs.meal_frequency)
        .bind(to_db_timestamp(&prefs.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to save preferences: {e}")))?;
        Ok(())
    }
}
