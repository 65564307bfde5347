// ABOUTME: Database operations for BMI measurements
// ABOUTME: Recording readings and listing them for the calculator, dashboard, and charts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

use kinetic_core::errors::{AppError, AppResult};
use kinetic_core::models::BmiRecord;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{parse_db_timestamp, parse_db_uuid, to_db_timestamp};

/// BMI measurement storage
pub struct BmiManager {
    pool: SqlitePool,
}

impl BmiManager {
    /// Create a new BMI manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a measurement
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn insert(&self, record: &BmiRecord) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO bmi_records (id, user_id, weight, height, bmi, category, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .bind(record.weight)
        .bind(record.height)
        .bind(record.bmi)
        .bind(&record.category)
        .bind(to_db_timestamp(&record.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert BMI record: {e}")))?;
        Ok(())
    }

    /// Most recent measurement, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn latest(&self, user_id: Uuid) -> AppResult<Option<BmiRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, weight, height, bmi, category, created_at
            FROM bmi_records
            WHERE user_id = $1
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get latest BMI record: {e}")))?;

        row.as_ref().map(row_to_record).transpose()
    }

    /// Every measurement, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_newest_first(&self, user_id: Uuid) -> AppResult<Vec<BmiRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, weight, height, bmi, category, created_at
            FROM bmi_records
            WHERE user_id = $1
            ORDER BY created_at DESC, rowid DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list BMI records: {e}")))?;

        rows.iter().map(row_to_record).collect()
    }

    /// Every measurement, oldest first, as used for charts
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_oldest_first(&self, user_id: Uuid) -> AppResult<Vec<BmiRecord>> {
        let mut records = self.list_newest_first(user_id).await?;
        records.reverse();
        Ok(records)
    }
}

fn row_to_record(row: &SqliteRow) -> AppResult<BmiRecord> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let created_at: String = row.get("created_at");
    Ok(BmiRecord {
        id: parse_db_uuid(&id)?,
        user_id: parse_db_uuid(&user_id)?,
        weight: row.get("weight"),
        height: row.get("height"),
        bmi: row.get("bmi"),
        category: row.get("category"),
        created_at: parse_db_timestamp(&created_at)?,
    })
}
