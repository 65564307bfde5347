// ABOUTME: Database operations for weekly diet and workout plans
// ABOUTME: Plan insertion, current-plan lookup, and completed-item toggling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

use chrono::{NaiveDate, Utc};
use kinetic_core::errors::{AppError, AppResult};
use kinetic_core::models::{CompletedItems, PlanKind, PlanRecord, WeeklyPlan};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{parse_db_timestamp, parse_db_uuid, to_db_timestamp};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Weekly plan storage; diet and workout plans live in separate tables
pub struct PlanManager {
    pool: SqlitePool,
}

impl PlanManager {
    /// Create a new plan manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a freshly generated plan with no completed items
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn insert(
        &self,
        user_id: Uuid,
        kind: PlanKind,
        week_start_date: NaiveDate,
        plan: WeeklyPlan,
    ) -> AppResult<PlanRecord> {
        let record = PlanRecord {
            id: Uuid::new_v4(),
            user_id,
            kind,
            week_start_date,
            plan,
            completed_items: CompletedItems::default(),
            created_at: Utc::now(),
        };
        let plan_json = serde_json::to_string(&record.plan)?;

        let sql = format!(
            r"
            INSERT INTO {} (id, user_id, week_start_date, plan_data, completed_items, created_at)
            VALUES ($1, $2, $3, $4, '{{}}', $5)
            ",
            kind.table()
        );
        sqlx::query(&sql)
            .bind(record.id.to_string())
            .bind(user_id.to_string())
            .bind(week_start_date.format(DATE_FORMAT).to_string())
            .bind(plan_json)
            .bind(to_db_timestamp(&record.created_at))
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to insert {kind} plan: {e}")))?;

        Ok(record)
    }

    /// Newest plan whose week started on or after `window_start`
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or a stored row is corrupt
    pub async fn current(
        &self,
        user_id: Uuid,
        kind: PlanKind,
        window_start: NaiveDate,
    ) -> AppResult<Option<PlanRecord>> {
        let sql = format!(
            r"
            SELECT id, user_id, week_start_date, plan_data, completed_items, created_at
            FROM {}
            WHERE user_id = $1 AND week_start_date >= $2
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            ",
            kind.table()
        );
        let row = sqlx::query(&sql)
            .bind(user_id.to_string())
            .bind(window_start.format(DATE_FORMAT).to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get current {kind} plan: {e}")))?;

        row.as_ref().map(|r| row_to_plan(r, kind)).transpose()
    }

    /// Number of stored plans of a kind for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn count(&self, user_id: Uuid, kind: PlanKind) -> AppResult<i64> {
        let sql = format!("SELECT COUNT(*) AS n FROM {} WHERE user_id = $1", kind.table());
        let row = sqlx::query(&sql)
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count {kind} plans: {e}")))?;
        Ok(row.get("n"))
    }

    /// Flip one completed-item flag on a plan the user owns.
    ///
    /// Read and write happen in one transaction. Returns `None` when the plan
    /// does not exist or belongs to someone else.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn toggle_item(
        &self,
        user_id: Uuid,
        kind: PlanKind,
        plan_id: Uuid,
        item_key: &str,
    ) -> AppResult<Option<(bool, CompletedItems)>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let select = format!(
            "SELECT completed_items FROM {} WHERE id = $1 AND user_id = $2",
            kind.table()
        );
        let row = sqlx::query(&select)
            .bind(plan_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to load {kind} plan: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: String = row.get("completed_items");
        let mut completed = parse_completed(&raw)?;
        let value = completed.toggle(item_key);

        let update = format!(
            "UPDATE {} SET completed_items = $1 WHERE id = $2 AND user_id = $3",
            kind.table()
        );
        sqlx::query(&update)
            .bind(serde_json::to_string(&completed)?)
            .bind(plan_id.to_string())
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to update {kind} plan: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit toggle: {e}")))?;

        Ok(Some((value, completed)))
    }
}

fn parse_completed(raw: &str) -> AppResult<CompletedItems> {
    if raw.trim().is_empty() {
        return Ok(CompletedItems::default());
    }
    serde_json::from_str(raw)
        .map_err(|e| AppError::database(format!("Corrupt completed_items column: {e}")))
}

fn row_to_plan(row: &SqliteRow, kind: PlanKind) -> AppResult<PlanRecord> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let week: String = row.get("week_start_date");
    let plan_data: String = row.get("plan_data");
    let completed: String = row.get("completed_items");
    let created_at: String = row.get("created_at");

    Ok(PlanRecord {
        id: parse_db_uuid(&id)?,
        user_id: parse_db_uuid(&user_id)?,
        kind,
        week_start_date: NaiveDate::parse_from_str(&week, DATE_FORMAT)
            .map_err(|e| AppError::database(format!("Invalid week_start_date '{week}': {e}")))?,
        plan: serde_json::from_str(&plan_data)
            .map_err(|e| AppError::database(format!("Corrupt plan_data column: {e}")))?,
        completed_items: parse_completed(&completed)?,
        created_at: parse_db_timestamp(&created_at)?,
    })
}
