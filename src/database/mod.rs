// ABOUTME: SQLite database handle, schema creation, and per-table managers
// ABOUTME: Shared row parsing helpers for UUID and timestamp columns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

//! # Database Management
//!
//! One [`Database`] owns the pool. Each table group has a small manager
//! (`UserManager`, `PlanManager`, ...) built on a clone of that pool, in the
//! same way handlers reach them through [`Database`] accessors.

mod bmi;
mod chat;
mod plans;
mod preferences;
mod social;
mod users;

pub use bmi::BmiManager;
pub use chat::ChatManager;
pub use plans::PlanManager;
pub use preferences::PreferencesManager;
pub use social::SocialManager;
pub use users::UserManager;

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use kinetic_core::errors::{AppError, AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// Database handle shared across the server
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to `database_url` and create any missing tables
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the file cannot be created, or
    /// schema creation fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let in_memory = database_url.contains(":memory:");

        if !in_memory {
            ensure_parent_dir(database_url).await?;
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to ":memory:" is a separate database
        let max_connections = if in_memory { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        info!(url = %database_url, "Database ready");
        Ok(db)
    }

    /// Underlying pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Account storage
    #[must_use]
    pub fn users(&self) -> UserManager {
        UserManager::new(self.pool.clone())
    }

    /// BMI measurement storage
    #[must_use]
    pub fn bmi(&self) -> BmiManager {
        BmiManager::new(self.pool.clone())
    }

    /// Profile storage
    #[must_use]
    pub fn preferences(&self) -> PreferencesManager {
        PreferencesManager::new(self.pool.clone())
    }

    /// Weekly plan storage
    #[must_use]
    pub fn plans(&self) -> PlanManager {
        PlanManager::new(self.pool.clone())
    }

    /// Coach chat storage
    #[must_use]
    pub fn chat(&self) -> ChatManager {
        ChatManager::new(self.pool.clone())
    }

    /// Friend connection storage
    #[must_use]
    pub fn social(&self) -> SocialManager {
        SocialManager::new(self.pool.clone())
    }

    /// Create all tables and indexes if they do not exist yet
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to create schema: {e}")))?;
        }
        Ok(())
    }
}

const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS bmi_records (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        weight REAL NOT NULL,
        height REAL NOT NULL,
        bmi REAL NOT NULL,
        category TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_bmi_records_user ON bmi_records(user_id, created_at)",
    r"
    CREATE TABLE IF NOT EXISTS user_preferences (
        user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
        dietary_preferences TEXT NOT NULL DEFAULT '',
        allergies TEXT NOT NULL DEFAULT '',
        goals TEXT NOT NULL DEFAULT 'maintenance',
        target_weight REAL,
        gender TEXT NOT NULL DEFAULT '',
        age INTEGER,
        activity_level TEXT NOT NULL DEFAULT '',
        previous_history TEXT NOT NULL DEFAULT '',
        preferred_cuisine TEXT NOT NULL DEFAULT '',
        meal_frequency TEXT NOT NULL DEFAULT '',
        updated_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS weekly_diet_plans (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        week_start_date TEXT NOT NULL,
        plan_data TEXT NOT NULL,
        completed_items TEXT NOT NULL DEFAULT '{}',
        created_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_diet_plans_user ON weekly_diet_plans(user_id, week_start_date)",
    r"
    CREATE TABLE IF NOT EXISTS weekly_workout_plans (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        week_start_date TEXT NOT NULL,
        plan_data TEXT NOT NULL,
        completed_items TEXT NOT NULL DEFAULT '{}',
        created_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_workout_plans_user ON weekly_workout_plans(user_id, week_start_date)",
    r"
    CREATE TABLE IF NOT EXISTS chat_messages (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        message TEXT NOT NULL,
        response TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_chat_messages_user ON chat_messages(user_id, created_at)",
    r"
    CREATE TABLE IF NOT EXISTS friend_connections (
        id TEXT PRIMARY KEY,
        initiator_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        receiver_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'accepted', 'declined')),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (initiator_id, receiver_id)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_friend_connections_receiver ON friend_connections(receiver_id, status)",
    // One connection per unordered pair
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_friend_connections_pair ON friend_connections(min(initiator_id, receiver_id), max(initiator_id, receiver_id))",
];

async fn ensure_parent_dir(database_url: &str) -> AppResult<()> {
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::config(format!(
                    "Failed to create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
    }
    Ok(())
}

// ============================================================================
// Row helpers
// ============================================================================

/// Timestamp format used for every `*_at` column.
///
/// Fixed-width UTC so lexical order matches time order.
pub(crate) fn to_db_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_db_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid timestamp '{value}': {e}")))
}

pub(crate) fn parse_db_uuid(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| AppError::database(format!("Invalid id '{value}': {e}")))
}
