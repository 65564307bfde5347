// ABOUTME: Weekly diet and workout plan models with completion tracking
// ABOUTME: Plan kinds, validated plan documents, completed-item maps, and week arithmetic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::constants::plans::CURRENT_PLAN_WINDOW_DAYS;
use crate::errors::{AppError, AppResult};

/// Which kind of weekly plan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    /// Meal plan
    Diet,
    /// Exercise plan
    Workout,
}

impl PlanKind {
    /// Path and log representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Diet => "diet",
            Self::Workout => "workout",
        }
    }

    /// Table holding plans of this kind
    #[must_use]
    pub const fn table(&self) -> &'static str {
        match self {
            Self::Diet => "weekly_diet_plans",
            Self::Workout => "weekly_workout_plans",
        }
    }
}

impl Display for PlanKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "diet" | "meal" => Ok(Self::Diet),
            "workout" => Ok(Self::Workout),
            _ => Err(AppError::invalid_input(format!("Invalid plan kind: {s}"))),
        }
    }
}

/// A generated weekly plan document.
///
/// Always a JSON object with a top-level `"week"` key; the rest of the shape
/// is whatever the model produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct WeeklyPlan(Map<String, Value>);

impl WeeklyPlan {
    /// The `"week"` section
    #[must_use]
    pub fn week(&self) -> &Value {
        // Presence is checked on construction
        self.0.get("week").unwrap_or(&Value::Null)
    }
}

impl TryFrom<Value> for WeeklyPlan {
    type Error = AppError;

    fn try_from(value: Value) -> AppResult<Self> {
        match value {
            Value::Object(map) if map.contains_key("week") => Ok(Self(map)),
            Value::Object(_) => Err(AppError::invalid_model_output(
                "Plan is missing the 'week' key",
            )),
            _ => Err(AppError::invalid_model_output("Plan is not a JSON object")),
        }
    }
}

impl From<WeeklyPlan> for Value {
    fn from(plan: WeeklyPlan) -> Self {
        Self::Object(plan.0)
    }
}

/// Sparse map of item key to completion flag.
///
/// Keys are opaque client strings and are not checked against the plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletedItems(BTreeMap<String, bool>);

impl CompletedItems {
    /// Flip the flag for `key` (absent counts as `false`) and return the new value
    pub fn toggle(&mut self, key: &str) -> bool {
        let entry = self.0.entry(key.to_owned()).or_insert(false);
        *entry = !*entry;
        *entry
    }

    /// Current flag for `key`
    #[must_use]
    pub fn is_completed(&self, key: &str) -> bool {
        self.0.get(key).copied().unwrap_or(false)
    }

    /// Number of tracked keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing has been tracked yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A persisted plan row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRecord {
    /// Plan ID
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Diet or workout
    pub kind: PlanKind,
    /// Monday of the week the plan was generated for
    pub week_start_date: NaiveDate,
    /// Plan document
    pub plan: WeeklyPlan,
    /// Completion flags
    pub completed_items: CompletedItems,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Monday of the week containing `date`
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Earliest week start that still counts as current on `today`
#[must_use]
pub fn current_window_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(CURRENT_PLAN_WINDOW_DAYS)
}
