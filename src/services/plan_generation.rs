// ABOUTME: Weekly plan generation pipeline and plan completion tracking
// ABOUTME: Gathers user state, prompts the model, validates the plan, and persists it per week
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

//! # Plan generation
//!
//! The pipeline is: gather state, build the user-info JSON, call the model with
//! the coach prompt, extract the first JSON object, require a `"week"` key,
//! then insert a new plan row for the current week. There is no retry and no
//! caching; a failed call or unusable output persists nothing.
//!
//! Generation for one user is serialised so a double submission produces two
//! complete plans one after the other instead of interleaved work.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use kinetic_core::errors::{AppError, AppResult};
use kinetic_core::models::plan::{current_window_start, week_start};
use kinetic_core::models::{calorie_hint, CompletedItems, PlanKind, PlanRecord};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::llm::prompts::CoachPrompts;
use crate::llm::{coach_messages, parse_weekly_plan, ChatRequest, LlmProvider};

/// Goal sent to the workout coach when the user never saved a profile
pub const DEFAULT_WORKOUT_GOAL: &str = "general_fitness";

/// What the model is asked to plan for, plus the history passed alongside it
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInput {
    /// User-info JSON sent as the user message
    pub user_info: Value,
    /// Free-text history passed in the second system message
    pub history: String,
}

/// Generates and stores weekly plans
pub struct PlanGenerator {
    database: Database,
    provider: Arc<dyn LlmProvider>,
    prompts: CoachPrompts,
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl PlanGenerator {
    /// Create a generator
    #[must_use]
    pub fn new(database: Database, provider: Arc<dyn LlmProvider>, prompts: CoachPrompts) -> Self {
        Self {
            database,
            provider,
            prompts,
            locks: DashMap::new(),
        }
    }

    fn user_lock(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // Drops the map entry once no other caller holds or waits on it. The
    // check runs under the shard lock, so `user_lock` cannot hand out a new
    // clone in between.
    fn release_user_lock(&self, user_id: Uuid, lock: Arc<Mutex<()>>) {
        self.locks
            .remove_if(&user_id, |_, entry| Arc::strong_count(entry) == 2);
        drop(lock);
    }

    /// Number of users with a generation in flight or queued
    #[must_use]
    pub fn active_generations(&self) -> usize {
        self.locks.len()
    }

    /// Build the diet coach input. `None` when the user has no BMI reading yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn diet_input(&self, user_id: Uuid) -> AppResult<Option<PlanInput>> {
        let Some(latest) = self.database.bmi().latest(user_id).await? else {
            return Ok(None);
        };
        let prefs = self.database.preferences().get_or_default(user_id).await?;

        let user_info = json!({
            "bmi": latest.bmi,
            "bmi_category": latest.category,
            "goals": prefs.goals.as_str(),
            "target_weight": prefs.target_weight,
            "dietary_preferences": prefs.dietary_preferences,
            "allergies": prefs.allergies,
            "gender": prefs.gender,
            "age": prefs.age,
            "activity_level": prefs.activity_level,
            "previous_history": prefs.previous_history,
            "calorie_range_hint": calorie_hint(&latest.category, prefs.goals),
            "meal_frequency": prefs.meal_frequency,
            "cuisine": prefs.preferred_cuisine,
        });

        Ok(Some(PlanInput {
            user_info,
            history: prefs.previous_history,
        }))
    }

    /// Build the workout coach input. BMI is optional here.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn workout_input(&self, user_id: Uuid) -> AppResult<PlanInput> {
        let prefs = self.database.preferences().get(user_id).await?;
        let latest = self.database.bmi().latest(user_id).await?;

        let (gender, age, activity_level, previous_history, goals) = match prefs {
            Some(p) => (
                p.gender,
                p.age,
                p.activity_level,
                p.previous_history,
                p.goals.as_str().to_owned(),
            ),
            None => (
                String::new(),
                None,
                String::new(),
                String::new(),
                DEFAULT_WORKOUT_GOAL.to_owned(),
            ),
        };

        let user_info = json!({
            "gender": gender,
            "age": age,
            "activity_level": activity_level,
            "previous_history": previous_history,
            "goals": goals,
            "bmi": latest.as_ref().map(|r| r.bmi),
            "bmi_category": latest.as_ref().map_or("", |r| r.category.as_str()),
        });

        Ok(PlanInput {
            user_info,
            history: previous_history,
        })
    }

    /// Generate and store a new plan for the current week.
    ///
    /// Always inserts a new row; the newest row wins on read. Returns `None`
    /// for a diet plan when the user has no BMI reading.
    ///
    /// # Errors
    ///
    /// Returns the provider's error when the model call fails,
    /// `InvalidModelOutput` when the reply has no usable plan, or a database error
    #[instrument(skip(self), fields(user_id = %user_id, kind = %kind))]
    pub async fn generate(
        &self,
        user_id: Uuid,
        kind: PlanKind,
        today: NaiveDate,
    ) -> AppResult<Option<PlanRecord>> {
        let lock = self.user_lock(user_id);
        let result = {
            let _guard = lock.lock().await;
            self.generate_locked(user_id, kind, today).await
        };
        self.release_user_lock(user_id, lock);
        result
    }

    async fn generate_locked(
        &self,
        user_id: Uuid,
        kind: PlanKind,
        today: NaiveDate,
    ) -> AppResult<Option<PlanRecord>> {
        let input = match kind {
            PlanKind::Diet => match self.diet_input(user_id).await? {
                Some(input) => input,
                None => {
                    info!("Diet plan requested without a BMI reading");
                    return Ok(None);
                }
            },
            PlanKind::Workout => self.workout_input(user_id).await?,
        };

        let messages = coach_messages(
            self.prompts.for_kind(kind),
            &input.history,
            &input.user_info.to_string(),
        );
        let response = self
            .provider
            .complete(&ChatRequest::new(messages))
            .await
            .map_err(|e| {
                warn!(error = %e, "Plan generation call failed");
                e
            })?;

        let plan = parse_weekly_plan(&response.content).map_err(|e| {
            warn!(error = %e, "Model returned an unusable plan");
            e
        })?;

        let record = self
            .database
            .plans()
            .insert(user_id, kind, week_start(today), plan)
            .await?;

        info!(plan_id = %record.id, week_start = %record.week_start_date, "Stored new weekly plan");
        Ok(Some(record))
    }
}

/// Newest plan of `kind` whose week started within the last seven days of `today`
///
/// # Errors
///
/// Returns an error if the database operation fails
pub async fn current_plan(
    database: &Database,
    user_id: Uuid,
    kind: PlanKind,
    today: NaiveDate,
) -> AppResult<Option<PlanRecord>> {
    database
        .plans()
        .current(user_id, kind, current_window_start(today))
        .await
}

/// Outcome of a completion toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// New value of the toggled key
    pub completed: bool,
    /// Every tracked key after the toggle
    pub completed_items: CompletedItems,
}

/// Flip one item's completion flag on a plan the user owns
///
/// # Errors
///
/// Returns `InvalidInput` when the plan id or key is absent,
/// `ResourceNotFound` when the plan does not exist or belongs to someone else,
/// or a database error
pub async fn toggle_item(
    database: &Database,
    user_id: Uuid,
    kind: PlanKind,
    plan_id: Option<Uuid>,
    item_key: Option<&str>,
) -> AppResult<ToggleOutcome> {
    let plan_id = plan_id.ok_or_else(|| AppError::invalid_input("Missing plan_id"))?;
    let item_key = item_key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::invalid_input("Missing item_key"))?;

    let (completed, completed_items) = database
        .plans()
        .toggle_item(user_id, kind, plan_id, item_key)
        .await?
        .ok_or_else(|| AppError::not_found("Plan"))?;

    Ok(ToggleOutcome {
        completed,
        completed_items,
    })
}
