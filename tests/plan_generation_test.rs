// ABOUTME: Integration tests for the weekly plan pipeline
// ABOUTME: Input gathering, model call, validation, storage, current-plan window, and toggles
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Kinetic Edge Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use common::{create_test_resources, create_test_user, ScriptedProvider, ScriptedReply, VALID_PLAN_REPLY};
use kinetic_edge::errors::ErrorCode;
use kinetic_edge::llm::{prompts::DIET_COACH_PROMPT, prompts::WORKOUT_COACH_PROMPT, MessageRole};
use kinetic_edge::models::{BmiRecord, Goal, PlanKind, UserPreferences};
use kinetic_edge::services::{current_plan, toggle_item};
use serde_json::Value;

fn wednesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 4).unwrap()
}

#[tokio::test]
async fn test_diet_plan_without_bmi_skips_model() {
    let provider = ScriptedProvider::with_replies([VALID_PLAN_REPLY]);
    let resources = create_test_resources(Arc::clone(&provider)).await;
    let (user, _) = create_test_user(&resources, "dieter").await;

    let result = resources
        .plan_generator
        .generate(user.id, PlanKind::Diet, wednesday())
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(provider.call_count(), 0);
    assert_eq!(
        resources.database.plans().count(user.id, PlanKind::Diet).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_diet_plan_is_generated_and_stored() {
    let provider = ScriptedProvider::with_replies([VALID_PLAN_REPLY]);
    let resources = create_test_resources(Arc::clone(&provider)).await;
    let (user, _) = create_test_user(&resources, "dieter").await;
    resources
        .database
        .bmi()
        .insert(&BmiRecord::measure(user.id, 70.0, 175.0))
        .await
        .unwrap();

    let record = resources
        .plan_generator
        .generate(user.id, PlanKind::Diet, wednesday())
        .await
        .unwrap()
        .expect("plan should be generated");

    assert_eq!(record.user_id, user.id);
    assert_eq!(record.kind, PlanKind::Diet);
    assert_eq!(record.week_start_date, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
    assert_eq!(record.plan.week()["monday"]["breakfast"], "Oats");
    assert!(record.completed_items.is_empty());

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    let messages = &requests[0].messages;
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].role, MessageRole::System);
    assert_eq!(messages[0].content, DIET_COACH_PROMPT);
    assert_eq!(messages[1].role, MessageRole::System);
    assert_eq!(messages[2].role, MessageRole::User);

    let user_info: Value = serde_json::from_str(&messages[2].content).unwrap();
    for key in [
        "bmi",
        "bmi_category",
        "goals",
        "target_weight",
        "dietary_preferences",
        "allergies",
        "gender",
        "age",
        "activity_level",
        "previous_history",
        "calorie_range_hint",
        "meal_frequency",
        "cuisine",
    ] {
        assert!(user_info.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(user_info["bmi"], 22.9);
    assert_eq!(user_info["bmi_category"], "Normal");
    assert_eq!(user_info["goals"], "maintenance");
}

#[tokio::test]
async fn test_diet_input_uses_saved_preferences() {
    let provider = ScriptedProvider::with_replies([VALID_PLAN_REPLY]);
    let resources = create_test_resources(Arc::clone(&provider)).await;
    let (user, _) = create_test_user(&resources, "dieter").await;
    resources
        .database
        .bmi()
        .insert(&BmiRecord::measure(user.id, 90.0, 175.0))
        .await
        .unwrap();

    let mut prefs = UserPreferences::empty(user.id);
    prefs.goals = Goal::WeightLoss;
    prefs.allergies = "peanuts".to_owned();
    prefs.previous_history = "Knee surgery in 2022".to_owned();
    resources.database.preferences().upsert(&prefs).await.unwrap();

    let input = resources
        .plan_generator
        .diet_input(user.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(input.user_info["goals"], "weight_loss");
    assert_eq!(input.user_info["allergies"], "peanuts");
    assert_eq!(input.history, "Knee surgery in 2022");
}

#[tokio::test]
async fn test_invalid_model_output_stores_nothing() {
    let provider = ScriptedProvider::with_replies([r#"{"days": ["monday"]}"#]);
    let resources = create_test_resources(Arc::clone(&provider)).await;
    let (user, _) = create_test_user(&resources, "lifter").await;

    let err = resources
        .plan_generator
        .generate(user.id, PlanKind::Workout, wednesday())
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidModelOutput);
    assert_eq!(
        resources.database.plans().count(user.id, PlanKind::Workout).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_provider_failure_propagates() {
    let provider = ScriptedProvider::new();
    provider.push(ScriptedReply::Fail);
    let resources = create_test_resources(Arc::clone(&provider)).await;
    let (user, _) = create_test_user(&resources, "lifter").await;

    let err = resources
        .plan_generator
        .generate(user.id, PlanKind::Workout, wednesday())
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ExternalServiceError);
    assert_eq!(
        resources.database.plans().count(user.id, PlanKind::Workout).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_workout_plan_defaults_without_profile() {
    let provider = ScriptedProvider::with_replies([VALID_PLAN_REPLY]);
    let resources = create_test_resources(Arc::clone(&provider)).await;
    let (user, _) = create_test_user(&resources, "lifter").await;

    let record = resources
        .plan_generator
        .generate(user.id, PlanKind::Workout, wednesday())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.kind, PlanKind::Workout);

    let messages = &provider.requests()[0].messages;
    assert_eq!(messages[0].content, WORKOUT_COACH_PROMPT);
    let user_info: Value = serde_json::from_str(&messages[2].content).unwrap();
    assert_eq!(user_info["goals"], "general_fitness");
    assert_eq!(user_info["bmi"], Value::Null);
    assert_eq!(user_info["bmi_category"], "");
}

#[tokio::test]
async fn test_current_plan_window() {
    let provider = ScriptedProvider::with_replies([VALID_PLAN_REPLY]);
    let resources = create_test_resources(Arc::clone(&provider)).await;
    let (user, _) = create_test_user(&resources, "lifter").await;

    let record = resources
        .plan_generator
        .generate(user.id, PlanKind::Workout, wednesday())
        .await
        .unwrap()
        .unwrap();

    let db = &resources.database;
    let following_monday = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
    let found = current_plan(db, user.id, PlanKind::Workout, following_monday)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, record.id);

    let following_tuesday = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
    assert!(current_plan(db, user.id, PlanKind::Workout, following_tuesday)
        .await
        .unwrap()
        .is_none());

    assert!(current_plan(db, user.id, PlanKind::Diet, wednesday())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_newest_plan_wins() {
    let provider = ScriptedProvider::with_replies([
        VALID_PLAN_REPLY,
        r#"{"week": {"monday": {"cardio": "Run"}}}"#,
    ]);
    let resources = create_test_resources(Arc::clone(&provider)).await;
    let (user, _) = create_test_user(&resources, "lifter").await;

    for _ in 0..2 {
        resources
            .plan_generator
            .generate(user.id, PlanKind::Workout, wednesday())
            .await
            .unwrap();
    }

    let current = current_plan(&resources.database, user.id, PlanKind::Workout, wednesday())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.plan.week()["monday"]["cardio"], "Run");
    assert_eq!(
        resources.database.plans().count(user.id, PlanKind::Workout).await.unwrap(),
        2
    );
}

#[tokio::test]
async fn test_toggle_item_flips_and_flips_back() {
    let provider = ScriptedProvider::with_replies([VALID_PLAN_REPLY]);
    let resources = create_test_resources(Arc::clone(&provider)).await;
    let (user, _) = create_test_user(&resources, "lifter").await;
    let record = resources
        .plan_generator
        .generate(user.id, PlanKind::Workout, wednesday())
        .await
        .unwrap()
        .unwrap();
    let db = &resources.database;

    let first = toggle_item(db, user.id, PlanKind::Workout, Some(record.id), Some("monday-0"))
        .await
        .unwrap();
    assert!(first.completed);
    assert!(first.completed_items.is_completed("monday-0"));

    let second = toggle_item(db, user.id, PlanKind::Workout, Some(record.id), Some("monday-0"))
        .await
        .unwrap();
    assert!(!second.completed);
    assert!(!second.completed_items.is_completed("monday-0"));

    let stored = current_plan(db, user.id, PlanKind::Workout, wednesday())
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.completed_items.is_completed("monday-0"));
    assert_eq!(stored.completed_items.len(), 1);
}

#[tokio::test]
async fn test_toggle_item_rejects_other_users_and_bad_input() {
    let provider = ScriptedProvider::with_replies([VALID_PLAN_REPLY]);
    let resources = create_test_resources(Arc::clone(&provider)).await;
    let (owner, _) = create_test_user(&resources, "owner").await;
    let (intruder, _) = create_test_user(&resources, "intruder").await;
    let record = resources
        .plan_generator
        .generate(owner.id, PlanKind::Workout, wednesday())
        .await
        .unwrap()
        .unwrap();
    let db = &resources.database;

    let err = toggle_item(db, intruder.id, PlanKind::Workout, Some(record.id), Some("monday-0"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    // Plan ids are per kind
    let err = toggle_item(db, owner.id, PlanKind::Diet, Some(record.id), Some("monday-0"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let err = toggle_item(db, owner.id, PlanKind::Workout, Some(record.id), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = toggle_item(db, owner.id, PlanKind::Workout, Some(record.id), Some(""))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = toggle_item(db, owner.id, PlanKind::Workout, None, Some("monday-0"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn test_concurrent_generation_for_one_user_is_serialized() {
    let provider = ScriptedProvider::slow_with_replies(
        Duration::from_millis(50),
        [VALID_PLAN_REPLY, VALID_PLAN_REPLY],
    );
    let resources = create_test_resources(Arc::clone(&provider)).await;
    let (user, _) = create_test_user(&resources, "lifter").await;

    let generator = Arc::clone(&resources.plan_generator);
    let (a, b) = tokio::join!(
        generator.generate(user.id, PlanKind::Workout, wednesday()),
        generator.generate(user.id, PlanKind::Workout, wednesday()),
    );
    assert!(a.unwrap().is_some());
    assert!(b.unwrap().is_some());

    assert_eq!(provider.call_count(), 2);
    assert_eq!(provider.peak_in_flight(), 1);
    assert_eq!(
        resources.database.plans().count(user.id, PlanKind::Workout).await.unwrap(),
        2
    );
}

#[tokio::test]
async fn test_generation_for_different_users_runs_concurrently() {
    let provider = ScriptedProvider::slow_with_replies(
        Duration::from_millis(50),
        [VALID_PLAN_REPLY, VALID_PLAN_REPLY],
    );
    let resources = create_test_resources(Arc::clone(&provider)).await;
    let (first, _) = create_test_user(&resources, "runner").await;
    let (second, _) = create_test_user(&resources, "swimmer").await;

    let generator = Arc::clone(&resources.plan_generator);
    let (a, b) = tokio::join!(
        generator.generate(first.id, PlanKind::Workout, wednesday()),
        generator.generate(second.id, PlanKind::Workout, wednesday()),
    );
    assert!(a.unwrap().is_some());
    assert!(b.unwrap().is_some());

    assert_eq!(provider.peak_in_flight(), 2);
}

#[tokio::test]
async fn test_generation_lock_is_released_after_use() {
    let provider = ScriptedProvider::with_replies([VALID_PLAN_REPLY, "no plan here"]);
    let resources = create_test_resources(Arc::clone(&provider)).await;
    let (user, _) = create_test_user(&resources, "cyclist").await;
    let generator = &resources.plan_generator;

    generator
        .generate(user.id, PlanKind::Workout, wednesday())
        .await
        .unwrap();
    assert_eq!(generator.active_generations(), 0);

    let err = generator
        .generate(user.id, PlanKind::Workout, wednesday())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidModelOutput);
    assert_eq!(generator.active_generations(), 0);
}
