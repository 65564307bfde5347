// ABOUTME: HTTP integration tests for weekly diet and workout plans
// ABOUTME: Generation preconditions, model failures, current plan lookup, and item toggles
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Kinetic Edge Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use std::sync::Arc;

use axum::Router;
use common::{create_test_resources, create_test_user, ScriptedProvider, VALID_PLAN_REPLY};
use helpers::axum_test::AxumTestRequest;
use kinetic_edge::routes::build_router;
use serde_json::{json, Value};

async fn setup_test_environment(provider: Arc<ScriptedProvider>) -> (Router, String) {
    let resources = create_test_resources(provider).await;
    let (_, auth) = create_test_user(&resources, "planner").await;
    (build_router(resources), auth)
}

async fn record_bmi(app: &Router, auth: &str) {
    let response = AxumTestRequest::post("/api/bmi")
        .header("authorization", auth)
        .json(&json!({"weight": 70.0, "height": 175.0}))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 201);
}

#[tokio::test]
async fn test_no_plan_before_generation() {
    let provider = ScriptedProvider::new();
    let (app, auth) = setup_test_environment(Arc::clone(&provider)).await;

    let body: Value = AxumTestRequest::get("/api/plans/workout")
        .header("authorization", &auth)
        .send(app)
        .await
        .json();

    assert_eq!(body["kind"], "workout");
    assert!(body["plan"].is_null());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_diet_generation_requires_bmi() {
    let provider = ScriptedProvider::with_replies([VALID_PLAN_REPLY]);
    let (app, auth) = setup_test_environment(Arc::clone(&provider)).await;

    let response = AxumTestRequest::post("/api/plans/diet/generate")
        .header("authorization", &auth)
        .send(app)
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "No BMI found. Calculate BMI first.");
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_generate_then_read_current_plan() {
    let provider = ScriptedProvider::with_replies([VALID_PLAN_REPLY]);
    let (app, auth) = setup_test_environment(Arc::clone(&provider)).await;
    record_bmi(&app, &auth).await;

    let response = AxumTestRequest::post("/api/plans/meal/generate")
        .header("authorization", &auth)
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 201);
    let created: Value = response.json();
    assert_eq!(created["kind"], "diet");
    assert_eq!(created["plan"]["week"]["monday"]["breakfast"], "Oats");
    assert_eq!(created["completed_items"], json!({}));

    let current: Value = AxumTestRequest::get("/api/plans/diet")
        .header("authorization", &auth)
        .send(app)
        .await
        .json();
    assert_eq!(current["plan"]["id"], created["id"]);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_unusable_model_reply_is_bad_gateway() {
    let provider = ScriptedProvider::with_replies(["I'd rather not write a plan today."]);
    let (app, auth) = setup_test_environment(Arc::clone(&provider)).await;

    let response = AxumTestRequest::post("/api/plans/workout/generate")
        .header("authorization", &auth)
        .send(app.clone())
        .await;

    assert_eq!(response.status(), 502);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_MODEL_OUTPUT");

    let current: Value = AxumTestRequest::get("/api/plans/workout")
        .header("authorization", &auth)
        .send(app)
        .await
        .json();
    assert!(current["plan"].is_null());
}

#[tokio::test]
async fn test_model_unavailable_is_reported() {
    let provider = ScriptedProvider::new();
    let (app, auth) = setup_test_environment(provider).await;

    let response = AxumTestRequest::post("/api/plans/workout/generate")
        .header("authorization", &auth)
        .send(app)
        .await;

    assert_eq!(response.status(), 502);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "EXTERNAL_SERVICE_ERROR");
}

#[tokio::test]
async fn test_unknown_plan_kind() {
    let (app, auth) = setup_test_environment(ScriptedProvider::new()).await;

    let response = AxumTestRequest::get("/api/plans/sleep")
        .header("authorization", &auth)
        .send(app)
        .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_toggle_item_round_trip() {
    let provider = ScriptedProvider::with_replies([VALID_PLAN_REPLY]);
    let (app, auth) = setup_test_environment(provider).await;

    let created: Value = AxumTestRequest::post("/api/plans/workout/generate")
        .header("authorization", &auth)
        .send(app.clone())
        .await
        .json();
    let plan_id = created["id"].as_str().unwrap().to_owned();

    let toggle = |app: Router| {
        let auth = auth.clone();
        let plan_id = plan_id.clone();
        async move {
            AxumTestRequest::post("/api/plans/workout/toggle")
                .header("authorization", &auth)
                .json(&json!({"plan_id": plan_id, "item_key": "tuesday-breakfast"}))
                .send(app)
                .await
        }
    };

    let first = toggle(app.clone()).await;
    assert_eq!(first.status(), 200);
    let first: Value = first.json();
    assert_eq!(first["success"], true);
    assert_eq!(first["completed"], true);
    assert_eq!(first["completed_items"]["tuesday-breakfast"], true);

    let second: Value = toggle(app.clone()).await.json();
    assert_eq!(second["completed"], false);

    let current: Value = AxumTestRequest::get("/api/plans/workout")
        .header("authorization", &auth)
        .send(app)
        .await
        .json();
    assert_eq!(current["plan"]["completed_items"]["tuesday-breakfast"], false);
}

#[tokio::test]
async fn test_toggle_validation() {
    let (app, auth) = setup_test_environment(ScriptedProvider::new()).await;

    for (payload, status) in [
        (json!({"item_key": "monday-0"}), 400),
        (json!({"plan_id": "not-a-uuid", "item_key": "monday-0"}), 400),
        (json!({"plan_id": "7f8a4c2e-2b1d-4c1e-9a37-0d2f1b6e5a11"}), 400),
        (
            json!({"plan_id": "7f8a4c2e-2b1d-4c1e-9a37-0d2f1b6e5a11", "item_key": "monday-0"}),
            404,
        ),
    ] {
        let response = AxumTestRequest::post("/api/plans/diet/toggle")
            .header("authorization", &auth)
            .json(&payload)
            .send(app.clone())
            .await;
        assert_eq!(response.status(), status, "payload {payload}");
    }
}
