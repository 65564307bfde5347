// ABOUTME: HTTP integration tests for friend connections and shared progress
// ABOUTME: Request, accept, decline, re-request, unfriend, and progress visibility rules
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Kinetic Edge Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use axum::Router;
use common::{create_test_resources, create_test_user, ScriptedProvider};
use helpers::axum_test::{AxumTestRequest, AxumTestResponse};
use kinetic_edge::errors::ErrorCode;
use kinetic_edge::models::{FriendConnection, User};
use kinetic_edge::routes::build_router;
use serde_json::{json, Value};

struct SocialTestSetup {
    app: Router,
    alice: (User, String),
    bob: (User, String),
    carol: (User, String),
}

async fn setup_test_environment() -> SocialTestSetup {
    let resources = create_test_resources(ScriptedProvider::new()).await;
    let alice = create_test_user(&resources, "alice").await;
    let bob = create_test_user(&resources, "bob").await;
    let carol = create_test_user(&resources, "carol").await;
    SocialTestSetup {
        app: build_router(resources),
        alice,
        bob,
        carol,
    }
}

async fn send_request(app: &Router, auth: &str, username: &str) -> AxumTestResponse {
    AxumTestRequest::post("/api/friends/requests")
        .header("authorization", auth)
        .json(&json!({ "username": username }))
        .send(app.clone())
        .await
}

async fn post(app: &Router, auth: &str, uri: &str) -> AxumTestResponse {
    AxumTestRequest::post(uri)
        .header("authorization", auth)
        .send(app.clone())
        .await
}

async fn get_json(app: &Router, auth: &str, uri: &str) -> Value {
    AxumTestRequest::get(uri)
        .header("authorization", auth)
        .send(app.clone())
        .await
        .json()
}

#[tokio::test]
async fn test_request_and_accept() {
    let setup = setup_test_environment().await;
    let (alice, alice_auth) = &setup.alice;
    let (bob, bob_auth) = &setup.bob;

    let response = send_request(&setup.app, alice_auth, "bob").await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let connection: Value = response.json();
    assert_eq!(connection["status"], "pending");
    assert_eq!(connection["initiator_id"], alice.id.to_string());
    assert_eq!(connection["receiver_id"], bob.id.to_string());
    let connection_id = connection["id"].as_str().unwrap().to_owned();

    let alice_pending = get_json(&setup.app, alice_auth, "/api/friends/pending").await;
    assert_eq!(alice_pending["sent"].as_array().unwrap().len(), 1);
    assert_eq!(alice_pending["received"].as_array().unwrap().len(), 0);
    let bob_pending = get_json(&setup.app, bob_auth, "/api/friends/pending").await;
    assert_eq!(bob_pending["received"][0]["username"], "alice");

    // The initiator cannot accept their own request
    let response = post(
        &setup.app,
        alice_auth,
        &format!("/api/friends/requests/{connection_id}/accept"),
    )
    .await;
    assert_eq!(response.status(), 403);

    let response = post(
        &setup.app,
        bob_auth,
        &format!("/api/friends/requests/{connection_id}/accept"),
    )
    .await;
    assert_eq!(response.status(), 200);
    let accepted: Value = response.json();
    assert_eq!(accepted["status"], "accepted");

    let alice_friends = get_json(&setup.app, alice_auth, "/api/friends").await;
    assert_eq!(alice_friends["total"], 1);
    assert_eq!(alice_friends["friends"][0]["username"], "bob");
    let bob_friends = get_json(&setup.app, bob_auth, "/api/friends").await;
    assert_eq!(bob_friends["friends"][0]["username"], "alice");

    let response = send_request(&setup.app, bob_auth, "alice").await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn test_request_validation() {
    let setup = setup_test_environment().await;
    let (_, alice_auth) = &setup.alice;

    assert_eq!(send_request(&setup.app, alice_auth, "alice").await.status(), 400);
    assert_eq!(send_request(&setup.app, alice_auth, "").await.status(), 400);
    assert_eq!(send_request(&setup.app, alice_auth, "nobody").await.status(), 404);

    assert_eq!(send_request(&setup.app, alice_auth, "bob").await.status(), 201);
    let duplicate = send_request(&setup.app, alice_auth, "bob").await;
    assert_eq!(duplicate.status(), 409);
    let body: Value = duplicate.json();
    assert_eq!(body["error"]["code"], "RESOURCE_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_friend_progress_visibility() {
    let setup = setup_test_environment().await;
    let (_, alice_auth) = &setup.alice;
    let (bob, bob_auth) = &setup.bob;
    let (_, carol_auth) = &setup.carol;

    AxumTestRequest::post("/api/bmi")
        .header("authorization", bob_auth)
        .json(&json!({"weight": 82.0, "height": 181.0}))
        .send(setup.app.clone())
        .await;

    let progress_uri = format!("/api/friends/{}/progress", bob.id);
    let response = AxumTestRequest::get(&progress_uri)
        .header("authorization", alice_auth)
        .send(setup.app.clone())
        .await;
    assert_eq!(response.status(), 403);
    let body: Value = response.json();
    assert_eq!(
        body["error"]["message"],
        "You can only view progress of your friends"
    );

    let connection: Value = send_request(&setup.app, alice_auth, "bob").await.json();
    let connection_id = connection["id"].as_str().unwrap();

    // Pending is not enough
    let response = AxumTestRequest::get(&progress_uri)
        .header("authorization", alice_auth)
        .send(setup.app.clone())
        .await;
    assert_eq!(response.status(), 403);

    post(
        &setup.app,
        bob_auth,
        &format!("/api/friends/requests/{connection_id}/accept"),
    )
    .await;

    let response = AxumTestRequest::get(&progress_uri)
        .header("authorization", alice_auth)
        .send(setup.app.clone())
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["username"], "bob");
    assert_eq!(body["chart"]["weights"], json!([82.0]));

    let response = AxumTestRequest::get(&progress_uri)
        .header("authorization", carol_auth)
        .send(setup.app.clone())
        .await;
    assert_eq!(response.status(), 403);

    // Your own progress is always visible
    let response = AxumTestRequest::get(&progress_uri)
        .header("authorization", bob_auth)
        .send(setup.app.clone())
        .await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_decline_then_request_again() {
    let setup = setup_test_environment().await;
    let (_, alice_auth) = &setup.alice;
    let (bob, bob_auth) = &setup.bob;

    let connection: Value = send_request(&setup.app, alice_auth, "bob").await.json();
    let connection_id = connection["id"].as_str().unwrap().to_owned();

    let response = post(
        &setup.app,
        bob_auth,
        &format!("/api/friends/requests/{connection_id}/decline"),
    )
    .await;
    assert_eq!(response.status(), 204);

    let pending = get_json(&setup.app, bob_auth, "/api/friends/pending").await;
    assert!(pending["received"].as_array().unwrap().is_empty());

    // Declined requests cannot be accepted afterwards
    let response = post(
        &setup.app,
        bob_auth,
        &format!("/api/friends/requests/{connection_id}/accept"),
    )
    .await;
    assert_eq!(response.status(), 400);

    // Either side may ask again; the row is reopened with the new initiator
    let response = send_request(&setup.app, bob_auth, "alice").await;
    assert_eq!(response.status(), 201);
    let reopened: Value = response.json();
    assert_eq!(reopened["id"], connection_id.as_str());
    assert_eq!(reopened["status"], "pending");
    assert_eq!(reopened["initiator_id"], bob.id.to_string());

    let alice_pending = get_json(&setup.app, alice_auth, "/api/friends/pending").await;
    assert_eq!(alice_pending["received"][0]["username"], "bob");
}

#[tokio::test]
async fn test_unfriend() {
    let setup = setup_test_environment().await;
    let (_, alice_auth) = &setup.alice;
    let (_, bob_auth) = &setup.bob;
    let (_, carol_auth) = &setup.carol;

    let connection: Value = send_request(&setup.app, alice_auth, "bob").await.json();
    let connection_id = connection["id"].as_str().unwrap().to_owned();
    post(
        &setup.app,
        bob_auth,
        &format!("/api/friends/requests/{connection_id}/accept"),
    )
    .await;

    let uri = format!("/api/friends/{connection_id}");
    let response = AxumTestRequest::delete(&uri)
        .header("authorization", carol_auth)
        .send(setup.app.clone())
        .await;
    assert_eq!(response.status(), 403);

    let response = AxumTestRequest::delete(&uri)
        .header("authorization", bob_auth)
        .send(setup.app.clone())
        .await;
    assert_eq!(response.status(), 204);

    let friends = get_json(&setup.app, alice_auth, "/api/friends").await;
    assert_eq!(friends["total"], 0);

    let response = AxumTestRequest::delete(&uri)
        .header("authorization", alice_auth)
        .send(setup.app.clone())
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_concurrent_duplicate_requests_conflict() {
    let setup = setup_test_environment().await;
    let (_, alice_auth) = &setup.alice;
    let (_, bob_auth) = &setup.bob;

    let (first, second) = tokio::join!(
        send_request(&setup.app, alice_auth, "bob"),
        send_request(&setup.app, bob_auth, "alice"),
    );

    let mut statuses = [first.status(), second.status()];
    statuses.sort_unstable();
    assert_eq!(statuses, [201, 409]);
}

#[tokio::test]
async fn test_reverse_pair_insert_maps_to_conflict() {
    let resources = create_test_resources(ScriptedProvider::new()).await;
    let (alice, _) = create_test_user(&resources, "alice").await;
    let (bob, _) = create_test_user(&resources, "bob").await;
    let social = resources.database.social();

    social
        .create_friend_connection(&FriendConnection::new(alice.id, bob.id))
        .await
        .unwrap();
    let err = social
        .create_friend_connection(&FriendConnection::new(bob.id, alice.id))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
}
