// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides a scripted model provider plus database, resource, and user helpers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Kinetic Edge Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `kinetic_edge`
//!
//! The [`ScriptedProvider`] stands in for the language model: each call pops
//! the next scripted reply and records the request it was given.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use kinetic_edge::{
    auth::AuthManager,
    config::ServerConfig,
    database::Database,
    errors::AppError,
    llm::{prompts::CoachPrompts, ChatRequest, ChatResponse, LlmProvider},
    models::User,
    resources::ServerResources,
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// One queued model reply
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Return this text as the completion
    Text(String),
    /// Fail the call as an unreachable upstream would
    Fail,
}

/// Model provider that replays queued replies and records every request
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<ChatRequest>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedProvider {
    /// Provider with nothing queued; every call fails
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Provider that answers with `replies` in order
    pub fn with_replies<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::default();
        for reply in replies {
            provider.push(ScriptedReply::Text(reply.into()));
        }
        Arc::new(provider)
    }

    /// Like [`Self::with_replies`], but every call sleeps for `latency` so
    /// concurrent callers can overlap inside the provider
    pub fn slow_with_replies<I, S>(latency: Duration, replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self {
            latency: Some(latency),
            ..Self::default()
        };
        for reply in replies {
            provider.push(ScriptedReply::Text(reply.into()));
        }
        Arc::new(provider)
    }

    /// Queue another reply
    pub fn push(&self, reply: ScriptedReply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    /// Requests seen so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of completed calls
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Highest number of calls that were inside `complete` at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn display_name(&self) -> &'static str {
        "Scripted Test Provider"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let next = self.replies.lock().unwrap().pop_front();

        match next {
            Some(ScriptedReply::Text(content)) => Ok(ChatResponse {
                content,
                model: "scripted-model".to_owned(),
                usage: None,
                finish_reason: Some("stop".to_owned()),
            }),
            Some(ScriptedReply::Fail) | None => Err(AppError::external_service(
                "scripted",
                "No scripted reply available",
            )),
        }
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}

/// A minimal valid weekly plan reply wrapped in prose
pub const VALID_PLAN_REPLY: &str = r#"Here is your plan:
{"week": {"monday": {"breakfast": "Oats", "lunch": "Salad"}, "tuesday": {"breakfast": "Eggs"}}}
Enjoy!"#;

/// Standard test database setup
pub async fn create_test_database() -> Database {
    init_test_logging();
    Database::new("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database")
}

/// Full server resources around a fresh database and the given provider
pub async fn create_test_resources(provider: Arc<ScriptedProvider>) -> Arc<ServerResources> {
    let database = create_test_database().await;
    let config = ServerConfig::for_testing();
    let auth_manager = AuthManager::new(
        config.auth.jwt_secret.as_bytes(),
        config.auth.jwt_expiry_hours,
    );

    Arc::new(ServerResources::new(
        database,
        auth_manager,
        provider,
        CoachPrompts::default(),
        Arc::new(config),
    ))
}

/// Register a user and return it with a ready-to-send `Bearer` header value
pub async fn create_test_user(resources: &ServerResources, username: &str) -> (User, String) {
    let user = resources
        .auth_manager
        .register(&resources.database, username, "password123", "password123")
        .await
        .expect("Failed to register test user");
    let session = resources
        .auth_manager
        .generate_token(&user)
        .expect("Failed to generate test token");

    (user, format!("Bearer {}", session.token))
}
