// ABOUTME: Centralized resource container shared by every route group
// ABOUTME: Holds the database, auth manager, language model provider, and services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

//! # Server Resources
//!
//! Built once at startup and handed to each router as `Arc<ServerResources>`.

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::llm::prompts::CoachPrompts;
use crate::llm::LlmProvider;
use crate::services::{CoachChat, PlanGenerator};

/// Shared server resources
#[derive(Clone)]
pub struct ServerResources {
    pub database: Database,
    pub auth_manager: Arc<AuthManager>,
    pub llm_provider: Arc<dyn LlmProvider>,
    pub plan_generator: Arc<PlanGenerator>,
    pub coach_chat: Arc<CoachChat>,
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Wire up the services around one database and one provider
    #[must_use]
    pub fn new(
        database: Database,
        auth_manager: AuthManager,
        llm_provider: Arc<dyn LlmProvider>,
        prompts: CoachPrompts,
        config: Arc<ServerConfig>,
    ) -> Self {
        let plan_generator = Arc::new(PlanGenerator::new(
            database.clone(),
            Arc::clone(&llm_provider),
            prompts,
        ));
        let coach_chat = Arc::new(CoachChat::new(database.clone(), Arc::clone(&llm_provider)));

        Self {
            database,
            auth_manager: Arc::new(auth_manager),
            llm_provider,
            plan_generator,
            coach_chat,
            config,
        }
    }
}
