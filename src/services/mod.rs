// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Plan generation and coach chat, both driven through the LLM provider trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

//! Domain service layer
//!
//! Business logic that talks to the language model lives here so route handlers
//! stay thin and the rules can be tested against a scripted provider.

/// Coach chat: history rendering, persona prompt, and fallback replies
pub mod coach_chat;

/// Weekly plan generation, current-plan lookup, and completion toggling
pub mod plan_generation;

pub use coach_chat::{ChatReply, CoachChat};
pub use plan_generation::{current_plan, toggle_item, PlanGenerator, ToggleOutcome};
