// ABOUTME: Domain models shared by the database, services, and HTTP layers
// ABOUTME: Re-exports the BMI, preference, plan, chat, social, and user types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

/// BMI arithmetic, categories, and chart data
pub mod bmi;
/// Coach chat exchanges
pub mod chat;
/// Weekly plans and completion tracking
pub mod plan;
/// User profile preferences
pub mod preferences;
/// Friend connections
pub mod social;
/// User accounts
pub mod user;

pub use bmi::{calculate_bmi, BmiCategory, BmiCategoryInfo, BmiRecord, BmiTip, ChartData};
pub use chat::ChatExchange;
pub use plan::{CompletedItems, PlanKind, PlanRecord, WeeklyPlan};
pub use preferences::{calorie_hint, Goal, NumericInput, PreferencesUpdate, UserPreferences};
pub use social::{FriendConnection, FriendStatus, FriendSummary, PendingRequests};
pub use user::{User, UserProfile};
