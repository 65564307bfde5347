// ABOUTME: Coach chat exchange model
// ABOUTME: One user message paired with the coach's reply
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored message/reply pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatExchange {
    /// Exchange ID
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// What the user wrote
    pub message: String,
    /// Cleaned coach reply
    pub response: String,
    /// When the exchange happened
    pub created_at: DateTime<Utc>,
}

impl ChatExchange {
    /// New exchange stamped now
    #[must_use]
    pub fn new(user_id: Uuid, message: String, response: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            message,
            response,
            created_at: Utc::now(),
        }
    }
}
