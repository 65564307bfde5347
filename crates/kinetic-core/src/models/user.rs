// ABOUTME: User account model
// ABOUTME: Stored account row and its public projection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered account
#[derive(Debug, Clone)]
pub struct User {
    /// User ID
    pub id: Uuid,
    /// Unique login name
    pub username: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl User {
    /// New account with a fresh ID
    #[must_use]
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Account fields safe to return to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    /// User ID
    pub id: Uuid,
    /// Login name
    pub username: String,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            created_at: user.created_at,
        }
    }
}
