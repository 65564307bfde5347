// ABOUTME: Friend connection models for sharing progress between users
// ABOUTME: Connection status lifecycle and per-user views of a connection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Status of a friend connection request
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FriendStatus {
    /// Request sent, awaiting a response
    #[default]
    Pending,
    /// Receiver accepted; progress is shared both ways
    Accepted,
    /// Receiver declined; the initiator may ask again
    Declined,
}

impl Display for FriendStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for FriendStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            _ => Err(AppError::invalid_input(format!(
                "Invalid friend status: {s}"
            ))),
        }
    }
}

impl FriendStatus {
    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    /// Whether this status represents an active friendship
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// A directed friend request between two users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendConnection {
    /// Connection ID
    pub id: Uuid,
    /// User who sent the request
    pub initiator_id: Uuid,
    /// User who received the request
    pub receiver_id: Uuid,
    /// Current status
    pub status: FriendStatus,
    /// When the request was first sent
    pub created_at: DateTime<Utc>,
    /// Last status change
    pub updated_at: DateTime<Utc>,
}

impl FriendConnection {
    /// New pending request
    #[must_use]
    pub fn new(initiator_id: Uuid, receiver_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            initiator_id,
            receiver_id,
            status: FriendStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `user_id` is one side of this connection
    #[must_use]
    pub fn involves_user(&self, user_id: Uuid) -> bool {
        self.initiator_id == user_id || self.receiver_id == user_id
    }

    /// The side of the connection that is not `user_id`
    #[must_use]
    pub fn other_user(&self, user_id: Uuid) -> Option<Uuid> {
        if self.initiator_id == user_id {
            Some(self.receiver_id)
        } else if self.receiver_id == user_id {
            Some(self.initiator_id)
        } else {
            None
        }
    }
}

/// A connection as seen by one of its participants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendSummary {
    /// Connection ID
    pub connection_id: Uuid,
    /// The other user
    pub user_id: Uuid,
    /// The other user's name
    pub username: String,
    /// Connection status
    pub status: FriendStatus,
    /// When the request was sent
    pub created_at: DateTime<Utc>,
}

/// Pending requests split by direction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingRequests {
    /// Requests this user sent
    pub sent: Vec<FriendSummary>,
    /// Requests waiting for this user's answer
    pub received: Vec<FriendSummary>,
}
