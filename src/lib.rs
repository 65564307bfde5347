// ABOUTME: Main library entry point for the Kinetic Edge health coaching API
// ABOUTME: BMI tracking, AI weekly diet and workout plans, coach chat, and friend progress sharing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

#![deny(unsafe_code)]

//! # Kinetic Edge
//!
//! A JSON API for personal health tracking:
//!
//! - **BMI**: record measurements, see the latest category with advice, chart history
//! - **Weekly plans**: model-generated diet and workout plans with per-item completion
//! - **Coach chat**: short conversational advice that remembers recent exchanges
//! - **Friends**: share progress charts with accepted connections
//!
//! ## Architecture
//!
//! - **`routes`**: axum route groups, one per domain
//! - **`services`**: plan generation pipeline and coach chat
//! - **`llm`**: provider trait, OpenAI-compatible client, response extraction
//! - **`database`**: `SQLite` managers per table group
//! - **`auth`**: bcrypt passwords and HS256 session tokens
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use kinetic_edge::config::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Kinetic Edge configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Account registration and session tokens
pub mod auth;

/// Environment configuration
pub mod config;

/// `SQLite` persistence
pub mod database;

/// Language model providers, prompts, and response handling
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Router-wide middleware layers
pub mod middleware;

/// Shared server resources
pub mod resources;

/// `HTTP` route groups
pub mod routes;

/// Session cookie helpers
pub mod security;

/// Plan generation and coach chat services
pub mod services;

pub use kinetic_core::{constants, errors, models};
