// ABOUTME: Core types and constants for the Kinetic Edge health tracker
// ABOUTME: Foundation crate with error handling, constants, and domain models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

#![deny(unsafe_code)]

//! # Kinetic Core
//!
//! Foundation crate shared by the Kinetic Edge server. It holds everything that
//! does not touch I/O so it can be unit tested on its own.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Application-wide constants organized by domain
//! - **models**: BMI, preferences, weekly plans, chat, friends, and users

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants and configuration values organized by domain
pub mod constants;

/// Core data models
pub mod models;
