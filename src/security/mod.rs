// ABOUTME: HTTP security helpers shared by the route handlers
// ABOUTME: Session cookie construction, parsing, and clearing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

/// Secure cookie helpers for the session token
pub mod cookies;
