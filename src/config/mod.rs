// ABOUTME: Configuration management module for server settings
// ABOUTME: Re-exports the environment-driven ServerConfig and its sections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

//! Configuration module for the Kinetic Edge server
//!
//! All settings come from environment variables; the binary's CLI flags may
//! override the bind address afterwards.

/// Environment and server configuration
pub mod environment;

pub use environment::{
    AuthConfig, CorsConfig, DatabaseConfig, LlmConfig, PromptPaths, ServerConfig,
};
