// ABOUTME: Application-wide constants grouped by domain
// ABOUTME: Limits, defaults, environment variable names, and service identifiers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

//! Constants module
//!
//! Constants are grouped into small domain modules rather than one flat list.

/// Service identifiers used in logs and tokens
pub mod service_names {
    /// Name of the HTTP service
    pub const KINETIC_EDGE_SERVER: &str = "kinetic-edge-server";
    /// Audience claim for session tokens
    pub const SESSION_AUDIENCE: &str = "kinetic-edge-web";
    /// Display name of the AI coach persona
    pub const COACH_PERSONA: &str = "Kinetic Edge";
}

/// Network defaults
pub mod network {
    /// Default bind host
    pub const DEFAULT_HOST: &str = "127.0.0.1";
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 5501;
}

/// Account and session limits
pub mod auth {
    /// Minimum username length
    pub const MIN_USERNAME_LENGTH: usize = 3;
    /// Minimum password length
    pub const MIN_PASSWORD_LENGTH: usize = 8;
    /// Default session lifetime in hours
    pub const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 24;
    /// Cookie carrying the session token
    pub const SESSION_COOKIE: &str = "auth_token";
}

/// Profile validation limits
pub mod preferences {
    /// Largest accepted target weight in kilograms
    pub const MAX_TARGET_WEIGHT_KG: f64 = 500.0;
    /// Largest accepted age in years
    pub const MAX_AGE_YEARS: i64 = 120;
}

/// Plan and chat limits
pub mod plans {
    /// Days a generated plan stays "current"
    pub const CURRENT_PLAN_WINDOW_DAYS: i64 = 7;
    /// Previous chat exchanges fed back to the coach
    pub const CHAT_HISTORY_LIMIT: i64 = 10;
    /// Reply stored when the coach cannot answer
    pub const CHAT_FALLBACK_REPLY: &str =
        "Sorry, I'm having trouble processing your request right now.";
}

/// Language model defaults
pub mod llm {
    /// Default chat completions endpoint base
    pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
    /// Default model
    pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-maverick:free";
    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 30;
    /// Request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 120;
}

/// Environment variable names
pub mod env_vars {
    /// Bind host
    pub const HOST: &str = "KINETIC_HOST";
    /// HTTP port
    pub const HTTP_PORT: &str = "KINETIC_HTTP_PORT";
    /// Database URL
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Session signing secret
    pub const JWT_SECRET: &str = "KINETIC_JWT_SECRET";
    /// Session lifetime in hours
    pub const JWT_EXPIRY_HOURS: &str = "KINETIC_JWT_EXPIRY_HOURS";
    /// Language model API key
    pub const LLM_API_KEY: &str = "OPENROUTER_API_KEY";
    /// Language model base URL
    pub const LLM_BASE_URL: &str = "OPENROUTER_BASE_URL";
    /// Language model name
    pub const LLM_MODEL: &str = "OPENROUTER_MODEL";
    /// Diet coach system prompt file
    pub const DIET_PROMPT_PATH: &str = "DIET_COACH_PROMPT_PATH";
    /// Workout coach system prompt file
    pub const WORKOUT_PROMPT_PATH: &str = "WORKOUT_COACH_PROMPT_PATH";
    /// Allowed cross-origin request origins
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
}
