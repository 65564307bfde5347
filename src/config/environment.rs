// ABOUTME: Environment configuration for the HTTP server, database, sessions, and language model
// ABOUTME: Reads KINETIC_* and OPENROUTER_* variables with documented defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

//! Environment-based configuration

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use kinetic_core::constants::{auth, env_vars, llm, network};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{info, warn};

/// Default `SQLite` location
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/health.db";

const GENERATED_SECRET_LENGTH: usize = 64;

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Database settings
    pub database: DatabaseConfig,
    /// Session settings
    pub auth: AuthConfig,
    /// Language model settings
    pub llm: LlmConfig,
    /// Optional system prompt files
    pub prompts: PromptPaths,
    /// Cross-origin settings
    pub cors: CorsConfig,
}

/// Database settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// sqlx connection URL
    pub url: String,
}

impl DatabaseConfig {
    /// Whether the URL points at an in-memory database
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

/// Session token settings
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .finish()
    }
}

/// Chat-completions endpoint settings
#[derive(Clone)]
pub struct LlmConfig {
    /// Bearer key; without one the provider reports itself unconfigured
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Model name
    pub model: String,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Cross-origin settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    /// Comma-separated origin list, or `*` for any origin
    pub allowed_origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: "*".to_owned(),
        }
    }
}

/// Files that override the built-in coach prompts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptPaths {
    /// Diet coach system prompt
    pub diet: Option<PathBuf>,
    /// Workout coach system prompt
    pub workout: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but cannot be parsed
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let http_port = match env::var(env_vars::HTTP_PORT) {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("Invalid {}: {value}", env_vars::HTTP_PORT))?,
            Err(_) => network::DEFAULT_HTTP_PORT,
        };

        let jwt_expiry_hours = match env::var(env_vars::JWT_EXPIRY_HOURS) {
            Ok(value) => value
                .parse::<i64>()
                .with_context(|| format!("Invalid {}: {value}", env_vars::JWT_EXPIRY_HOURS))?,
            Err(_) => auth::DEFAULT_SESSION_EXPIRY_HOURS,
        };

        let jwt_secret = env::var(env_vars::JWT_SECRET)
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                warn!(
                    "{} not set, generating a per-process secret; sessions will not survive a restart",
                    env_vars::JWT_SECRET
                );
                generate_secret()
            });

        let config = Self {
            host: env_var_or(env_vars::HOST, network::DEFAULT_HOST),
            http_port,
            database: DatabaseConfig {
                url: env_var_or(env_vars::DATABASE_URL, DEFAULT_DATABASE_URL),
            },
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours,
            },
            llm: LlmConfig {
                api_key: env::var(env_vars::LLM_API_KEY)
                    .ok()
                    .filter(|s| !s.is_empty()),
                base_url: env_var_or(env_vars::LLM_BASE_URL, llm::DEFAULT_BASE_URL),
                model: env_var_or(env_vars::LLM_MODEL, llm::DEFAULT_MODEL),
            },
            prompts: PromptPaths {
                diet: env::var(env_vars::DIET_PROMPT_PATH).ok().map(PathBuf::from),
                workout: env::var(env_vars::WORKOUT_PROMPT_PATH)
                    .ok()
                    .map(PathBuf::from),
            },
            cors: CorsConfig {
                allowed_origins: env_var_or(env_vars::CORS_ALLOWED_ORIGINS, "*"),
            },
        };

        if config.llm.api_key.is_none() {
            warn!(
                "{} not set; plan generation and coach chat will fail until it is configured",
                env_vars::LLM_API_KEY
            );
        }

        Ok(config)
    }

    /// Configuration suitable for tests: in-memory database, fixed secret, no model key
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            host: network::DEFAULT_HOST.to_owned(),
            http_port: 0,
            database: DatabaseConfig {
                url: "sqlite::memory:".to_owned(),
            },
            auth: AuthConfig {
                jwt_secret: "test-secret-with-enough-entropy-for-hs256".to_owned(),
                jwt_expiry_hours: auth::DEFAULT_SESSION_EXPIRY_HOURS,
            },
            llm: LlmConfig {
                api_key: None,
                base_url: llm::DEFAULT_BASE_URL.to_owned(),
                model: llm::DEFAULT_MODEL.to_owned(),
            },
            prompts: PromptPaths::default(),
            cors: CorsConfig::default(),
        }
    }

    /// Human-readable summary safe to log
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "host={} port={} database={} model={} llm_key={}",
            self.host,
            self.http_port,
            self.database.url,
            self.llm.model,
            if self.llm.api_key.is_some() {
                "set"
            } else {
                "missing"
            }
        )
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LENGTH)
        .map(char::from)
        .collect()
}
