// ABOUTME: Account registration, password hashing, and JWT session management
// ABOUTME: Issues HS256 session tokens and authenticates requests by header or cookie
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

//! # Authentication and Session Management
//!
//! Passwords are hashed with bcrypt on the blocking pool. A successful login
//! yields an HS256 JWT that clients send back either as
//! `Authorization: Bearer <token>` or in the `auth_token` cookie.

use std::sync::OnceLock;

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use kinetic_core::constants::auth::{MIN_PASSWORD_LENGTH, MIN_USERNAME_LENGTH, SESSION_COOKIE};
use kinetic_core::constants::service_names::SESSION_AUDIENCE;
use kinetic_core::errors::{AppError, AppResult};
use kinetic_core::models::User;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::security::cookies::get_cookie_value;

static USERNAME_PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn username_re() -> AppResult<&'static Regex> {
    USERNAME_PATTERN
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$"))
        .as_ref()
        .map_err(|e| AppError::internal(format!("Invalid username pattern: {e}")))
}

/// `JWT` validation error with detailed information
#[derive(Debug, Clone)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
    },
    /// Token signature or claims are invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is not a well-formed `JWT`
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl std::fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenExpired { expired_at } => write!(
                f,
                "JWT token expired at {}",
                expired_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            Self::TokenInvalid { reason } => write!(f, "JWT token is invalid: {reason}"),
            Self::TokenMalformed { details } => write!(f, "JWT token is malformed: {details}"),
        }
    }
}

impl std::error::Error for JwtValidationError {}

impl From<JwtValidationError> for AppError {
    fn from(e: JwtValidationError) -> Self {
        match e {
            JwtValidationError::TokenExpired { .. } => Self::auth_expired(),
            other => Self::auth_invalid(other.to_string()),
        }
    }
}

/// `JWT` claims for a user session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// Login name at issue time
    pub username: String,
    /// Audience
    pub aud: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Identity of an authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    /// Authenticated user `ID`
    pub user_id: Uuid,
    /// Login name carried in the token
    pub username: String,
}

/// Issued session token
#[derive(Debug, Clone, Serialize)]
pub struct SessionToken {
    /// Signed `JWT`
    pub token: String,
    /// Expiry time
    pub expires_at: DateTime<Utc>,
}

/// Authentication manager for accounts and session tokens
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    bcrypt_cost: u32,
}

impl AuthManager {
    /// Create a manager signing with `secret`
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64) -> Self {
        // Minimum bcrypt cost in debug builds
        let bcrypt_cost = if cfg!(debug_assertions) {
            4
        } else {
            bcrypt::DEFAULT_COST
        };
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
            bcrypt_cost,
        }
    }

    /// Session lifetime in seconds, used for the cookie `Max-Age`
    #[must_use]
    pub const fn token_lifetime_secs(&self) -> i64 {
        self.token_expiry_hours * 3600
    }

    /// Sign a session token for `user`
    ///
    /// # Errors
    ///
    /// Returns an internal error if encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<SessionToken> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.token_expiry_hours);
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            aud: SESSION_AUDIENCE.to_owned(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign session token: {e}")))?;

        Ok(SessionToken { token, expires_at })
    }

    /// Verify a session token and return its claims
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] when the token is expired, has a bad
    /// signature or audience, or is malformed
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let claims = self.decode_token_claims(token)?;
        Self::validate_claims_expiry(&claims)?;
        Ok(claims)
    }

    /// Decode and verify signature and audience, without the expiry check
    fn decode_token_claims(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation_no_exp = Validation::new(Algorithm::HS256);
        validation_no_exp.validate_exp = false;
        validation_no_exp.required_spec_claims.clear();
        validation_no_exp.set_audience(&[SESSION_AUDIENCE]);

        decode::<Claims>(token, &self.decoding_key, &validation_no_exp)
            .map(|data| data.claims)
            .map_err(|e| Self::convert_jwt_error(&e))
    }

    fn validate_claims_expiry(claims: &Claims) -> Result<(), JwtValidationError> {
        let now = Utc::now();
        if now.timestamp() >= claims.exp {
            let expired_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or(now);
            debug!(user_id = %claims.sub, expired_at = %expired_at, "Session token expired");
            return Err(JwtValidationError::TokenExpired { expired_at });
        }
        Ok(())
    }

    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;
        debug!(error = ?e, "Session token rejected");

        match e.kind() {
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "Token signature verification failed".into(),
            },
            ErrorKind::InvalidAudience => JwtValidationError::TokenInvalid {
                reason: "Token was issued for another audience".into(),
            },
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) => {
                JwtValidationError::TokenMalformed {
                    details: e.to_string(),
                }
            }
            _ => JwtValidationError::TokenInvalid {
                reason: e.to_string(),
            },
        }
    }

    /// Authenticate a request from its `Authorization` header or session cookie
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when no credentials are present, and
    /// `AuthInvalid` or `AuthExpired` when the token does not verify
    pub fn authenticate_headers(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_owned)
            .or_else(|| get_cookie_value(headers, SESSION_COOKIE).filter(|t| !t.is_empty()))
            .ok_or_else(AppError::auth_required)?;

        let claims = self.validate_token(&token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Token subject is not a valid user ID"))?;

        Ok(AuthResult {
            user_id,
            username: claims.username,
        })
    }

    /// Hash a password with bcrypt on the blocking pool
    ///
    /// # Errors
    ///
    /// Returns an internal error if hashing fails or the task is cancelled
    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
    }

    /// Register a new account
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when validation fails or `ResourceAlreadyExists`
    /// when the username is taken
    pub async fn register(
        &self,
        database: &Database,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> AppResult<User> {
        let username = username.trim();
        validate_signup(username, password, confirm_password)?;

        if database.users().get_by_username(username).await?.is_some() {
            return Err(AppError::already_exists("Username already exists"));
        }

        let hash = self.hash_password(password).await?;
        let user = User::new(username.to_owned(), hash);
        database.users().create(&user).await?;

        info!(user_id = %user.id, "Registered new account");
        Ok(user)
    }

    /// Check credentials and issue a session token
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` for an unknown username or wrong password
    pub async fn login(
        &self,
        database: &Database,
        username: &str,
        password: &str,
    ) -> AppResult<(User, SessionToken)> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::invalid_input(
                "Username and password are required",
            ));
        }

        let Some(user) = database.users().get_by_username(username).await? else {
            warn!("Login attempt for unknown username");
            return Err(AppError::auth_invalid("Invalid username or password"));
        };

        if !verify_password(password, &user.password_hash).await {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AppError::auth_invalid("Invalid username or password"));
        }

        let session = self.generate_token(&user)?;
        info!(user_id = %user.id, "User logged in");
        Ok((user, session))
    }
}

/// Verify a password against a bcrypt hash on the blocking pool
async fn verify_password(password: &str, hash: &str) -> bool {
    let password = password.to_owned();
    let hash = hash.to_owned();

    tokio::task::spawn_blocking(move || bcrypt::verify(&password, &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

/// Check signup fields
///
/// # Errors
///
/// Returns `InvalidInput` describing the first rule that fails
pub fn validate_signup(username: &str, password: &str, confirm_password: &str) -> AppResult<()> {
    if username.is_empty() || password.is_empty() || confirm_password.is_empty() {
        return Err(AppError::invalid_input("All fields are required"));
    }
    if password != confirm_password {
        return Err(AppError::invalid_input("Passwords do not match"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    if username.chars().count() < MIN_USERNAME_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Username must be at least {MIN_USERNAME_LENGTH} characters long"
        )));
    }
    if !username_re()?.is_match(username) {
        return Err(AppError::invalid_input(
            "Username can only contain letters, numbers, and underscores",
        ));
    }
    Ok(())
}
