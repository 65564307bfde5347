// ABOUTME: Secure cookie helpers for the session token
// ABOUTME: Builds Set-Cookie values and reads cookies from request headers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kinetic Edge Contributors

use axum::http::{header, HeaderMap, HeaderValue};
use kinetic_core::constants::auth::SESSION_COOKIE;
use tracing::warn;

/// Attributes of a cookie written by the server
#[derive(Debug, Clone)]
pub struct SecureCookieConfig {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Lifetime in seconds
    pub max_age_secs: i64,
    /// Hide from scripts
    pub http_only: bool,
    /// HTTPS only
    pub secure: bool,
    /// `SameSite` attribute
    pub same_site: &'static str,
}

impl SecureCookieConfig {
    /// Cookie with `HttpOnly`, `Secure` and `SameSite=Lax`
    #[must_use]
    pub const fn new(name: String, value: String, max_age_secs: i64) -> Self {
        Self {
            name,
            value,
            max_age_secs,
            http_only: true,
            secure: true,
            same_site: "Lax",
        }
    }

    /// Render as a `Set-Cookie` header value
    #[must_use]
    pub fn build(&self) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; SameSite={}",
            self.name, self.value, self.max_age_secs, self.same_site
        );
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

fn append_cookie(headers: &mut HeaderMap, config: &SecureCookieConfig) {
    match HeaderValue::from_str(&config.build()) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => warn!(cookie = %config.name, error = %e, "Refusing to set malformed cookie"),
    }
}

/// Set the session cookie
pub fn set_auth_cookie(headers: &mut HeaderMap, token: &str, max_age_secs: i64) {
    let config = SecureCookieConfig::new(SESSION_COOKIE.to_owned(), token.to_owned(), max_age_secs);
    append_cookie(headers, &config);
}

/// Expire the session cookie
pub fn clear_auth_cookie(headers: &mut HeaderMap) {
    let config = SecureCookieConfig::new(SESSION_COOKIE.to_owned(), String::new(), 0);
    append_cookie(headers, &config);
}

/// Value of the named cookie from the request's `Cookie` header
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
}
