//! Bearer token lifecycle on top of a cookie jar.
//!
//! The token is opaque here: it is never decoded or checked for expiry. Its
//! presence in the jar is the only authentication signal; the API validates it
//! on every call.

use std::sync::Arc;

use chrono::TimeDelta;
use tracing::debug;

use super::clock::{Clock, SystemClock};
use super::cookie::{SetCookie, TOKEN_COOKIE_NAME, get_cookie};
use super::error::SessionError;
use super::jar::CookieJar;

/// Default token lifetime: 7 days.
pub const DEFAULT_TOKEN_TTL_DAYS: u32 = 7;

/// Longest lifetime the CLI accepts for a login.
pub const MAX_TOKEN_TTL_DAYS: u32 = 3650;

/// Reads and writes the session token. Cheap to clone; clones share the jar.
#[derive(Clone)]
pub struct SessionStore {
    jar: Arc<dyn CookieJar>,
    clock: Arc<dyn Clock>,
    key: &'static str,
}

impl SessionStore {
    pub fn new(jar: Arc<dyn CookieJar>) -> Self {
        Self::with_clock(jar, Arc::new(SystemClock))
    }

    pub fn with_clock(jar: Arc<dyn CookieJar>, clock: Arc<dyn Clock>) -> Self {
        Self {
            jar,
            clock,
            key: TOKEN_COOKIE_NAME,
        }
    }

    /// Store `value` for the default 7 days, replacing any previous token.
    pub fn set_token(&self, value: &str) -> Result<(), SessionError> {
        self.set_token_for(value, DEFAULT_TOKEN_TTL_DAYS)
    }

    /// Store `value` with an absolute expiry of now + `ttl_days` days.
    pub fn set_token_for(&self, value: &str, ttl_days: u32) -> Result<(), SessionError> {
        if value.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        let expires_at = TimeDelta::try_days(i64::from(ttl_days))
            .and_then(|ttl| self.clock.now().checked_add_signed(ttl))
            .ok_or(SessionError::InvalidTtl(ttl_days))?;
        let cookie = SetCookie::new(self.key, &urlencoding::encode(value), expires_at);
        self.jar.set_cookie(&cookie.to_string())?;
        debug!(ttl_days, "Session token stored");
        Ok(())
    }

    /// Current token, or `None` when absent, expired or empty.
    pub fn get_token(&self) -> Option<String> {
        let header = self.jar.cookie_header();
        let raw = get_cookie(&header, self.key)?;
        if raw.is_empty() {
            return None;
        }
        let value = match urlencoding::decode(raw) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.to_string(),
        };
        Some(value)
    }

    /// Remove the token. Clearing an empty session is a no-op.
    pub fn clear_token(&self) -> Result<(), SessionError> {
        self.jar.set_cookie(&SetCookie::expired(self.key).to_string())?;
        debug!("Session token cleared");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some()
    }
}
