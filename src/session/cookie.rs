//! Cookie parsing and formatting for the session jar.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

use super::error::SessionError;

/// Cookie name holding the bearer token.
pub const TOKEN_COOKIE_NAME: &str = "token";

/// Upper bound on `Max-Age`, the 400 days browsers cap cookie lifetimes at.
pub const MAX_COOKIE_AGE_SECS: i64 = 400 * 24 * 60 * 60;

/// Format used for `Expires` attributes, e.g. `Thu, 01 Jan 1970 00:00:00 GMT`.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// Extract a cookie value from a `name=value; other=value` string.
pub fn get_cookie<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

/// When a cookie stops being live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// No expiry attribute; lives as long as the jar does.
    Session,
    /// Absolute expiry instant.
    At(DateTime<Utc>),
    /// Relative lifetime in seconds; zero or negative deletes the cookie.
    MaxAge(i64),
}

impl Expiry {
    /// Resolve to an absolute instant relative to `now`. Out-of-range ages
    /// saturate at the ends of the representable time range.
    pub fn resolve(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Expiry::Session => None,
            Expiry::At(at) => Some(at),
            Expiry::MaxAge(secs) => Some(
                TimeDelta::try_seconds(secs)
                    .and_then(|age| now.checked_add_signed(age))
                    .unwrap_or(if secs > 0 {
                        DateTime::<Utc>::MAX_UTC
                    } else {
                        DateTime::<Utc>::MIN_UTC
                    }),
            ),
        }
    }
}

/// A parsed cookie assignment, the way `document.cookie = "..."` receives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub expiry: Expiry,
    pub path: Option<String>,
}

impl SetCookie {
    /// Assignment that stores `value` until `expires_at`.
    pub fn new(name: &str, value: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            expiry: Expiry::At(expires_at),
            path: Some("/".to_string()),
        }
    }

    /// Assignment that deletes `name` by giving it an expiry in the past.
    pub fn expired(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: String::new(),
            expiry: Expiry::At(DateTime::<Utc>::UNIX_EPOCH),
            path: Some("/".to_string()),
        }
    }

    /// Parse `name=value; Expires=...; Max-Age=...; Path=...`.
    /// Unknown attributes are ignored. `Max-Age` takes precedence over `Expires`.
    pub fn parse(assignment: &str) -> Result<Self, SessionError> {
        let mut parts = assignment.split(';');
        let pair = parts.next().unwrap_or_default().trim();
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| SessionError::InvalidCookie(format!("missing '=' in {pair:?}")))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::InvalidCookie("empty cookie name".into()));
        }

        let mut expires = None;
        let mut max_age = None;
        let mut path = None;

        for attribute in parts {
            let attribute = attribute.trim();
            if attribute.is_empty() {
                continue;
            }
            let (key, val) = attribute.split_once('=').unwrap_or((attribute, ""));
            let val = val.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "expires" => expires = Some(parse_http_date(val)?),
                "max-age" => {
                    let secs = val.parse::<i64>().map_err(|_| {
                        SessionError::InvalidCookie(format!("invalid Max-Age {val:?}"))
                    })?;
                    max_age = Some(secs.clamp(-MAX_COOKIE_AGE_SECS, MAX_COOKIE_AGE_SECS));
                }
                "path" => path = Some(val.to_string()),
                _ => {}
            }
        }

        let expiry = match (max_age, expires) {
            (Some(secs), _) => Expiry::MaxAge(secs),
            (None, Some(at)) => Expiry::At(at),
            (None, None) => Expiry::Session,
        };

        Ok(Self {
            name: name.to_string(),
            value: value.trim().to_string(),
            expiry,
            path,
        })
    }
}

impl std::fmt::Display for SetCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        match self.expiry {
            Expiry::Session => {}
            Expiry::At(at) => write!(f, "; Expires={}", format_http_date(at))?,
            Expiry::MaxAge(secs) => write!(f, "; Max-Age={secs}")?,
        }
        if let Some(path) = &self.path {
            write!(f, "; Path={path}")?;
        }
        Ok(())
    }
}

/// Format an instant as an HTTP date in GMT.
pub fn format_http_date(at: DateTime<Utc>) -> String {
    format!("{} GMT", at.format(HTTP_DATE_FORMAT))
}

/// Parse an HTTP date. Accepts `GMT`, `UTC` and `UT` zone names as well as
/// numeric RFC 2822 offsets.
pub fn parse_http_date(value: &str) -> Result<DateTime<Utc>, SessionError> {
    let value = value.trim();
    if let Some((stamp, zone)) = value.rsplit_once(' ') {
        if matches!(zone, "GMT" | "UTC" | "UT") {
            if let Ok(naive) = NaiveDateTime::parse_from_str(stamp, HTTP_DATE_FORMAT) {
                return Ok(naive.and_utc());
            }
        }
    }
    DateTime::parse_from_rfc2822(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| SessionError::InvalidCookie(format!("invalid Expires date {value:?}")))
}
