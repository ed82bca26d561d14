//! Failure side of an API call.

use reqwest::StatusCode;
use serde_json::Value;

/// Message used when a response body cannot be decoded.
pub const DECODE_FAILURE_MESSAGE: &str = "Invalid response from server";

/// Why an API call did not produce a usable body.
///
/// [`ApiError::status`] is `None` when no response was received at all, which
/// is how a transport failure is told apart from an HTTP error status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request needed a token and none was stored. Nothing was sent.
    #[error("not authenticated")]
    NotAuthenticated,

    /// No response: DNS, connection or timeout failure.
    #[error("network error")]
    Network(#[source] reqwest::Error),

    /// The server answered outside 200..=299.
    #[error("{message}")]
    Http { status: StatusCode, message: String },

    /// The server answered but the body was not what we expected.
    #[error("Invalid response from server")]
    Decode { status: StatusCode, detail: String },
}

impl ApiError {
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn decode(status: StatusCode, detail: impl std::fmt::Display) -> Self {
        Self::Decode {
            status,
            detail: detail.to_string(),
        }
    }

    /// Response status, absent when nothing came back.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::NotAuthenticated | Self::Network(_) => None,
            Self::Http { status, .. } | Self::Decode { status, .. } => Some(*status),
        }
    }

    /// Text describing the failure, suitable for showing to a user.
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Pick the message out of an error response body.
///
/// Tries `message`, then `error`, then the status reason phrase, then
/// `HTTP <code>`.
pub fn error_message(status: StatusCode, body: &[u8]) -> String {
    let from_body = serde_json::from_slice::<Value>(body).ok().and_then(|json| {
        ["message", "error"].iter().find_map(|key| {
            json.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    });

    from_body
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
