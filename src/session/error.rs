//! Session and cookie jar errors.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid cookie: {0}")]
    InvalidCookie(String),

    #[error("token value cannot be empty")]
    EmptyToken,

    #[error("token lifetime of {0} days is out of range")]
    InvalidTtl(u32),

    #[error("failed to access cookie file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode cookie file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
