//! Setup errors. Request failures use [`crate::api::ApiError`] instead.

use crate::session::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Config(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Session(#[from] SessionError),
}
