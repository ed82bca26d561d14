//! Outbound calls to the listing REST API.

mod client;
mod endpoints;
mod error;
pub mod models;

pub use client::{ApiClient, ApiRequest, ApiResponse, ApiResult, UnauthorizedHook};
pub use error::{ApiError, DECODE_FAILURE_MESSAGE, error_message};
pub use reqwest::{Method, StatusCode};
