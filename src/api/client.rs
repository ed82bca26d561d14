//! HTTP client for the listing API.
//!
//! Every call is a single attempt. Authentication is attached from the
//! [`SessionStore`] when a token exists; requests marked as requiring it are
//! refused locally when it does not. A 401 from the server fires the
//! registered unauthorized hook once before the error is handed back.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::{ApiError, error_message};
use crate::session::SessionStore;

/// Callback run when the API answers 401.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Outcome of [`ApiClient::request`].
pub type ApiResult<T = Value> = Result<ApiResponse<T>, ApiError>;

/// One outbound call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub requires_auth: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            requires_auth: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Refuse to send unless a token is stored.
    pub fn authenticated(mut self) -> Self {
        self.requires_auth = true;
        self
    }
}

/// Successful response: status in 200..=299 and a decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T = Value> {
    pub status: StatusCode,
    pub body: T,
}

impl ApiResponse<Value> {
    /// Decode the JSON body into `T`.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<ApiResponse<T>, ApiError> {
        let status = self.status;
        let body = serde_json::from_value(self.body).map_err(|e| ApiError::decode(status, e))?;
        Ok(ApiResponse { status, body })
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    session: SessionStore,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl ApiClient {
    /// Build a client for `base` (e.g. `http://localhost:5000/api/v1`).
    pub fn new(
        base: &url::Url,
        session: SessionStore,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base: base.as_str().trim_end_matches('/').to_string(),
            session,
            on_unauthorized: None,
        })
    }

    /// Register the callback fired on every 401 response.
    pub fn on_unauthorized(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base, path)
        } else {
            format!("{}/{}", self.base, path)
        }
    }

    /// Send `request` and normalize the outcome.
    pub async fn request(&self, request: ApiRequest) -> ApiResult {
        let token = self.session.get_token();
        if request.requires_auth && token.is_none() {
            debug!(
                method = %request.method,
                path = %request.path,
                "Refusing request without session"
            );
            return Err(ApiError::NotAuthenticated);
        }

        let url = self.url(&request.path);
        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(method = %request.method, url = %url, error = %e, "Request failed");
                return Err(ApiError::Network(e));
            }
        };

        let status = response.status();
        debug!(method = %request.method, url = %url, status = %status, "Response received");

        if status == StatusCode::UNAUTHORIZED {
            if let Some(hook) = &self.on_unauthorized {
                hook();
            }
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) if status.is_success() => return Err(ApiError::decode(status, e)),
            Err(e) => {
                warn!(status = %status, error = %e, "Failed to read error body");
                return Err(ApiError::http(status, error_message(status, b"")));
            }
        };

        if !status.is_success() {
            let message = error_message(status, &bytes);
            debug!(status = %status, message = %message, "API error");
            return Err(ApiError::http(status, message));
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(ApiResponse {
                status,
                body: Value::Null,
            });
        }

        match serde_json::from_slice(&bytes) {
            Ok(body) => Ok(ApiResponse { status, body }),
            Err(e) => {
                warn!(status = %status, url = %url, error = %e, "Response body is not JSON");
                Err(ApiError::decode(status, e))
            }
        }
    }

    /// [`request`](Self::request) and decode the body into `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        Ok(self.request(request).await?.into_json()?.body)
    }
}
