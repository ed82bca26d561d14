//! Portal configuration.

use std::time::Duration;

use url::Url;

use crate::error::Error;
use crate::session::DEFAULT_TOKEN_TTL_DAYS;

/// Default API base used by the original deployment.
pub const DEFAULT_API_BASE: &str = "http://localhost:5000/api/v1";

#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Base URL every endpoint path is appended to.
    pub api_base: Url,
    /// Lifetime of the token cookie written on login.
    pub token_ttl_days: u32,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl PortalConfig {
    pub fn new(api_base: Url) -> Self {
        Self {
            api_base,
            token_ttl_days: DEFAULT_TOKEN_TTL_DAYS,
            request_timeout: None,
        }
    }

    pub fn with_token_ttl_days(mut self, days: u32) -> Self {
        self.token_ttl_days = days;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Parse and validate an API base URL: absolute, `http` or `https`, with a host.
pub fn parse_api_base(value: &str) -> Result<Url, Error> {
    let url = Url::parse(value)
        .map_err(|e| Error::Config(format!("invalid API base URL {value:?}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "API base must use http or https, got {:?}",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::Config(format!("API base has no host: {value:?}")));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(Error::Config(format!(
            "API base must not carry a query or fragment: {value:?}"
        )));
    }

    Ok(url)
}
