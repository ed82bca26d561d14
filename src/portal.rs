//! Wiring between the session store, the API client and the pages.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::ApiClient;
use crate::config::PortalConfig;
use crate::error::Error;
use crate::session::{CookieJar, SessionStore};

/// Shared handle the page controllers run against. Cheap to clone.
#[derive(Clone)]
pub struct Portal {
    config: PortalConfig,
    session: SessionStore,
    api: Arc<ApiClient>,
}

impl Portal {
    pub fn new(config: PortalConfig, jar: Arc<dyn CookieJar>) -> Result<Self, Error> {
        Self::with_session(config, SessionStore::new(jar))
    }

    /// Build on an existing store, e.g. one driven by a manual clock.
    pub fn with_session(config: PortalConfig, session: SessionStore) -> Result<Self, Error> {
        let hook_session = session.clone();
        let api = ApiClient::new(&config.api_base, session.clone(), config.request_timeout)?
            .on_unauthorized(move || match hook_session.clear_token() {
                Ok(()) => info!("Session rejected by API, token cleared"),
                Err(e) => warn!(error = %e, "Failed to clear rejected session token"),
            });

        Ok(Self {
            config,
            session,
            api: Arc::new(api),
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }
}
