use tracing::{info, warn};

use super::{FormError, NETWORK_ERROR_MESSAGE, PageOutcome, Route};
use crate::Portal;
use crate::api::ApiError;
use crate::api::models::Credentials;

/// Log in and store the returned token for the configured lifetime.
pub async fn submit_login(portal: &Portal, email: &str, password: &str) -> PageOutcome<FormError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return PageOutcome::Render(FormError::new("Please enter your email and password."));
    }

    let credentials = Credentials {
        email: email.to_string(),
        password: password.to_string(),
    };

    let response = match portal.api().login(&credentials).await {
        Ok(response) => response,
        Err(ApiError::Network(_)) => {
            return PageOutcome::Render(FormError::new(NETWORK_ERROR_MESSAGE));
        }
        Err(e) => {
            info!(email = %email, error = %e, "Login rejected");
            return PageOutcome::Render(FormError::new(format!("Login failed: {}", e.message())));
        }
    };

    if let Err(e) = portal
        .session()
        .set_token_for(&response.access_token, portal.config().token_ttl_days)
    {
        warn!(error = %e, "Failed to store session token");
        return PageOutcome::Render(FormError::new(format!("Login failed: {e}")));
    }

    info!(email = %email, "Logged in");
    PageOutcome::redirect(Route::Index)
}

/// Drop the stored token and go back to the login page.
pub fn logout(portal: &Portal) -> PageOutcome<FormError> {
    match portal.session().clear_token() {
        Ok(()) => PageOutcome::redirect(Route::Login),
        Err(e) => {
            warn!(error = %e, "Failed to clear session token");
            PageOutcome::Render(FormError::new(format!("Logout failed: {e}")))
        }
    }
}
