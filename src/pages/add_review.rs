//! Review form for a place. Requires a session.

use tracing::{info, warn};

use super::{FormError, Loaded, NETWORK_ERROR_MESSAGE, PageOutcome, Route};
use crate::Portal;
use crate::api::models::NewReview;
use crate::api::{ApiError, StatusCode};

pub const MIN_REVIEW_LENGTH: usize = 10;

const LOGIN_REQUIRED: &str = "You must be logged in to add a review";
const SESSION_EXPIRED: &str = "Your session has expired. Please login again.";
const INVALID_PLACE: &str = "Invalid place ID.";

#[derive(Debug, Clone, PartialEq)]
pub struct AddReviewView {
    pub place_id: String,
    /// "Reviewing: <name>" or the reason the place could not be shown.
    pub heading: Loaded<String>,
    pub back: Route,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewForm {
    pub place_id: String,
    pub text: String,
    pub rating: Option<u8>,
}

impl ReviewForm {
    /// Client-side checks run before anything is sent.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.place_id.trim().is_empty() {
            return Err(FormError::new(INVALID_PLACE));
        }
        if let Some(rating) = self.rating {
            if !(1..=5).contains(&rating) {
                return Err(FormError::new("Rating must be between 1 and 5"));
            }
        }
        if self.text.trim().chars().count() < MIN_REVIEW_LENGTH {
            return Err(FormError::new(format!(
                "Review must be at least {MIN_REVIEW_LENGTH} characters"
            )));
        }
        Ok(())
    }
}

fn gate<V>(portal: &Portal) -> Option<PageOutcome<V>> {
    if portal.session().is_authenticated() {
        None
    } else {
        Some(PageOutcome::redirect_with(Route::Index, LOGIN_REQUIRED))
    }
}

/// Show which place is being reviewed.
pub async fn load_add_review(portal: &Portal, place_id: &str) -> PageOutcome<AddReviewView> {
    if let Some(redirect) = gate(portal) {
        return redirect;
    }

    let place_id = place_id.trim().to_string();
    if place_id.is_empty() {
        return PageOutcome::Render(AddReviewView {
            place_id,
            heading: Loaded::Failed(INVALID_PLACE.into()),
            back: Route::Index,
        });
    }

    let heading = match portal.api().place(&place_id).await {
        Ok(place) => {
            let name = if place.name.trim().is_empty() {
                "Unnamed Place"
            } else {
                place.name.as_str()
            };
            Loaded::Ready(format!("Reviewing: {name}"))
        }
        Err(ApiError::Network(e)) => {
            warn!(place_id = %place_id, error = %e, "Failed to reach API for place");
            Loaded::Failed("Error loading place information.".into())
        }
        Err(e) => {
            warn!(place_id = %place_id, error = %e, "Failed to load place");
            Loaded::Failed("Place not found.".into())
        }
    };

    let back = Route::Place(place_id.clone());
    PageOutcome::Render(AddReviewView {
        place_id,
        heading,
        back,
    })
}

/// Validate and post the review.
pub async fn submit_review(portal: &Portal, form: &ReviewForm) -> PageOutcome<FormError> {
    if let Some(redirect) = gate(portal) {
        return redirect;
    }
    if let Err(error) = form.validate() {
        return PageOutcome::Render(error);
    }

    let place_id = form.place_id.trim().to_string();
    let review = NewReview {
        place_id: place_id.clone(),
        text: form.text.trim().to_string(),
        rating: form.rating,
    };

    match portal.api().create_review(&review).await {
        Ok(_) => {
            info!(place_id = %place_id, "Review submitted");
            PageOutcome::redirect_with(Route::Place(place_id), "Review submitted successfully!")
        }
        Err(ApiError::NotAuthenticated) => PageOutcome::redirect_with(Route::Index, LOGIN_REQUIRED),
        Err(e) if e.is_unauthorized() => PageOutcome::redirect_with(Route::Login, SESSION_EXPIRED),
        Err(ApiError::Network(_)) => PageOutcome::Render(FormError::new(NETWORK_ERROR_MESSAGE)),
        Err(e) => PageOutcome::Render(FormError::new(review_failure_message(&e))),
    }
}

/// User-facing text for a rejected review.
fn review_failure_message(error: &ApiError) -> String {
    let message = error.message();
    if error.status() == Some(StatusCode::BAD_REQUEST) {
        let lowered = message.to_lowercase();
        if lowered.contains("already reviewed") {
            return "You have already reviewed this place.".to_string();
        }
        if lowered.contains("own place") {
            return "You cannot review your own place.".to_string();
        }
    }
    format!("Failed to submit review: {message}")
}
