//! Page controllers.
//!
//! Each page gates on the session when it has to, issues its API calls and
//! returns either a view model for rendering or a redirect. Failures are
//! folded into the view as inline messages; nothing here returns an error to
//! the caller.

mod add_review;
mod index;
mod login;
mod place;

use std::fmt;

pub use add_review::{AddReviewView, ReviewForm, load_add_review, submit_review};
pub use index::{IndexView, PriceFilter, load_index};
pub use login::{logout, submit_login};
pub use place::{PlaceDetailsView, ReviewView, load_place_details};

/// Shown whenever the API could not be reached at all.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check if the API server is running.";

/// Where a page sends the visitor next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Index,
    Login,
    Place(String),
    AddReview(String),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Index => write!(f, "index.html"),
            Route::Login => write!(f, "login.html"),
            Route::Place(id) => write!(f, "place.html?id={}", urlencoding::encode(id)),
            Route::AddReview(id) => {
                write!(f, "add_review.html?place_id={}", urlencoding::encode(id))
            }
        }
    }
}

/// Result of running a page controller.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome<V> {
    Render(V),
    Redirect { to: Route, notice: Option<String> },
}

impl<V> PageOutcome<V> {
    pub fn redirect(to: Route) -> Self {
        Self::Redirect { to, notice: None }
    }

    pub fn redirect_with(to: Route, notice: impl Into<String>) -> Self {
        Self::Redirect {
            to,
            notice: Some(notice.into()),
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }
}

/// One section of a page: either loaded or replaced by an inline error.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    Ready(T),
    Failed(String),
}

impl<T> Loaded<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Loaded::Ready(value) => Some(value),
            Loaded::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Loaded::Ready(_) => None,
            Loaded::Failed(message) => Some(message),
        }
    }
}

/// Inline message shown next to a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormError {
    pub message: String,
}

impl FormError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `$120.00`, or `N/A` when the price is unknown.
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(price) => format!("${price:.2}"),
        None => "N/A".to_string(),
    }
}
