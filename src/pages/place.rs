//! Place details: the place itself, its host, amenities and reviews.
//!
//! Host, amenity and reviewer lookups are secondary: when one fails the page
//! still renders with a placeholder.

use std::collections::{BTreeSet, HashMap};

use futures::future::join_all;
use tracing::{debug, warn};

use super::{Loaded, Route};
use crate::Portal;
use crate::api::ApiError;
use crate::api::models::{AmenityRef, Place, Review};

const UNKNOWN_HOST: &str = "Unknown";
const ANONYMOUS: &str = "Anonymous";
const NO_REVIEW_TEXT: &str = "No review text provided.";

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewView {
    pub author: String,
    pub rating: Option<i64>,
    pub text: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDetailsView {
    pub place: Place,
    pub host: String,
    pub amenities: Vec<String>,
    pub reviews: Loaded<Vec<ReviewView>>,
    /// Link to the review form, offered to logged-in visitors only.
    pub add_review: Option<Route>,
}

/// Load everything the details page shows. No session required.
pub async fn load_place_details(portal: &Portal, place_id: &str) -> Loaded<PlaceDetailsView> {
    let place_id = place_id.trim();
    if place_id.is_empty() {
        return Loaded::Failed("Invalid place ID.".into());
    }

    let place = match portal.api().place(place_id).await {
        Ok(place) => place,
        Err(e) if e.is_not_found() => return Loaded::Failed("Place not found.".into()),
        Err(ApiError::Network(e)) => {
            warn!(place_id = %place_id, error = %e, "Failed to reach API for place");
            return Loaded::Failed(
                "Error loading place details. Please check if the API is running.".into(),
            );
        }
        Err(e) => {
            warn!(place_id = %place_id, error = %e, "Failed to load place");
            return Loaded::Failed("Failed to load place details.".into());
        }
    };

    let (host, amenities, reviews) = futures::join!(
        resolve_host(portal, &place),
        resolve_amenities(portal, &place.amenities),
        load_reviews(portal, place_id),
    );

    let add_review = portal
        .session()
        .is_authenticated()
        .then(|| Route::AddReview(place_id.to_string()));

    Loaded::Ready(PlaceDetailsView {
        place,
        host,
        amenities,
        reviews,
        add_review,
    })
}

async fn resolve_host(portal: &Portal, place: &Place) -> String {
    if let Some(name) = place.owner.as_ref().and_then(|owner| owner.display_name()) {
        return name;
    }
    let Some(owner_id) = place.owner_ref() else {
        return UNKNOWN_HOST.to_string();
    };
    match portal.api().user(owner_id).await {
        Ok(user) => user.display_name().unwrap_or_else(|| UNKNOWN_HOST.to_string()),
        Err(e) => {
            debug!(owner_id = %owner_id, error = %e, "Host lookup failed");
            UNKNOWN_HOST.to_string()
        }
    }
}

/// Names for every amenity. Bare strings are tried as ids first and shown
/// verbatim when the lookup fails.
async fn resolve_amenities(portal: &Portal, amenities: &[AmenityRef]) -> Vec<String> {
    let lookups = amenities.iter().map(|amenity| async move {
        if let Some(name) = amenity.known_name() {
            return Some(name.to_string());
        }
        let id = amenity.lookup_id()?;
        match portal.api().amenity(id).await {
            Ok(found) if !found.name.trim().is_empty() => Some(found.name),
            Ok(_) | Err(_) => match amenity {
                AmenityRef::Bare(raw) => Some(raw.clone()),
                AmenityRef::Full(_) => None,
            },
        }
    });
    join_all(lookups).await.into_iter().flatten().collect()
}

async fn load_reviews(portal: &Portal, place_id: &str) -> Loaded<Vec<ReviewView>> {
    let reviews = match portal.api().reviews_for_place(place_id).await {
        Ok(reviews) => reviews,
        Err(ApiError::Network(e)) => {
            warn!(place_id = %place_id, error = %e, "Failed to reach API for reviews");
            return Loaded::Failed("Error loading reviews.".into());
        }
        Err(e) => {
            warn!(place_id = %place_id, error = %e, "Failed to load reviews");
            return Loaded::Failed("Failed to load reviews.".into());
        }
    };

    let authors = reviewer_names(portal, &reviews).await;

    Loaded::Ready(
        reviews
            .into_iter()
            .map(|review| {
                let author = review
                    .user
                    .as_ref()
                    .and_then(|user| user.display_name())
                    .or_else(|| {
                        review
                            .user_id
                            .as_ref()
                            .and_then(|id| authors.get(id.as_str()).cloned())
                    })
                    .unwrap_or_else(|| ANONYMOUS.to_string());
                let text = if review.text.trim().is_empty() {
                    NO_REVIEW_TEXT.to_string()
                } else {
                    review.text
                };
                ReviewView {
                    author,
                    rating: review.rating,
                    text,
                    created_at: review.created_at,
                }
            })
            .collect(),
    )
}

/// Look up each distinct reviewer once, concurrently.
async fn reviewer_names(portal: &Portal, reviews: &[Review]) -> HashMap<String, String> {
    let ids: BTreeSet<&str> = reviews
        .iter()
        .filter(|review| review.user.as_ref().and_then(|u| u.display_name()).is_none())
        .filter_map(|review| review.user_id.as_deref())
        .collect();

    let lookups = ids.into_iter().map(|id| async move {
        match portal.api().user(id).await {
            Ok(user) => user.display_name().map(|name| (id.to_string(), name)),
            Err(e) => {
                debug!(user_id = %id, error = %e, "Reviewer lookup failed");
                None
            }
        }
    });

    join_all(lookups).await.into_iter().flatten().collect()
}
