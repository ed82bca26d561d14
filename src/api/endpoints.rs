//! Typed wrappers for the endpoints the pages consume.

use serde_json::json;

use super::client::{ApiClient, ApiRequest};
use super::error::ApiError;
use super::models::{Amenity, Credentials, LoginResponse, NewReview, Place, Review, User};

fn segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}

impl ApiClient {
    /// `POST /auth/login`. Does not touch the session; storing the token is
    /// up to the caller.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password,
        });
        self.fetch(ApiRequest::post("/auth/login").json(body)).await
    }

    /// `GET /places`
    pub async fn places(&self) -> Result<Vec<Place>, ApiError> {
        self.fetch(ApiRequest::get("/places")).await
    }

    /// `GET /places/:id`
    pub async fn place(&self, id: &str) -> Result<Place, ApiError> {
        self.fetch(ApiRequest::get(format!("/places/{}", segment(id))))
            .await
    }

    /// `GET /users/:id`
    pub async fn user(&self, id: &str) -> Result<User, ApiError> {
        self.fetch(ApiRequest::get(format!("/users/{}", segment(id))))
            .await
    }

    /// `GET /amenities/:id`
    pub async fn amenity(&self, id: &str) -> Result<Amenity, ApiError> {
        self.fetch(ApiRequest::get(format!("/amenities/{}", segment(id))))
            .await
    }

    /// `GET /reviews/place/:id`
    pub async fn reviews_for_place(&self, place_id: &str) -> Result<Vec<Review>, ApiError> {
        self.fetch(ApiRequest::get(format!("/reviews/place/{}", segment(place_id))))
            .await
    }

    /// `POST /reviews`, authenticated. Returns whatever the server echoes back.
    pub async fn create_review(&self, review: &NewReview) -> Result<serde_json::Value, ApiError> {
        let mut body = json!({
            "place_id": review.place_id,
            "text": review.text,
        });
        if let Some(rating) = review.rating {
            body["rating"] = json!(rating);
        }
        let response = self
            .request(ApiRequest::post("/reviews").json(body).authenticated())
            .await?;
        Ok(response.body)
    }
}
