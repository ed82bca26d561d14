//! Resource bodies exchanged with the listing API.
//!
//! Field aliases cover the naming differences between API versions
//! (`title`/`name`, `price_per_night`/`price`, `comment`/`text`, ...).

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit JSON `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub first_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    /// "First Last", or `None` when both parts are blank.
    pub fn display_name(&self) -> Option<String> {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Amenity {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
}

/// An amenity as listed on a place: either an embedded object or a bare
/// string that may be an id or already a display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmenityRef {
    Full(Amenity),
    Bare(String),
}

impl AmenityRef {
    /// Name that can be shown without asking the API.
    pub fn known_name(&self) -> Option<&str> {
        match self {
            AmenityRef::Full(amenity) if !amenity.name.trim().is_empty() => Some(&amenity.name),
            _ => None,
        }
    }

    /// Identifier worth looking up via `GET /amenities/:id`.
    pub fn lookup_id(&self) -> Option<&str> {
        match self {
            AmenityRef::Full(amenity) if amenity.name.trim().is_empty() => amenity.id.as_deref(),
            AmenityRef::Full(_) => None,
            AmenityRef::Bare(value) => Some(value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    #[serde(default, alias = "title", deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "price_per_night")]
    pub price: Option<f64>,
    #[serde(default, alias = "location")]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub owner: Option<User>,
    #[serde(default, deserialize_with = "nullable")]
    pub amenities: Vec<AmenityRef>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Place {
    /// Owner id from the embedded owner or the `owner_id` field.
    pub fn owner_ref(&self) -> Option<&str> {
        self.owner
            .as_ref()
            .and_then(|owner| owner.id.as_deref())
            .or(self.owner_id.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "comment", alias = "content", deserialize_with = "nullable")]
    pub text: String,
    #[serde(default, alias = "score")]
    pub rating: Option<i64>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default, alias = "property_id")]
    pub place_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of `POST /reviews`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReview {
    pub place_id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}
