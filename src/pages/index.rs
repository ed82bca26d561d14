//! Place list with price and country filters.

use std::collections::BTreeSet;
use std::str::FromStr;

use tracing::warn;

use super::Loaded;
use crate::Portal;
use crate::api::ApiError;
use crate::api::models::Place;

/// Maximum nightly price filter. `All` shows everything.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PriceFilter {
    #[default]
    All,
    Max(f64),
}

impl PriceFilter {
    /// Places without a price are hidden by any bound.
    pub fn allows(self, price: Option<f64>) -> bool {
        match self {
            PriceFilter::All => true,
            PriceFilter::Max(max) => price.is_some_and(|price| price <= max),
        }
    }
}

impl FromStr for PriceFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") || s.is_empty() {
            return Ok(PriceFilter::All);
        }
        match s.parse::<f64>() {
            Ok(max) if max.is_finite() && max >= 0.0 => Ok(PriceFilter::Max(max)),
            _ => Err(format!("invalid price filter {s:?}, expected 'all' or a number")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexView {
    /// Whether to offer logout instead of login.
    pub authenticated: bool,
    pub places: Loaded<Vec<Place>>,
}

impl IndexView {
    /// Sorted, de-duplicated countries of the loaded places.
    pub fn countries(&self) -> Vec<String> {
        let Some(places) = self.places.ready() else {
            return Vec::new();
        };
        places
            .iter()
            .filter_map(|place| place.country.as_deref())
            .map(str::trim)
            .filter(|country| !country.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Places passing both filters. `country: None` keeps every country.
    pub fn filtered(&self, price: PriceFilter, country: Option<&str>) -> Vec<&Place> {
        let Some(places) = self.places.ready() else {
            return Vec::new();
        };
        places
            .iter()
            .filter(|place| price.allows(place.price))
            .filter(|place| match country {
                None | Some("") => true,
                Some(country) => place.country.as_deref().map(str::trim) == Some(country.trim()),
            })
            .collect()
    }
}

/// The index page needs no session; it only reports whether one exists.
pub async fn load_index(portal: &Portal) -> IndexView {
    let places = match portal.api().places().await {
        Ok(places) => Loaded::Ready(places),
        Err(ApiError::Network(e)) => {
            warn!(error = %e, "Failed to reach API for places");
            Loaded::Failed("Error loading places. Please check if the API is running.".into())
        }
        Err(e) => {
            warn!(error = %e, "Failed to load places");
            Loaded::Failed("Failed to load places.".into())
        }
    };

    // Read after the request: a 401 clears the session on the way.
    IndexView {
        authenticated: portal.session().is_authenticated(),
        places,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(id: &str, price: Option<f64>, country: Option<&str>) -> Place {
        Place {
            id: id.into(),
            name: format!("Place {id}"),
            price,
            country: country.map(str::to_string),
            ..Default::default()
        }
    }

    fn view() -> IndexView {
        IndexView {
            authenticated: false,
            places: Loaded::Ready(vec![
                place("a", Some(50.0), Some("France")),
                place("b", Some(100.0), Some("Spain")),
                place("c", Some(150.0), Some("France")),
                place("d", None, Some(" Italy ")),
                place("e", Some(10.0), None),
            ]),
        }
    }

    fn ids(places: Vec<&Place>) -> Vec<&str> {
        places.into_iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_price_filter_parse() {
        assert_eq!("all".parse::<PriceFilter>(), Ok(PriceFilter::All));
        assert_eq!("ALL".parse::<PriceFilter>(), Ok(PriceFilter::All));
        assert_eq!("100".parse::<PriceFilter>(), Ok(PriceFilter::Max(100.0)));
        assert_eq!("99.5".parse::<PriceFilter>(), Ok(PriceFilter::Max(99.5)));
        assert!("cheap".parse::<PriceFilter>().is_err());
        assert!("-1".parse::<PriceFilter>().is_err());
        assert!("NaN".parse::<PriceFilter>().is_err());
    }

    #[test]
    fn test_filter_by_max_price_is_inclusive() {
        let view = view();
        assert_eq!(ids(view.filtered(PriceFilter::Max(100.0), None)), ["a", "b", "e"]);
        assert_eq!(ids(view.filtered(PriceFilter::Max(10.0), None)), ["e"]);
    }

    #[test]
    fn test_all_keeps_unpriced_places() {
        let view = view();
        assert_eq!(ids(view.filtered(PriceFilter::All, None)), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_filter_by_country() {
        let view = view();
        assert_eq!(ids(view.filtered(PriceFilter::All, Some("France"))), ["a", "c"]);
        assert_eq!(ids(view.filtered(PriceFilter::All, Some("Italy"))), ["d"]);
        assert_eq!(ids(view.filtered(PriceFilter::All, Some(""))).len(), 5);
        assert_eq!(
            ids(view.filtered(PriceFilter::Max(100.0), Some("France"))),
            ["a"]
        );
    }

    #[test]
    fn test_countries_are_unique_and_sorted() {
        assert_eq!(view().countries(), ["France", "Italy", "Spain"]);
    }

    #[test]
    fn test_failed_view_has_nothing_to_filter() {
        let view = IndexView {
            authenticated: true,
            places: Loaded::Failed("Failed to load places.".into()),
        };
        assert!(view.countries().is_empty());
        assert!(view.filtered(PriceFilter::All, None).is_empty());
    }
}
