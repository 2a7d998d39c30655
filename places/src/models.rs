//! Wire shapes for the places API.
//!
//! The raw search/details payloads are full of optional fields that vary per
//! place, so everything funnels through [`Restaurant`] with fixed defaults
//! before leaving this crate.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Normalized restaurant record. Immutable once built from an upstream place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub place_id: String,
    pub name: String,
    pub vicinity: String,
    pub rating: f64,
    pub user_ratings_total: u32,
    pub price_level: u8,
    pub photo_reference: String,
    pub location: LatLng,
    pub open_now: Option<bool>,
}

/// Slim record for autocomplete/text-search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSummary {
    pub place_id: String,
    pub name: String,
    pub address: String,
}

/// One page of search results plus the token granting the next page, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub restaurants: Vec<Restaurant>,
    pub next_page_token: Option<String>,
}

/// Proxied photo bytes with the upstream status and content type.
#[derive(Debug, Clone)]
pub struct Photo {
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Deserialize)]
pub(crate) struct SearchResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<Place>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct DetailsResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub result: Option<Place>,
}

#[derive(Deserialize)]
pub(crate) struct Place {
    pub place_id: String,
    pub name: String,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub photos: Vec<PhotoRef>,
    pub geometry: Geometry,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
}

#[derive(Deserialize)]
pub(crate) struct PhotoRef {
    #[serde(default)]
    pub photo_reference: String,
}

#[derive(Deserialize)]
pub(crate) struct Geometry {
    pub location: LatLng,
}

#[derive(Deserialize)]
pub(crate) struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
}

impl From<Place> for Restaurant {
    fn from(place: Place) -> Self {
        Self {
            place_id: place.place_id,
            name: place.name,
            vicinity: place
                .vicinity
                .or(place.formatted_address)
                .unwrap_or_default(),
            rating: place.rating.unwrap_or(0.0),
            user_ratings_total: place.user_ratings_total.unwrap_or(0),
            price_level: place.price_level.unwrap_or(0),
            photo_reference: place
                .photos
                .into_iter()
                .next()
                .map(|photo| photo.photo_reference)
                .unwrap_or_default(),
            location: place.geometry.location,
            open_now: place.opening_hours.and_then(|hours| hours.open_now),
        }
    }
}

impl From<Place> for PlaceSummary {
    fn from(place: Place) -> Self {
        Self {
            place_id: place.place_id,
            name: place.name,
            address: place
                .formatted_address
                .or(place.vicinity)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Place, PlaceSummary, Restaurant, SearchResponse};

    #[test]
    fn sparse_place_falls_back_to_defaults() {
        let place: Place = serde_json::from_value(json!({
            "place_id": "abc",
            "name": "Bare Bones Diner",
            "geometry": { "location": { "lat": 40.4, "lng": -86.9 } }
        }))
        .unwrap();

        let restaurant = Restaurant::from(place);
        assert_eq!(restaurant.vicinity, "");
        assert_eq!(restaurant.rating, 0.0);
        assert_eq!(restaurant.user_ratings_total, 0);
        assert_eq!(restaurant.price_level, 0);
        assert_eq!(restaurant.photo_reference, "");
        assert_eq!(restaurant.open_now, None);
    }

    #[test]
    fn full_place_keeps_reported_fields() {
        let place: Place = serde_json::from_value(json!({
            "place_id": "xyz",
            "name": "Triple Play",
            "vicinity": "100 State St",
            "rating": 4.5,
            "user_ratings_total": 321,
            "price_level": 2,
            "photos": [
                { "photo_reference": "ref-1" },
                { "photo_reference": "ref-2" }
            ],
            "geometry": { "location": { "lat": 40.4, "lng": -86.9 } },
            "opening_hours": { "open_now": false }
        }))
        .unwrap();

        let restaurant = Restaurant::from(place);
        assert_eq!(restaurant.rating, 4.5);
        assert_eq!(restaurant.user_ratings_total, 321);
        assert_eq!(restaurant.price_level, 2);
        // First photo wins.
        assert_eq!(restaurant.photo_reference, "ref-1");
        assert_eq!(restaurant.open_now, Some(false));
    }

    #[test]
    fn search_response_carries_optional_token() {
        let with_token: SearchResponse = serde_json::from_value(json!({
            "status": "OK",
            "results": [],
            "next_page_token": "tok"
        }))
        .unwrap();
        assert_eq!(with_token.next_page_token.as_deref(), Some("tok"));

        let without: SearchResponse =
            serde_json::from_value(json!({ "status": "OK" })).unwrap();
        assert!(without.next_page_token.is_none());
        assert!(without.results.is_empty());
    }

    #[test]
    fn summary_prefers_formatted_address() {
        let place: Place = serde_json::from_value(json!({
            "place_id": "p",
            "name": "Corner Cafe",
            "vicinity": "short",
            "formatted_address": "12 Corner St, Lafayette, IN",
            "geometry": { "location": { "lat": 1.0, "lng": 2.0 } }
        }))
        .unwrap();

        let summary = PlaceSummary::from(place);
        assert_eq!(summary.address, "12 Corner St, Lafayette, IN");
    }

    #[test]
    fn restaurant_serializes_absent_open_now_as_null() {
        let place: Place = serde_json::from_value(json!({
            "place_id": "abc",
            "name": "Diner",
            "geometry": { "location": { "lat": 0.0, "lng": 0.0 } }
        }))
        .unwrap();

        let value = serde_json::to_value(Restaurant::from(place)).unwrap();
        assert!(value.get("open_now").unwrap().is_null());
        assert_eq!(value["location"]["lat"], 0.0);
    }
}
