//! Google Maps Platform client: geocoding plus the Places search endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use super::{
    BusinessFinder, GeoLocation, Geocoder, NearbyPlace, NearbySearch, PlaceMatch, ProviderError,
};

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const NEARBY_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";
const PLACE_DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const TEXT_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
/// Nearby Search is always restricted to this place type; the keyword narrows the specialty.
const PLACE_TYPE: &str = "dentist";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
    #[serde(default)]
    formatted_address: String,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    #[serde(default)]
    place_id: String,
    #[serde(default)]
    name: String,
    vicinity: Option<String>,
    formatted_address: Option<String>,
    rating: Option<f64>,
    user_ratings_total: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    result: Option<DetailsResult>,
}

#[derive(Debug, Deserialize)]
struct DetailsResult {
    website: Option<String>,
}

/// Client for the Geocoding, Nearby Search, Place Details and Text Search APIs.
#[derive(Clone)]
pub struct GooglePlacesClient {
    client: Client,
    api_key: String,
}

impl GooglePlacesClient {
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, api_key })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured("Google Places"));
        }

        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl Geocoder for GooglePlacesClient {
    async fn geocode(&self, address: &str) -> Result<GeoLocation, ProviderError> {
        let data: GeocodeResponse = self
            .get_json(GEOCODE_URL, &[("address", address.to_string())])
            .await?;

        if data.status != "OK" {
            return Err(ProviderError::Upstream(format!(
                "Geocoding failed: {}",
                data.status
            )));
        }

        let first = data
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Upstream("Geocoding failed: no results".to_string()))?;

        debug!("Geocoded '{address}' to {}", first.formatted_address);

        Ok(GeoLocation {
            lat: first.geometry.location.lat,
            lng: first.geometry.location.lng,
            formatted_address: first.formatted_address,
        })
    }
}

#[async_trait]
impl BusinessFinder for GooglePlacesClient {
    async fn nearby_search(&self, search: &NearbySearch) -> Result<Vec<NearbyPlace>, ProviderError> {
        let data: PlacesResponse = self
            .get_json(
                NEARBY_SEARCH_URL,
                &[
                    ("location", format!("{},{}", search.lat, search.lng)),
                    ("radius", search.radius_meters.to_string()),
                    ("keyword", search.keyword.clone()),
                    ("type", PLACE_TYPE.to_string()),
                ],
            )
            .await?;

        if data.status != "OK" && data.status != "ZERO_RESULTS" {
            return Err(ProviderError::Upstream(format!(
                "Places API error: {}",
                data.status
            )));
        }

        debug!(
            "Nearby search for '{}' returned {} places",
            search.keyword,
            data.results.len()
        );

        Ok(data
            .results
            .into_iter()
            .map(|place| NearbyPlace {
                place_id: place.place_id,
                name: place.name,
                address: place
                    .vicinity
                    .or(place.formatted_address)
                    .unwrap_or_default(),
                rating: place.rating,
                review_count: place.user_ratings_total.unwrap_or(0),
            })
            .collect())
    }

    async fn place_website(&self, place_id: &str) -> Result<Option<String>, ProviderError> {
        let data: DetailsResponse = self
            .get_json(
                PLACE_DETAILS_URL,
                &[
                    ("place_id", place_id.to_string()),
                    ("fields", "website".to_string()),
                ],
            )
            .await?;

        Ok(data
            .result
            .and_then(|r| r.website)
            .filter(|w| !w.trim().is_empty()))
    }

    async fn find_place(&self, query: &str) -> Result<Option<PlaceMatch>, ProviderError> {
        let data: PlacesResponse = self
            .get_json(TEXT_SEARCH_URL, &[("query", query.to_string())])
            .await?;

        if data.status != "OK" {
            debug!("Text search for '{query}' returned status {}", data.status);
            return Ok(None);
        }

        Ok(data.results.into_iter().next().map(|place| PlaceMatch {
            name: place.name,
            rating: place.rating,
            review_count: place.user_ratings_total.unwrap_or(0),
        }))
    }
}
