//! External data sources — the only modules that talk to third-party APIs.
//!
//! Each source is a trait so the analysis pipeline can run against real HTTP
//! clients in production and in-memory fakes in tests. `GooglePlacesClient`
//! implements the location traits, `DataForSeoClient` the SEO traits.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::models::{BacklinkMetrics, OnPageMetrics};

pub mod dataforseo;
pub mod google_places;

#[cfg(test)]
pub mod fakes;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The provider answered but reported a non-OK status of its own.
    #[error("{0}")]
    Upstream(String),

    /// A single task inside a batched envelope failed.
    #[error("Task error ({code}): {message}")]
    Task { code: u32, message: String },

    #[error("{0} credentials not configured")]
    NotConfigured(&'static str),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Safe-default outcome
// ────────────────────────────────────────────────────────────────────────────

/// Result of a per-item provider call after the safe-default policy is applied.
///
/// A failed call still carries a usable value (`T::default()`), so scoring and
/// recommendations read `value()` without caring whether the provider failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Fresh(T),
    Fallback { value: T, reason: String },
}

impl<T: Default> Outcome<T> {
    pub fn from_result(result: Result<T, ProviderError>) -> Self {
        match result {
            Ok(value) => Outcome::Fresh(value),
            Err(e) => Outcome::fallback(e.to_string()),
        }
    }

    pub fn fallback(reason: impl Into<String>) -> Self {
        Outcome::Fallback {
            value: T::default(),
            reason: reason.into(),
        }
    }
}

impl<T> Outcome<T> {
    pub fn value(&self) -> &T {
        match self {
            Outcome::Fresh(value) | Outcome::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Fresh(value) | Outcome::Fallback { value, .. } => value,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Outcome::Fresh(_) => None,
            Outcome::Fallback { reason, .. } => Some(reason),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Provider data
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: String,
}

/// Parameters of a radius search around a point.
#[derive(Debug, Clone)]
pub struct NearbySearch {
    pub lat: f64,
    pub lng: f64,
    pub radius_meters: f64,
    pub keyword: String,
}

/// A raw Local-Business Finder hit. The website needs a separate details lookup.
#[derive(Debug, Clone)]
pub struct NearbyPlace {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    pub review_count: u32,
}

/// Best text-search match for a named business.
#[derive(Debug, Clone)]
pub struct PlaceMatch {
    pub name: String,
    pub rating: Option<f64>,
    pub review_count: u32,
}

#[derive(Debug, Clone)]
pub struct SerpQuery {
    pub keyword: String,
    pub depth: u32,
}

/// One entry of a search-results page, as returned by the provider.
#[derive(Debug, Clone)]
pub struct SerpItem {
    pub item_type: String,
    pub position: u32,
    pub domain: String,
    pub url: String,
    pub title: String,
}

impl SerpItem {
    pub fn is_organic(&self) -> bool {
        self.item_type == "organic"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Traits
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeoLocation, ProviderError>;
}

#[async_trait]
pub trait BusinessFinder: Send + Sync {
    async fn nearby_search(&self, search: &NearbySearch) -> Result<Vec<NearbyPlace>, ProviderError>;

    async fn place_website(&self, place_id: &str) -> Result<Option<String>, ProviderError>;

    async fn find_place(&self, query: &str) -> Result<Option<PlaceMatch>, ProviderError>;
}

/// One keyword per call: the provider rejects batched live SERP tasks.
#[async_trait]
pub trait SerpSource: Send + Sync {
    async fn search(&self, query: &SerpQuery) -> Result<Vec<SerpItem>, ProviderError>;
}

/// One target domain per call.
#[async_trait]
pub trait BacklinkSource: Send + Sync {
    async fn backlink_summary(&self, domain: &str) -> Result<BacklinkMetrics, ProviderError>;
}

/// One request for all URLs. Entries come back positionally; the inner
/// vector may be shorter than the input when the provider drops tasks.
#[async_trait]
pub trait PageAuditor: Send + Sync {
    async fn audit_pages(
        &self,
        urls: &[String],
    ) -> Result<Vec<Result<OnPageMetrics, ProviderError>>, ProviderError>;
}

/// Every external source the pipeline needs, wired once at startup.
#[derive(Clone)]
pub struct Providers {
    pub geocoder: Arc<dyn Geocoder>,
    pub finder: Arc<dyn BusinessFinder>,
    pub serp: Arc<dyn SerpSource>,
    pub backlinks: Arc<dyn BacklinkSource>,
    pub pages: Arc<dyn PageAuditor>,
}
