//! In-memory provider used by unit tests. Implements every source trait.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{
    BacklinkSource, BusinessFinder, GeoLocation, Geocoder, NearbyPlace, NearbySearch, PageAuditor,
    PlaceMatch, ProviderError, Providers, SerpItem, SerpQuery, SerpSource,
};
use crate::analysis::models::{BacklinkMetrics, OnPageMetrics};

#[derive(Default)]
pub struct FakeProviders {
    pub geo: Option<GeoLocation>,
    pub nearby: Vec<NearbyPlace>,
    pub nearby_error: Option<String>,
    pub websites: HashMap<String, String>,
    pub failing_details: HashSet<String>,
    pub practice_match: Option<PlaceMatch>,
    pub find_place_fails: bool,
    pub serp: HashMap<String, Vec<SerpItem>>,
    pub failing_keywords: HashSet<String>,
    pub backlinks: HashMap<String, BacklinkMetrics>,
    pub failing_domains: HashSet<String>,
    pub pages: HashMap<String, OnPageMetrics>,
    pub failing_urls: HashSet<String>,
    pub pages_batch_fails: bool,
    /// Drop trailing entries from the audit response.
    pub pages_returned: Option<usize>,
    pub serp_calls: AtomicUsize,
    pub last_nearby: Mutex<Option<NearbySearch>>,
}

impl FakeProviders {
    pub fn geocoded() -> Self {
        Self {
            geo: Some(GeoLocation {
                lat: 30.2672,
                lng: -97.7431,
                formatted_address: "Austin, TX, USA".to_string(),
            }),
            ..Self::default()
        }
    }

    pub fn into_providers(self) -> (Arc<FakeProviders>, Providers) {
        let fake = Arc::new(self);
        let providers = Providers {
            geocoder: fake.clone(),
            finder: fake.clone(),
            serp: fake.clone(),
            backlinks: fake.clone(),
            pages: fake.clone(),
        };
        (fake, providers)
    }

    pub fn serp_call_count(&self) -> usize {
        self.serp_calls.load(Ordering::SeqCst)
    }
}

pub fn place(id: &str, name: &str, reviews: u32, rating: Option<f64>) -> NearbyPlace {
    NearbyPlace {
        place_id: id.to_string(),
        name: name.to_string(),
        address: format!("{name} address"),
        rating,
        review_count: reviews,
    }
}

pub fn organic(position: u32, domain: &str) -> SerpItem {
    SerpItem {
        item_type: "organic".to_string(),
        position,
        domain: domain.to_string(),
        url: format!("https://{domain}/"),
        title: format!("{domain} title"),
    }
}

#[async_trait]
impl Geocoder for FakeProviders {
    async fn geocode(&self, _address: &str) -> Result<GeoLocation, ProviderError> {
        self.geo
            .clone()
            .ok_or_else(|| ProviderError::Upstream("Geocoding failed: ZERO_RESULTS".to_string()))
    }
}

#[async_trait]
impl BusinessFinder for FakeProviders {
    async fn nearby_search(&self, search: &NearbySearch) -> Result<Vec<NearbyPlace>, ProviderError> {
        if let Ok(mut last) = self.last_nearby.lock() {
            *last = Some(search.clone());
        }
        match &self.nearby_error {
            Some(status) => Err(ProviderError::Upstream(format!("Places API error: {status}"))),
            None => Ok(self.nearby.clone()),
        }
    }

    async fn place_website(&self, place_id: &str) -> Result<Option<String>, ProviderError> {
        if self.failing_details.contains(place_id) {
            return Err(ProviderError::Upstream("Place Details error".to_string()));
        }
        Ok(self.websites.get(place_id).cloned())
    }

    async fn find_place(&self, _query: &str) -> Result<Option<PlaceMatch>, ProviderError> {
        if self.find_place_fails {
            return Err(ProviderError::Upstream("OVER_QUERY_LIMIT".to_string()));
        }
        Ok(self.practice_match.clone())
    }
}

#[async_trait]
impl SerpSource for FakeProviders {
    async fn search(&self, query: &SerpQuery) -> Result<Vec<SerpItem>, ProviderError> {
        self.serp_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_keywords.contains(&query.keyword) {
            return Err(ProviderError::Task {
                code: 50000,
                message: "Internal Error".to_string(),
            });
        }
        Ok(self.serp.get(&query.keyword).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl BacklinkSource for FakeProviders {
    async fn backlink_summary(&self, domain: &str) -> Result<BacklinkMetrics, ProviderError> {
        if self.failing_domains.contains(domain) {
            return Err(ProviderError::Task {
                code: 40501,
                message: "Invalid Field".to_string(),
            });
        }
        Ok(self.backlinks.get(domain).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl PageAuditor for FakeProviders {
    async fn audit_pages(
        &self,
        urls: &[String],
    ) -> Result<Vec<Result<OnPageMetrics, ProviderError>>, ProviderError> {
        if self.pages_batch_fails {
            return Err(ProviderError::Api {
                status: 502,
                message: "Bad Gateway".to_string(),
            });
        }
        let returned = self.pages_returned.unwrap_or(urls.len()).min(urls.len());
        Ok(urls[..returned]
            .iter()
            .map(|url| {
                if self.failing_urls.contains(url) {
                    Err(ProviderError::Malformed("no page data returned".to_string()))
                } else {
                    Ok(self.pages.get(url).cloned().unwrap_or_default())
                }
            })
            .collect())
    }
}
