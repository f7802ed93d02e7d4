//! Competitor discovery: nearby same-specialty practices, or a manual list.

use tracing::{debug, info, warn};

use crate::analysis::domain::normalize_domain;
use crate::analysis::models::{CompetitorCandidate, PracticeType, ReviewSummary};
use crate::providers::{BusinessFinder, GeoLocation, Geocoder, NearbySearch, ProviderError};

/// 7 miles.
pub const SEARCH_RADIUS_METERS: f64 = 11_265.38;
/// Raw nearby results inspected for a website.
const MAX_RAW_RESULTS: usize = 15;
pub const MAX_COMPETITORS: usize = 5;

/// Auto-mode discovery output.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub location: GeoLocation,
    pub competitors: Vec<CompetitorCandidate>,
}

/// Geocodes `address` and returns the top nearby practices that have a website.
///
/// Geocoding and nearby-search failures are fatal; a failed website lookup
/// only drops that one place.
pub async fn discover_competitors(
    geocoder: &dyn Geocoder,
    finder: &dyn BusinessFinder,
    address: &str,
    practice_type: PracticeType,
) -> Result<Discovery, ProviderError> {
    let location = geocoder.geocode(address).await?;

    let search = NearbySearch {
        lat: location.lat,
        lng: location.lng,
        radius_meters: SEARCH_RADIUS_METERS,
        keyword: practice_type.search_keyword().to_string(),
    };
    let places = finder.nearby_search(&search).await?;
    info!(
        "Found {} nearby places for '{}' near {}",
        places.len(),
        search.keyword,
        location.formatted_address
    );

    let mut competitors = Vec::new();
    for place in places.into_iter().take(MAX_RAW_RESULTS) {
        let website = match finder.place_website(&place.place_id).await {
            Ok(Some(website)) => website,
            Ok(None) => {
                debug!("Skipping {}: no website listed", place.name);
                continue;
            }
            Err(e) => {
                warn!("Website lookup failed for {}: {e}", place.name);
                continue;
            }
        };

        competitors.push(CompetitorCandidate {
            name: place.name,
            domain: normalize_domain(&website),
            website,
            address: Some(place.address),
            rating: place.rating,
            review_count: place.review_count,
        });
    }

    // Stable: equal review counts keep provider relevance order.
    competitors.sort_by(|a, b| b.review_count.cmp(&a.review_count));
    competitors.truncate(MAX_COMPETITORS);

    Ok(Discovery {
        location,
        competitors,
    })
}

/// Builds candidates from user-supplied URLs without contacting any provider.
pub fn manual_competitors(urls: &[String]) -> Vec<CompetitorCandidate> {
    urls.iter()
        .map(|url| normalize_domain(url))
        .filter(|domain| !domain.is_empty())
        .map(|domain| CompetitorCandidate {
            name: domain.clone(),
            website: format!("https://{domain}"),
            domain,
            address: None,
            rating: None,
            review_count: 0,
        })
        .collect()
}

/// Looks the practice up by name and address. Never fails: a miss or a
/// provider error yields no rating and zero reviews.
pub async fn lookup_practice_reviews(
    finder: &dyn BusinessFinder,
    practice_name: &str,
    address: &str,
) -> ReviewSummary {
    let query = format!("{practice_name} {address}");
    match finder.find_place(&query).await {
        Ok(Some(found)) => {
            info!(
                "Found practice listing '{}': {:?} stars, {} reviews",
                found.name, found.rating, found.review_count
            );
            ReviewSummary {
                rating: found.rating,
                review_count: found.review_count,
            }
        }
        Ok(None) => {
            info!("No listing found for practice '{practice_name}'");
            ReviewSummary::default()
        }
        Err(e) => {
            warn!("Practice review lookup failed: {e}");
            ReviewSummary::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::fakes::{place, FakeProviders};
    use crate::providers::PlaceMatch;

    fn with_places(n: usize) -> FakeProviders {
        let mut fake = FakeProviders::geocoded();
        for i in 0..n {
            let id = format!("p{i}");
            fake.nearby
                .push(place(&id, &format!("Practice {i}"), (i as u32 * 7) % 23, Some(4.5)));
            fake.websites
                .insert(id, format!("https://www.practice{i}.com/"));
        }
        fake
    }

    #[tokio::test]
    async fn test_auto_discovery_caps_at_five_sorted_by_reviews() {
        let fake = with_places(20);
        let found = discover_competitors(&fake, &fake, "1 Main St, Austin TX", PracticeType::General)
            .await
            .unwrap();

        assert!(found.competitors.len() <= MAX_COMPETITORS);
        assert_eq!(found.competitors.len(), 5);
        for pair in found.competitors.windows(2) {
            assert!(pair[0].review_count >= pair[1].review_count);
        }
    }

    #[tokio::test]
    async fn test_only_first_fifteen_raw_results_considered() {
        let mut fake = with_places(15);
        fake.nearby.push(place("late", "Late Entry", 10_000, Some(5.0)));
        fake.websites
            .insert("late".to_string(), "https://late.com".to_string());

        let found = discover_competitors(&fake, &fake, "addr", PracticeType::General)
            .await
            .unwrap();
        assert!(found.competitors.iter().all(|c| c.domain != "late.com"));
    }

    #[tokio::test]
    async fn test_places_without_website_are_discarded() {
        let mut fake = FakeProviders::geocoded();
        fake.nearby.push(place("a", "Has Site", 10, None));
        fake.nearby.push(place("b", "No Site", 500, None));
        fake.nearby.push(place("c", "Broken Lookup", 300, None));
        fake.websites
            .insert("a".to_string(), "https://www.hassite.com".to_string());
        fake.failing_details.insert("c".to_string());

        let found = discover_competitors(&fake, &fake, "addr", PracticeType::General)
            .await
            .unwrap();
        assert_eq!(found.competitors.len(), 1);
        assert_eq!(found.competitors[0].domain, "hassite.com");
    }

    #[tokio::test]
    async fn test_search_uses_radius_and_specialty_keyword() {
        let fake = with_places(1);
        discover_competitors(&fake, &fake, "addr", PracticeType::Orthodontist)
            .await
            .unwrap();
        let search = fake.last_nearby.lock().unwrap().clone().unwrap();
        assert_eq!(search.keyword, "orthodontist");
        assert!((search.radius_meters - 11_265.38).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_geocode_failure_is_fatal() {
        let fake = FakeProviders::default();
        let err = discover_competitors(&fake, &fake, "nowhere", PracticeType::General)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Geocoding failed: ZERO_RESULTS");
    }

    #[tokio::test]
    async fn test_nearby_error_status_is_fatal() {
        let mut fake = FakeProviders::geocoded();
        fake.nearby_error = Some("REQUEST_DENIED".to_string());
        let err = discover_competitors(&fake, &fake, "addr", PracticeType::General)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Places API error: REQUEST_DENIED");
    }

    #[test]
    fn test_manual_competitors_synthesized() {
        let urls = vec![
            "https://www.rival-dental.com/home".to_string(),
            "othersmiles.net".to_string(),
        ];
        let competitors = manual_competitors(&urls);
        assert_eq!(competitors.len(), 2);
        assert_eq!(competitors[0].name, "rival-dental.com");
        assert_eq!(competitors[0].website, "https://rival-dental.com");
        assert_eq!(competitors[0].rating, None);
        assert_eq!(competitors[1].review_count, 0);
    }

    #[tokio::test]
    async fn test_review_lookup_takes_match() {
        let mut fake = FakeProviders::default();
        fake.practice_match = Some(PlaceMatch {
            name: "Bright Smiles".to_string(),
            rating: Some(4.7),
            review_count: 212,
        });
        let summary = lookup_practice_reviews(&fake, "Bright Smiles", "1 Main St").await;
        assert_eq!(summary.rating, Some(4.7));
        assert_eq!(summary.review_count, 212);
    }

    #[tokio::test]
    async fn test_review_lookup_failure_defaults() {
        let mut fake = FakeProviders::default();
        fake.find_place_fails = true;
        let summary = lookup_practice_reviews(&fake, "Bright Smiles", "1 Main St").await;
        assert_eq!(summary, ReviewSummary::default());

        let miss = lookup_practice_reviews(&FakeProviders::default(), "X", "Y").await;
        assert_eq!(miss.rating, None);
        assert_eq!(miss.review_count, 0);
    }
}
