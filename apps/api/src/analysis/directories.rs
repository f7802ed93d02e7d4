//! Directory-presence checks against the listing sites patients use.

use tracing::{info, warn};

use crate::analysis::models::{DirectoryListing, Importance};
use crate::providers::{SerpQuery, SerpSource};

/// Result depth for a site-scoped presence query.
const DIRECTORY_DEPTH: u32 = 10;

pub struct Directory {
    pub name: &'static str,
    pub domain: &'static str,
    pub importance: Importance,
}

pub static DENTAL_DIRECTORIES: [Directory; 10] = [
    Directory { name: "Healthgrades", domain: "healthgrades.com", importance: Importance::Critical },
    Directory { name: "Zocdoc", domain: "zocdoc.com", importance: Importance::Critical },
    Directory { name: "Yelp", domain: "yelp.com", importance: Importance::Critical },
    Directory { name: "Facebook", domain: "facebook.com", importance: Importance::Critical },
    Directory { name: "Vitals", domain: "vitals.com", importance: Importance::High },
    Directory { name: "WebMD", domain: "doctor.webmd.com", importance: Importance::High },
    Directory { name: "Yellow Pages", domain: "yellowpages.com", importance: Importance::Medium },
    Directory { name: "1-800-Dentist", domain: "1800dentist.com", importance: Importance::Medium },
    Directory { name: "Dentistry.com", domain: "dentistry.com", importance: Importance::Medium },
    Directory { name: "Smile Guide", domain: "smileguide.com", importance: Importance::Low },
];

pub fn presence_query(practice_name: &str, directory_domain: &str) -> String {
    format!("\"{practice_name}\" site:{directory_domain}")
}

/// Issues one site-scoped search per directory, sequentially. The first
/// organic hit marks the practice as listed there.
pub async fn check_directory_listings(
    serp: &dyn SerpSource,
    practice_name: &str,
) -> Vec<DirectoryListing> {
    let mut listings = Vec::with_capacity(DENTAL_DIRECTORIES.len());

    for directory in &DENTAL_DIRECTORIES {
        let query = SerpQuery {
            keyword: presence_query(practice_name, directory.domain),
            depth: DIRECTORY_DEPTH,
        };

        let mut listing = DirectoryListing {
            directory: directory.name.to_string(),
            domain: directory.domain.to_string(),
            importance: directory.importance,
            found: false,
            url: None,
            title: None,
            error: None,
        };

        match serp.search(&query).await {
            Ok(items) => {
                if let Some(hit) = items.into_iter().find(|item| item.is_organic()) {
                    listing.found = true;
                    listing.url = Some(hit.url);
                    listing.title = Some(hit.title);
                }
                info!(
                    "Directory {}: {}",
                    directory.name,
                    if listing.found { "found" } else { "not found" }
                );
            }
            Err(e) => {
                warn!("Directory check failed for {}: {e}", directory.name);
                listing.error = Some(e.to_string());
            }
        }

        listings.push(listing);
    }

    listings
}
