//! Per-item data collection with the safe-default policy applied.
//!
//! Every batch runs item by item; one failed keyword, domain or URL is logged
//! and replaced with its default value while the rest of the batch continues.

use tracing::{debug, warn};

use crate::analysis::domain::normalize_domain;
use crate::analysis::models::{BacklinkMetrics, OnPageMetrics};
use crate::providers::{BacklinkSource, Outcome, PageAuditor, SerpQuery, SerpSource};

/// Result depth requested per ranking query.
pub const RANKING_DEPTH: u32 = 20;

/// One organic search result with its domain normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub position: u32,
    pub domain: String,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct KeywordRankings {
    pub keyword: String,
    pub results: Outcome<Vec<RankedResult>>,
}

/// Rank Tracker: one query per keyword, organic results only.
pub async fn collect_rankings(serp: &dyn SerpSource, keywords: &[String]) -> Vec<KeywordRankings> {
    let mut collected = Vec::with_capacity(keywords.len());

    for keyword in keywords {
        let query = SerpQuery {
            keyword: keyword.clone(),
            depth: RANKING_DEPTH,
        };
        let results = match serp.search(&query).await {
            Ok(items) => {
                let organic: Vec<RankedResult> = items
                    .into_iter()
                    .filter(|item| item.is_organic())
                    .map(|item| RankedResult {
                        position: item.position,
                        domain: normalize_domain(&item.domain),
                        title: item.title,
                    })
                    .collect();
                debug!("SERP for '{keyword}': {} organic results", organic.len());
                Outcome::Fresh(organic)
            }
            Err(e) => {
                warn!("SERP lookup failed for '{keyword}': {e}");
                Outcome::fallback(e.to_string())
            }
        };
        collected.push(KeywordRankings {
            keyword: keyword.clone(),
            results,
        });
    }

    collected
}

/// Backlink Authority: one query per domain, aligned with `domains`.
pub async fn collect_backlinks(
    source: &dyn BacklinkSource,
    domains: &[String],
) -> Vec<Outcome<BacklinkMetrics>> {
    let mut collected = Vec::with_capacity(domains.len());

    for domain in domains {
        let outcome = Outcome::from_result(source.backlink_summary(domain).await);
        match outcome.failure() {
            Some(reason) => warn!("Backlinks lookup failed for {domain}: {reason}"),
            None => debug!("Backlinks for {domain}: rank={}", outcome.value().rank),
        }
        collected.push(outcome);
    }

    collected
}

/// On-Page Auditor: one batched request. The output always has one entry per
/// input URL, in input order.
pub async fn collect_on_page(auditor: &dyn PageAuditor, urls: &[String]) -> Vec<Outcome<OnPageMetrics>> {
    if urls.is_empty() {
        return Vec::new();
    }

    let entries = match auditor.audit_pages(urls).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("On-page audit request failed for {} URLs: {e}", urls.len());
            let reason = e.to_string();
            return urls.iter().map(|_| Outcome::fallback(reason.clone())).collect();
        }
    };

    let mut entries = entries.into_iter();
    urls.iter()
        .map(|url| {
            let outcome = match entries.next() {
                Some(result) => Outcome::from_result(result),
                None => Outcome::fallback("no audit entry returned"),
            };
            if let Some(reason) = outcome.failure() {
                warn!("On-page audit failed for {url}: {reason}");
            }
            outcome
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::fakes::{organic, FakeProviders};
    use crate::providers::SerpItem;

    fn keywords(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    #[tokio::test]
    async fn test_failed_keyword_does_not_stop_batch() {
        let mut fake = FakeProviders::default();
        fake.serp.insert("dentist near me".to_string(), vec![organic(1, "www.a.com")]);
        fake.serp.insert("root canal".to_string(), vec![organic(4, "b.com")]);
        fake.failing_keywords.insert("teeth whitening".to_string());

        let collected = collect_rankings(
            &fake,
            &keywords(&["dentist near me", "teeth whitening", "root canal"]),
        )
        .await;

        assert_eq!(collected.len(), 3);
        assert_eq!(collected[0].results.value()[0].domain, "a.com");
        assert!(collected[1].results.value().is_empty());
        assert!(collected[1].results.failure().is_some());
        assert_eq!(collected[2].results.value()[0].position, 4);
        assert_eq!(fake.serp_call_count(), 3);
    }

    #[tokio::test]
    async fn test_non_organic_results_discarded() {
        let mut fake = FakeProviders::default();
        let ad = SerpItem {
            item_type: "paid".to_string(),
            ..organic(1, "ads.com")
        };
        fake.serp
            .insert("local dentist".to_string(), vec![ad, organic(2, "real.com")]);

        let collected = collect_rankings(&fake, &keywords(&["local dentist"])).await;
        let results = collected[0].results.value();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].domain, "real.com");
    }

    #[tokio::test]
    async fn test_backlink_failure_defaults_and_continues() {
        let mut fake = FakeProviders::default();
        fake.backlinks.insert(
            "b.com".to_string(),
            BacklinkMetrics {
                rank: 40,
                backlinks: 900,
                referring_domains: 55,
            },
        );
        fake.failing_domains.insert("a.com".to_string());

        let collected = collect_backlinks(&fake, &keywords(&["a.com", "b.com"])).await;
        assert_eq!(collected[0].value(), &BacklinkMetrics::default());
        assert!(collected[0].failure().is_some());
        assert_eq!(collected[1].value().rank, 40);
    }

    #[tokio::test]
    async fn test_on_page_alignment_with_missing_and_failed_entries() {
        let urls = keywords(&["https://a.com", "https://b.com", "https://c.com"]);
        let mut fake = FakeProviders::default();
        fake.pages.insert(
            "https://a.com".to_string(),
            OnPageMetrics {
                score: 91.0,
                title: "A".to_string(),
                status_code: 200,
            },
        );
        fake.failing_urls.insert("https://b.com".to_string());
        fake.pages_returned = Some(2);

        let collected = collect_on_page(&fake, &urls).await;
        assert_eq!(collected.len(), 3);
        assert_eq!(collected[0].value().score, 91.0);
        assert_eq!(collected[1].value(), &OnPageMetrics::default());
        assert_eq!(collected[2].value(), &OnPageMetrics::default());
        assert!(collected[2].failure().is_some());
    }

    #[tokio::test]
    async fn test_on_page_batch_failure_defaults_every_url() {
        let urls = keywords(&["https://a.com", "https://b.com"]);
        let mut fake = FakeProviders::default();
        fake.pages_batch_fails = true;

        let collected = collect_on_page(&fake, &urls).await;
        assert_eq!(collected.len(), 2);
        assert!(collected.iter().all(|o| o.failure().is_some()));
    }
}
