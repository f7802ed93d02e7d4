//! Report assembly: joins collected data into metrics bundles, then runs
//! scoring, recommendations and the keyword comparison table.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::analysis::collectors::KeywordRankings;
use crate::analysis::models::{
    BacklinkMetrics, CompetitorCandidate, DirectoryListing, KeywordComparison, KeywordSummary,
    MetricsBundle, OnPageMetrics, PracticeProfile, Report, ReviewSummary,
};
use crate::analysis::recommendations::generate_recommendations;
use crate::analysis::scoring::calculate_scores;

const SUMMARY_SIZE: usize = 5;
const TOP_TEN: u32 = 10;

/// keyword → position for one domain.
pub type RankMap = HashMap<String, u32>;

/// Rankings split per site.
#[derive(Debug, Default)]
pub struct RankingTable {
    pub practice: RankMap,
    pub competitors: HashMap<String, RankMap>,
}

impl RankingTable {
    pub fn competitor(&self, domain: &str) -> RankMap {
        self.competitors.get(domain).cloned().unwrap_or_default()
    }
}

fn record_best(map: &mut RankMap, keyword: &str, position: u32) {
    map.entry(keyword.to_string())
        .and_modify(|best| *best = (*best).min(position))
        .or_insert(position);
}

/// Attributes each organic result to the practice or a competitor domain.
/// When a domain shows up more than once for a keyword, its best position wins.
pub fn split_rankings(
    rankings: &[KeywordRankings],
    practice_domain: &str,
    competitor_domains: &[String],
) -> RankingTable {
    let mut table = RankingTable {
        practice: RankMap::new(),
        competitors: competitor_domains
            .iter()
            .map(|d| (d.clone(), RankMap::new()))
            .collect(),
    };

    for entry in rankings {
        for result in entry.results.value() {
            if result.domain == practice_domain {
                record_best(&mut table.practice, &entry.keyword, result.position);
            } else if let Some(map) = table.competitors.get_mut(&result.domain) {
                record_best(map, &entry.keyword, result.position);
            }
        }
    }

    table
}

pub fn practice_bundle(
    profile: &PracticeProfile,
    reviews: ReviewSummary,
    backlinks: BacklinkMetrics,
    on_page: OnPageMetrics,
    rankings: RankMap,
) -> MetricsBundle {
    MetricsBundle {
        name: profile.name.clone(),
        domain: profile.domain.clone(),
        website: profile.website_url.clone(),
        backlinks,
        on_page,
        rankings,
        rating: reviews.rating,
        review_count: reviews.review_count,
    }
}

pub fn competitor_bundle(
    candidate: &CompetitorCandidate,
    backlinks: BacklinkMetrics,
    on_page: OnPageMetrics,
    rankings: RankMap,
) -> MetricsBundle {
    MetricsBundle {
        name: candidate.name.clone(),
        domain: candidate.domain.clone(),
        website: candidate.website.clone(),
        backlinks,
        on_page,
        rankings,
        rating: candidate.rating,
        review_count: candidate.review_count,
    }
}

/// One row per keyword, in keyword order. The first competitor with the
/// lowest position is named as the best competitor.
pub fn keyword_comparisons(
    keywords: &[String],
    practice: &MetricsBundle,
    competitors: &[MetricsBundle],
) -> Vec<KeywordComparison> {
    keywords
        .iter()
        .map(|keyword| {
            let mut best: Option<(u32, &str)> = None;
            let mut sum = 0_u64;
            let mut count = 0_u64;

            for competitor in competitors {
                let Some(&rank) = competitor.rankings.get(keyword) else {
                    continue;
                };
                sum += rank as u64;
                count += 1;
                if best.map_or(true, |(best_rank, _)| rank < best_rank) {
                    best = Some((rank, competitor.name.as_str()));
                }
            }

            KeywordComparison {
                keyword: keyword.clone(),
                practice_rank: practice.rankings.get(keyword).copied(),
                best_competitor_rank: best.map(|(rank, _)| rank),
                best_competitor: best.map(|(_, name)| name.to_string()),
                avg_competitor_rank: (count > 0).then(|| (sum / count) as u32),
            }
        })
        .collect()
}

/// Top 5 by practice position, and top 5 to improve: keywords the practice
/// does not rank for come first, then those ranked below the top 10.
pub fn keyword_summary(comparisons: &[KeywordComparison]) -> KeywordSummary {
    let mut ranked: Vec<&KeywordComparison> = comparisons
        .iter()
        .filter(|c| c.practice_rank.is_some())
        .collect();
    ranked.sort_by_key(|c| c.practice_rank);

    let mut poor: Vec<&KeywordComparison> = ranked
        .iter()
        .copied()
        .filter(|c| c.practice_rank.is_some_and(|rank| rank > TOP_TEN))
        .collect();
    poor.sort_by_key(|c| c.practice_rank);

    let to_improve = comparisons
        .iter()
        .filter(|c| c.practice_rank.is_none())
        .chain(poor)
        .take(SUMMARY_SIZE)
        .cloned()
        .collect();

    KeywordSummary {
        total_keywords: comparisons.len(),
        ranking_count: ranked.len(),
        top_ranking: ranked.into_iter().take(SUMMARY_SIZE).cloned().collect(),
        to_improve,
    }
}

pub fn build_report(
    id: Uuid,
    profile: &PracticeProfile,
    practice: MetricsBundle,
    competitors: Vec<MetricsBundle>,
    keywords: &[String],
    directory_listings: Vec<DirectoryListing>,
) -> Report {
    let scores = calculate_scores(&practice, &competitors, keywords);
    let recommendations = generate_recommendations(
        &practice,
        &competitors,
        keywords.len(),
        Some(&directory_listings),
    );
    let keyword_data = keyword_comparisons(keywords, &practice, &competitors);
    let keyword_summary = keyword_summary(&keyword_data);

    Report {
        id,
        practice_name: profile.name.clone(),
        practice_website: profile.website_url.clone(),
        created_at: Utc::now(),
        scores,
        practice_data: practice,
        competitors,
        recommendations,
        keyword_data,
        keyword_summary,
        directory_listings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::collectors::RankedResult;
    use crate::providers::Outcome;

    fn ranked(keyword: &str, hits: &[(u32, &str)]) -> KeywordRankings {
        KeywordRankings {
            keyword: keyword.to_string(),
            results: Outcome::Fresh(
                hits.iter()
                    .map(|(position, domain)| RankedResult {
                        position: *position,
                        domain: domain.to_string(),
                        title: String::new(),
                    })
                    .collect(),
            ),
        }
    }

    fn bundle(name: &str, rankings: &[(&str, u32)]) -> MetricsBundle {
        MetricsBundle {
            name: name.to_string(),
            domain: format!("{name}.com"),
            website: format!("https://{name}.com"),
            backlinks: BacklinkMetrics::default(),
            on_page: OnPageMetrics::default(),
            rankings: rankings.iter().map(|(k, r)| (k.to_string(), *r)).collect(),
            rating: None,
            review_count: 0,
        }
    }

    fn comparison(keyword: &str, practice_rank: Option<u32>) -> KeywordComparison {
        KeywordComparison {
            keyword: keyword.to_string(),
            practice_rank,
            best_competitor_rank: None,
            best_competitor: None,
            avg_competitor_rank: None,
        }
    }

    #[test]
    fn test_split_rankings_attributes_domains_and_keeps_best() {
        let rankings = vec![
            ranked("dentist near me", &[(2, "rival.com"), (5, "mine.com"), (9, "rival.com")]),
            ranked("root canal", &[(12, "mine.com"), (3, "mine.com"), (1, "stranger.com")]),
            KeywordRankings {
                keyword: "veneers".to_string(),
                results: Outcome::fallback("Task error (50000): Internal Error"),
            },
        ];
        let table = split_rankings(&rankings, "mine.com", &["rival.com".to_string()]);

        assert_eq!(table.practice.get("dentist near me"), Some(&5));
        assert_eq!(table.practice.get("root canal"), Some(&3));
        assert_eq!(table.practice.get("veneers"), None);
        assert_eq!(table.competitor("rival.com").get("dentist near me"), Some(&2));
        assert!(table.competitor("stranger.com").is_empty());
    }

    #[test]
    fn test_keyword_comparisons_best_and_average() {
        let keywords = vec!["a".to_string(), "b".to_string()];
        let practice = bundle("mine", &[("a", 4)]);
        let competitors = vec![
            bundle("first", &[("a", 7)]),
            bundle("second", &[("a", 2)]),
            bundle("third", &[("a", 2)]),
        ];
        let rows = keyword_comparisons(&keywords, &practice, &competitors);

        assert_eq!(rows[0].practice_rank, Some(4));
        assert_eq!(rows[0].best_competitor_rank, Some(2));
        assert_eq!(rows[0].best_competitor.as_deref(), Some("second"));
        // (7 + 2 + 2) / 3 = 3
        assert_eq!(rows[0].avg_competitor_rank, Some(3));

        assert_eq!(rows[1].practice_rank, None);
        assert_eq!(rows[1].best_competitor, None);
        assert_eq!(rows[1].avg_competitor_rank, None);
    }

    #[test]
    fn test_keyword_summary_ordering() {
        let rows = vec![
            comparison("k1", Some(15)),
            comparison("k2", None),
            comparison("k3", Some(2)),
            comparison("k4", Some(12)),
            comparison("k5", None),
            comparison("k6", Some(1)),
        ];
        let summary = keyword_summary(&rows);

        assert_eq!(summary.total_keywords, 6);
        assert_eq!(summary.ranking_count, 4);
        let top: Vec<&str> = summary.top_ranking.iter().map(|c| c.keyword.as_str()).collect();
        assert_eq!(top, vec!["k6", "k3", "k4", "k1"]);
        let improve: Vec<&str> = summary.to_improve.iter().map(|c| c.keyword.as_str()).collect();
        assert_eq!(improve, vec!["k2", "k5", "k4", "k1"]);
    }

    #[test]
    fn test_keyword_summary_caps_at_five() {
        let rows: Vec<KeywordComparison> = (0..8)
            .map(|i| comparison(&format!("k{i}"), Some(i + 1)))
            .chain((0..8).map(|i| comparison(&format!("n{i}"), None)))
            .collect();
        let summary = keyword_summary(&rows);
        assert_eq!(summary.top_ranking.len(), 5);
        assert_eq!(summary.to_improve.len(), 5);
        assert!(summary.to_improve.iter().all(|c| c.practice_rank.is_none()));
    }

    #[test]
    fn test_build_report_serializes_camel_case() {
        let profile = PracticeProfile {
            name: "Bright Smiles".to_string(),
            address: "1 Main St, Austin TX".to_string(),
            website_url: "https://brightsmiles.com".to_string(),
            domain: "brightsmiles.com".to_string(),
            practice_type: Default::default(),
            competitor_mode: Default::default(),
            manual_competitors: Vec::new(),
        };
        let keywords = vec!["a".to_string()];
        let practice = bundle("brightsmiles", &[("a", 1)]);
        let report = build_report(Uuid::new_v4(), &profile, practice, Vec::new(), &keywords, Vec::new());

        assert_eq!(report.scores.keywords, 100);
        assert_eq!(report.keyword_summary.ranking_count, 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["practiceName"], "Bright Smiles");
        assert!(json["keywordSummary"]["top5Ranking"].is_array());
        assert!(json["keywordData"][0]["practiceRank"].is_number());
        assert!(json["createdAt"].is_string());
    }
}
