//! Scoring Engine — normalized 0–100 sub-scores and the weighted overall score.
//!
//! All divisions truncate toward zero. Integer arithmetic is used wherever the
//! operands allow it so that exact boundaries (e.g. 100.0) never land at 99.

use crate::analysis::models::{MetricsBundle, Scores};

/// Points for the practice's position on one keyword.
///
/// 1–3 → 100, 4–10 → 70, 11–20 → 40, deeper or not ranking → 10.
pub fn keyword_points(rank: Option<u32>) -> u32 {
    match rank {
        Some(1..=3) => 100,
        Some(4..=10) => 70,
        Some(11..=20) => 40,
        _ => 10,
    }
}

/// `100 * Σpoints / (100 * keyword_count)`.
pub fn keyword_score(practice: &MetricsBundle, keywords: &[String]) -> u32 {
    if keywords.is_empty() {
        return 0;
    }
    let raw_sum: u64 = keywords
        .iter()
        .map(|kw| keyword_points(practice.rankings.get(kw).copied()) as u64)
        .sum();
    (raw_sum / keywords.len() as u64) as u32
}

/// Practice authority rank relative to the strongest domain in the comparison set.
pub fn backlink_score(practice: &MetricsBundle, competitors: &[MetricsBundle]) -> u32 {
    let max_rank = competitors
        .iter()
        .map(|c| c.backlinks.rank)
        .chain(std::iter::once(practice.backlinks.rank))
        .max()
        .unwrap_or(0);

    if max_rank == 0 {
        return 0;
    }
    (practice.backlinks.rank as u64 * 100 / max_rank as u64) as u32
}

pub fn technical_score(practice: &MetricsBundle) -> u32 {
    practice.on_page.score.clamp(0.0, 100.0) as u32
}

/// `0.4·keywords + 0.3·backlinks + 0.3·technical`, truncated.
pub fn overall_score(keywords: u32, backlinks: u32, technical: u32) -> u32 {
    let keywords = keywords.min(100);
    let backlinks = backlinks.min(100);
    let technical = technical.min(100);
    (4 * keywords + 3 * backlinks + 3 * technical) / 10
}

pub fn calculate_scores(
    practice: &MetricsBundle,
    competitors: &[MetricsBundle],
    keywords: &[String],
) -> Scores {
    let keywords = keyword_score(practice, keywords);
    let backlinks = backlink_score(practice, competitors);
    let technical = technical_score(practice);

    Scores {
        overall: overall_score(keywords, backlinks, technical),
        keywords,
        backlinks,
        technical,
    }
}
