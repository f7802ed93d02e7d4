//! Recommendation Engine — deterministic rules comparing the practice with
//! its competitors and its directory coverage.
//!
//! Rules run in a fixed order and each appends at most one finding (the
//! directory rule may append up to three). Every description quotes the
//! numbers that triggered it.

use crate::analysis::models::{
    Category, DirectoryListing, Importance, MetricsBundle, Priority, Recommendation,
};

/// Rank at or below which a keyword counts as top 10.
const TOP_TEN: u32 = 10;
const TECHNICAL_THRESHOLD: f64 = 70.0;
const RATING_FLOOR: f64 = 4.0;
const RATING_MARGIN: f64 = 0.3;

fn finding(priority: Priority, category: Category, title: &str, description: String) -> Recommendation {
    Recommendation {
        priority,
        category,
        title: title.to_string(),
        description,
    }
}

/// Mean of `values`; 0 when there are none.
fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

pub fn generate_recommendations(
    practice: &MetricsBundle,
    competitors: &[MetricsBundle],
    tracked_keywords: usize,
    directory_listings: Option<&[DirectoryListing]>,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    // Domain authority
    let avg_rank = average(competitors.iter().map(|c| c.backlinks.rank as f64));
    if (practice.backlinks.rank as f64) < avg_rank * 0.5 {
        recommendations.push(finding(
            Priority::High,
            Category::Backlinks,
            "Build Domain Authority",
            format!(
                "Your domain rank ({}) is below the competitor average ({}). Focus on acquiring quality backlinks from dental directories and local business listings.",
                practice.backlinks.rank, avg_rank as u64
            ),
        ));
    }

    // Technical SEO
    if practice.on_page.score < TECHNICAL_THRESHOLD {
        recommendations.push(finding(
            Priority::Critical,
            Category::Technical,
            "Improve Technical SEO",
            format!(
                "Your on-page SEO score is {}/100. Address technical issues like page speed, meta tags, and mobile optimization.",
                practice.on_page.score.max(0.0) as u32
            ),
        ));
    }

    // Keyword coverage
    let top_ten = practice.rankings.values().filter(|&&rank| rank <= TOP_TEN).count();
    if top_ten == 0 {
        recommendations.push(finding(
            Priority::Critical,
            Category::Keywords,
            "No Keywords in Top 10",
            format!(
                "0 of your {tracked_keywords} tracked dental keywords rank in the top 10 search results. Focus on optimizing your homepage and service pages for key dental terms."
            ),
        ));
    } else if top_ten < 3 {
        recommendations.push(finding(
            Priority::High,
            Category::Keywords,
            "Improve Keyword Rankings",
            format!(
                "You have only {top_ten} keywords in the top 10. Create dedicated landing pages for more dental services."
            ),
        ));
    }

    // Referring domains
    let avg_referring = average(competitors.iter().map(|c| c.backlinks.referring_domains as f64));
    if (practice.backlinks.referring_domains as f64) < avg_referring * 0.5 {
        recommendations.push(finding(
            Priority::Medium,
            Category::Backlinks,
            "Increase Referring Domains",
            format!(
                "You have {} referring domains vs competitor average of {}. Pursue link building through local partnerships.",
                practice.backlinks.referring_domains, avg_referring as u64
            ),
        ));
    }

    review_count_rule(practice, competitors, &mut recommendations);
    rating_rule(practice, competitors, &mut recommendations);

    if let Some(listings) = directory_listings.filter(|l| !l.is_empty()) {
        directory_rule(listings, &mut recommendations);
    }

    recommendations
}

/// Only competitors with a known, non-zero review count form the baseline.
fn review_count_rule(
    practice: &MetricsBundle,
    competitors: &[MetricsBundle],
    recommendations: &mut Vec<Recommendation>,
) {
    let reviews: Vec<u32> = competitors
        .iter()
        .map(|c| c.review_count)
        .filter(|&count| count > 0)
        .collect();
    let Some(&max_reviews) = reviews.iter().max() else {
        return;
    };
    let avg_reviews = average(reviews.iter().map(|&r| r as f64));
    let practice_reviews = practice.review_count;

    if practice_reviews == 0 {
        recommendations.push(finding(
            Priority::Critical,
            Category::Reviews,
            "No Google Reviews Found",
            format!(
                "We couldn't find Google reviews for your practice (0 reviews). Your competitors average {} reviews. Claim your Google Business Profile and start asking satisfied patients for reviews.",
                avg_reviews as u64
            ),
        ));
    } else if (practice_reviews as f64) < avg_reviews * 0.5 {
        recommendations.push(finding(
            Priority::High,
            Category::Reviews,
            "Increase Google Reviews",
            format!(
                "You have {practice_reviews} Google reviews vs competitor average of {}. Reviews are a major local ranking factor. Implement a systematic review request process for satisfied patients.",
                avg_reviews as u64
            ),
        ));
    } else if (practice_reviews as f64) < avg_reviews {
        recommendations.push(finding(
            Priority::Medium,
            Category::Reviews,
            "Build More Reviews",
            format!(
                "You have {practice_reviews} reviews, below the competitor average of {}. The top competitor has {max_reviews} reviews. Continue encouraging happy patients to leave reviews.",
                avg_reviews as u64
            ),
        ));
    }
}

fn rating_rule(
    practice: &MetricsBundle,
    competitors: &[MetricsBundle],
    recommendations: &mut Vec<Recommendation>,
) {
    let Some(rating) = practice.rating.filter(|r| *r > 0.0) else {
        return;
    };
    let ratings: Vec<f64> = competitors
        .iter()
        .filter_map(|c| c.rating)
        .filter(|r| *r > 0.0)
        .collect();
    if ratings.is_empty() {
        return;
    }
    let avg_rating = average(ratings.iter().copied());

    if rating < RATING_FLOOR {
        recommendations.push(finding(
            Priority::Critical,
            Category::Reviews,
            "Improve Google Rating",
            format!(
                "Your {rating}-star rating is below the 4.0 threshold that patients look for. Focus on patient experience and address any negative reviews professionally."
            ),
        ));
    } else if rating < avg_rating - RATING_MARGIN {
        recommendations.push(finding(
            Priority::High,
            Category::Reviews,
            "Boost Your Rating",
            format!(
                "Your {rating}-star rating is below the competitor average of {avg_rating:.1} stars. Encourage your happiest patients to share their experiences online."
            ),
        ));
    }
}

fn missing_names(listings: &[DirectoryListing], importance: Importance) -> Vec<&str> {
    listings
        .iter()
        .filter(|l| !l.found && l.importance == importance)
        .map(|l| l.directory.as_str())
        .collect()
}

fn directory_rule(listings: &[DirectoryListing], recommendations: &mut Vec<Recommendation>) {
    let missing_critical = missing_names(listings, Importance::Critical);
    if !missing_critical.is_empty() {
        recommendations.push(finding(
            Priority::Critical,
            Category::Citations,
            "Missing Critical Directory Listings",
            format!(
                "Your practice is not listed on these {} important directories: {}. These are high-traffic sites where patients search for dentists. Claim your listings immediately.",
                missing_critical.len(),
                missing_critical.join(", ")
            ),
        ));
    }

    let missing_high = missing_names(listings, Importance::High);
    if !missing_high.is_empty() {
        recommendations.push(finding(
            Priority::High,
            Category::Citations,
            "Missing Key Directory Listings",
            format!(
                "Consider adding your practice to these {} directories: {}. These directories help improve your local SEO and online visibility.",
                missing_high.len(),
                missing_high.join(", ")
            ),
        ));
    }

    let total = listings.len();
    let found = listings.iter().filter(|l| l.found).count();
    // found < 50% of total, in integers
    if found * 2 < total {
        recommendations.push(finding(
            Priority::High,
            Category::Citations,
            "Low Directory Presence",
            format!(
                "You're only listed on {found} of {total} key directories. Building more citations helps Google verify your business information and improves local rankings."
            ),
        ));
    }
}
