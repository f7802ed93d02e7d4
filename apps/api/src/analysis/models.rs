use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Practice input
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeType {
    #[default]
    General,
    Pediatric,
    OralSurgery,
    Periodontist,
    Orthodontist,
    Prosthodontist,
}

impl PracticeType {
    /// Keyword passed to the Local-Business Finder for this specialty.
    pub fn search_keyword(self) -> &'static str {
        match self {
            PracticeType::General => "dentist",
            PracticeType::Pediatric => "pediatric dentist",
            PracticeType::OralSurgery => "oral surgeon",
            PracticeType::Periodontist => "periodontist",
            PracticeType::Orthodontist => "orthodontist",
            PracticeType::Prosthodontist => "prosthodontist",
        }
    }
}

impl FromStr for PracticeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(PracticeType::General),
            "pediatric" => Ok(PracticeType::Pediatric),
            "oral_surgery" => Ok(PracticeType::OralSurgery),
            "periodontist" => Ok(PracticeType::Periodontist),
            "orthodontist" => Ok(PracticeType::Orthodontist),
            "prosthodontist" => Ok(PracticeType::Prosthodontist),
            other => Err(format!(
                "practiceType must be one of general, pediatric, oral_surgery, periodontist, orthodontist, prosthodontist (got \"{other}\")"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitorMode {
    #[default]
    Auto,
    Manual,
}

impl FromStr for CompetitorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(CompetitorMode::Auto),
            "manual" => Ok(CompetitorMode::Manual),
            _ => Err("competitorMode must be \"auto\" or \"manual\"".to_string()),
        }
    }
}

/// Validated identity of the practice under analysis.
#[derive(Debug, Clone)]
pub struct PracticeProfile {
    pub name: String,
    pub address: String,
    pub website_url: String,
    /// Normalized hostname of `website_url`.
    pub domain: String,
    pub practice_type: PracticeType,
    pub competitor_mode: CompetitorMode,
    pub manual_competitors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorCandidate {
    pub name: String,
    pub domain: String,
    pub website: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub rating: Option<f64>,
    pub review_count: u32,
}

/// Rating and review count found for the practice itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub rating: Option<f64>,
    pub review_count: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Metrics
// ────────────────────────────────────────────────────────────────────────────

/// Backlink profile. `Default` is the safe value used when the provider fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklinkMetrics {
    /// Provider authority rank.
    pub rank: u32,
    pub backlinks: u64,
    pub referring_domains: u64,
}

/// On-page audit of one URL. `Default` is the safe value used when the provider fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnPageMetrics {
    /// 0–100
    pub score: f64,
    pub title: String,
    pub status_code: u16,
}

/// Everything measured for one site: the practice or a competitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsBundle {
    pub name: String,
    pub domain: String,
    pub website: String,
    pub backlinks: BacklinkMetrics,
    pub on_page: OnPageMetrics,
    /// keyword → absolute search position. Absent keywords do not rank.
    pub rankings: HashMap<String, u32>,
    pub rating: Option<f64>,
    pub review_count: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Directories
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryListing {
    pub directory: String,
    pub domain: String,
    pub importance: Importance,
    pub found: bool,
    pub url: Option<String>,
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Scores & recommendations
// ────────────────────────────────────────────────────────────────────────────

/// Sub-scores and the weighted overall score, each 0–100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub overall: u32,
    pub keywords: u32,
    pub backlinks: u32,
    pub technical: u32,
}

/// Display order: `Critical` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Backlinks,
    Technical,
    Keywords,
    Reviews,
    Citations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: Category,
    pub title: String,
    pub description: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordComparison {
    pub keyword: String,
    pub practice_rank: Option<u32>,
    pub best_competitor_rank: Option<u32>,
    pub best_competitor: Option<String>,
    pub avg_competitor_rank: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordSummary {
    pub total_keywords: usize,
    pub ranking_count: usize,
    #[serde(rename = "top5Ranking")]
    pub top_ranking: Vec<KeywordComparison>,
    #[serde(rename = "top5Improve")]
    pub to_improve: Vec<KeywordComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub practice_name: String,
    pub practice_website: String,
    pub created_at: DateTime<Utc>,
    pub scores: Scores,
    pub practice_data: MetricsBundle,
    pub competitors: Vec<MetricsBundle>,
    pub recommendations: Vec<Recommendation>,
    pub keyword_data: Vec<KeywordComparison>,
    pub keyword_summary: KeywordSummary,
    pub directory_listings: Vec<DirectoryListing>,
}
