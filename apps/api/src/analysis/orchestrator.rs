//! Job Orchestrator
//!
//! Runs one analysis per background task: discovery, data collection,
//! scoring and report assembly, publishing a progress checkpoint as each
//! stage begins. Any fatal error is caught once here and recorded on the job.

use std::iter;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::analysis::collectors::{collect_backlinks, collect_on_page, collect_rankings};
use crate::analysis::directories::check_directory_listings;
use crate::analysis::discovery::{
    discover_competitors, lookup_practice_reviews, manual_competitors, Discovery,
};
use crate::analysis::keywords::{build_keyword_set, extract_city};
use crate::analysis::models::{CompetitorMode, PracticeProfile, PracticeType, Report};
use crate::analysis::report::{build_report, competitor_bundle, practice_bundle, split_rankings};
use crate::jobs::{Job, JobStore, Stage};
use crate::providers::{Outcome, ProviderError, Providers};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Analysis timed out after {0}s")]
    TimedOut(u64),
}

pub struct AnalysisOrchestrator {
    providers: Providers,
    jobs: Arc<dyn JobStore>,
    timeout: Duration,
}

impl AnalysisOrchestrator {
    pub fn new(providers: Providers, jobs: Arc<dyn JobStore>, timeout: Duration) -> Self {
        Self {
            providers,
            jobs,
            timeout,
        }
    }

    pub fn jobs(&self) -> &Arc<dyn JobStore> {
        &self.jobs
    }

    /// Registers a new job and starts it in the background. Returns immediately.
    pub fn submit(self: &Arc<Self>, profile: PracticeProfile) -> Uuid {
        let id = Uuid::new_v4();
        self.jobs.put(Job::new(id));
        info!("Job {id} submitted for {} ({})", profile.name, profile.domain);

        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            orchestrator.run(id, profile).await;
        });

        id
    }

    /// Drives job `id` to a terminal state.
    pub async fn run(&self, id: Uuid, profile: PracticeProfile) {
        let result = match tokio::time::timeout(self.timeout, self.pipeline(id, &profile)).await {
            Ok(result) => result,
            Err(_) => Err(AnalysisError::TimedOut(self.timeout.as_secs())),
        };

        let elapsed = self
            .jobs
            .get(&id)
            .map(|job| (Utc::now() - job.created_at).num_seconds())
            .unwrap_or_default();

        match result {
            Ok(report) => {
                info!(
                    "Job {id} completed in {elapsed}s: overall={} recommendations={}",
                    report.scores.overall,
                    report.recommendations.len()
                );
                let mut report = Some(report);
                self.jobs.update(&id, &mut |job| {
                    if let Some(report) = report.take() {
                        job.complete(report);
                    }
                });
            }
            Err(e) => {
                error!("Job {id} failed after {elapsed}s: {e}");
                let message = e.to_string();
                self.jobs.update(&id, &mut |job| job.fail(message.clone()));
            }
        }
    }

    /// Auto-mode discovery without creating a job.
    pub async fn discover_preview(
        &self,
        address: &str,
        practice_type: PracticeType,
    ) -> Result<Discovery, ProviderError> {
        discover_competitors(
            self.providers.geocoder.as_ref(),
            self.providers.finder.as_ref(),
            address,
            practice_type,
        )
        .await
    }

    fn advance(&self, id: Uuid, stage: Stage) {
        self.jobs.update(&id, &mut |job| job.advance(stage));
        info!("Job {id}: {}% {}", stage.progress(), stage.message());
    }

    async fn pipeline(&self, id: Uuid, profile: &PracticeProfile) -> Result<Report, AnalysisError> {
        let providers = &self.providers;

        self.advance(id, Stage::Competitors);
        let reviews =
            lookup_practice_reviews(providers.finder.as_ref(), &profile.name, &profile.address)
                .await;
        let competitors = match profile.competitor_mode {
            CompetitorMode::Manual if !profile.manual_competitors.is_empty() => {
                manual_competitors(&profile.manual_competitors)
            }
            _ => {
                discover_competitors(
                    providers.geocoder.as_ref(),
                    providers.finder.as_ref(),
                    &profile.address,
                    profile.practice_type,
                )
                .await?
                .competitors
            }
        };

        let city = extract_city(&profile.address);
        let keywords = build_keyword_set(&city);
        info!(
            "Job {id}: {} competitors, {} keywords for '{city}'",
            competitors.len(),
            keywords.len()
        );

        // Index 0 is always the practice.
        let domains: Vec<String> = iter::once(profile.domain.clone())
            .chain(competitors.iter().map(|c| c.domain.clone()))
            .collect();
        let urls: Vec<String> = iter::once(profile.website_url.clone())
            .chain(competitors.iter().map(|c| format!("https://{}", c.domain)))
            .collect();

        self.advance(id, Stage::Backlinks);
        let backlinks = collect_backlinks(providers.backlinks.as_ref(), &domains).await;

        self.advance(id, Stage::OnPage);
        let on_page = collect_on_page(providers.pages.as_ref(), &urls).await;

        self.advance(id, Stage::Rankings);
        let rankings = collect_rankings(providers.serp.as_ref(), &keywords).await;

        self.advance(id, Stage::Directories);
        let directory_listings = check_directory_listings(providers.serp.as_ref(), &profile.name).await;

        self.advance(id, Stage::Scoring);
        let table = split_rankings(&rankings, &profile.domain, &domains[1..]);
        let mut backlinks = backlinks.into_iter().map(Outcome::into_value);
        let mut on_page = on_page.into_iter().map(Outcome::into_value);

        let practice = practice_bundle(
            profile,
            reviews,
            backlinks.next().unwrap_or_default(),
            on_page.next().unwrap_or_default(),
            table.practice.clone(),
        );
        let competitor_bundles = competitors
            .iter()
            .map(|candidate| {
                competitor_bundle(
                    candidate,
                    backlinks.next().unwrap_or_default(),
                    on_page.next().unwrap_or_default(),
                    table.competitor(&candidate.domain),
                )
            })
            .collect();

        Ok(build_report(
            id,
            profile,
            practice,
            competitor_bundles,
            &keywords,
            directory_listings,
        ))
    }
}
