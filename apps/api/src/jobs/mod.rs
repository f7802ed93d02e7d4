//! Background Job Registry
//!
//! Tracks each submitted analysis from creation to a terminal state. The store
//! sits behind a trait so the orchestrator never depends on where jobs live.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::models::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Processing)
    }
}

/// Pipeline checkpoints, in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Created,
    Competitors,
    Backlinks,
    OnPage,
    Rankings,
    Directories,
    Scoring,
    Complete,
}

impl Stage {
    pub fn progress(self) -> u8 {
        match self {
            Stage::Created => 0,
            Stage::Competitors => 10,
            Stage::Backlinks => 20,
            Stage::OnPage => 40,
            Stage::Rankings => 50,
            Stage::Directories => 75,
            Stage::Scoring => 90,
            Stage::Complete => 100,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Stage::Created => "Starting analysis...",
            Stage::Competitors => "Finding competitors...",
            Stage::Backlinks => "Analyzing domain authority...",
            Stage::OnPage => "Analyzing technical SEO...",
            Stage::Rankings => "Checking keyword rankings...",
            Stage::Directories => "Checking directory listings...",
            Stage::Scoring => "Generating report...",
            Stage::Complete => "Analysis complete!",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    pub result: Option<Arc<Report>>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Processing,
            progress: Stage::Created.progress(),
            message: Stage::Created.message().to_string(),
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves to `stage`. Regressions and terminal jobs are left untouched so
    /// progress never decreases.
    pub fn advance(&mut self, stage: Stage) {
        if self.status.is_terminal() || stage.progress() < self.progress {
            return;
        }
        self.progress = stage.progress();
        self.message = stage.message().to_string();
        self.updated_at = Utc::now();
    }

    pub fn complete(&mut self, report: Report) {
        if self.status.is_terminal() {
            return;
        }
        self.advance(Stage::Complete);
        self.status = JobStatus::Completed;
        self.result = Some(Arc::new(report));
        self.updated_at = Utc::now();
    }

    /// Keeps the last progress reached.
    pub fn fail(&mut self, error: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        self.updated_at = Utc::now();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

pub trait JobStore: Send + Sync {
    /// Snapshot of the job. Never observes a partially applied update.
    fn get(&self, id: &Uuid) -> Option<Job>;

    fn put(&self, job: Job);

    /// Applies `apply` atomically. Returns false when the id is unknown.
    fn update(&self, id: &Uuid, apply: &mut dyn FnMut(&mut Job)) -> bool;

    /// Removes terminal jobs last updated before `cutoff`.
    fn evict_terminal_before(&self, cutoff: DateTime<Utc>) -> usize;

    fn len(&self) -> usize;
}

#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: DashMap<Uuid, Job>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    fn get(&self, id: &Uuid) -> Option<Job> {
        self.jobs.get(id).map(|job| job.value().clone())
    }

    fn put(&self, job: Job) {
        self.jobs.insert(job.id, job);
    }

    fn update(&self, id: &Uuid, apply: &mut dyn FnMut(&mut Job)) -> bool {
        match self.jobs.get_mut(id) {
            Some(mut job) => {
                apply(job.value_mut());
                true
            }
            None => false,
        }
    }

    fn evict_terminal_before(&self, cutoff: DateTime<Utc>) -> usize {
        let before = self.jobs.len();
        self.jobs
            .retain(|_, job| !(job.status.is_terminal() && job.updated_at < cutoff));
        before.saturating_sub(self.jobs.len())
    }

    fn len(&self) -> usize {
        self.jobs.len()
    }
}

/// Periodically evicts terminal jobs older than `retention`.
pub fn spawn_retention_sweeper(
    store: Arc<dyn JobStore>,
    retention: Duration,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    let retention = chrono::Duration::from_std(retention).unwrap_or(chrono::Duration::days(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
        // The first tick fires immediately; nothing can be stale yet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = store.evict_terminal_before(Utc::now() - retention);
            if evicted > 0 {
                info!("Evicted {evicted} finished jobs ({} remaining)", store.len());
            } else {
                debug!("Job sweep: nothing to evict");
            }
        }
    })
}
