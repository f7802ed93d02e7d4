use std::sync::Arc;
use std::time::Instant;

use crate::analysis::orchestrator::AnalysisOrchestrator;
use crate::jobs::JobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read side of the job registry, used by the status and report endpoints.
    pub jobs: Arc<dyn JobStore>,
    pub orchestrator: Arc<AnalysisOrchestrator>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(orchestrator: Arc<AnalysisOrchestrator>) -> Self {
        Self {
            jobs: Arc::clone(orchestrator.jobs()),
            orchestrator,
            started_at: Instant::now(),
        }
    }
}
