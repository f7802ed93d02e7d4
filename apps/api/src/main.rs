mod analysis;
mod config;
mod errors;
mod jobs;
mod providers;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::http::HeaderValue;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::orchestrator::AnalysisOrchestrator;
use crate::config::Config;
use crate::jobs::{spawn_retention_sweeper, InMemoryJobStore, JobStore};
use crate::providers::dataforseo::DataForSeoClient;
use crate::providers::google_places::GooglePlacesClient;
use crate::providers::Providers;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting DentistEnvy API v{}", env!("CARGO_PKG_VERSION"));

    let missing = config.missing_credentials();
    if !missing.is_empty() {
        warn!(
            "Provider credentials not set: {}. Analyses will fail until they are configured.",
            missing.join(", ")
        );
    }

    let places = Arc::new(GooglePlacesClient::new(config.google_places_api_key.clone())?);
    let seo = Arc::new(DataForSeoClient::new(
        config.dataforseo_login.clone(),
        config.dataforseo_password.clone(),
    )?);
    let providers = Providers {
        geocoder: places.clone(),
        finder: places,
        serp: seo.clone(),
        backlinks: seo.clone(),
        pages: seo,
    };
    info!("Provider clients initialized");

    let jobs: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
    spawn_retention_sweeper(jobs.clone(), config.job_retention, config.job_sweep_interval);
    info!(
        "Job retention: {}s (sweep every {}s), analysis timeout: {}s",
        config.job_retention.as_secs(),
        config.job_sweep_interval.as_secs(),
        config.analysis_timeout.as_secs()
    );

    let orchestrator = Arc::new(AnalysisOrchestrator::new(
        providers,
        jobs,
        config.analysis_timeout,
    ));
    let state = AppState::new(orchestrator);

    let cors = match &config.cors_origin {
        Some(origin) => CorsLayer::permissive().allow_origin(origin.parse::<HeaderValue>()?),
        None => CorsLayer::permissive(),
    };

    let app = build_router(state, &config.static_dir)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
