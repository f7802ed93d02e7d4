pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

use crate::analysis::handlers;
use crate::state::AppState;

/// API routes, with the static frontend (index page and embeddable widget)
/// served from `static_dir` for every other path.
pub fn build_router(state: AppState, static_dir: &str) -> Router {
    let frontend = ServeDir::new(static_dir)
        .fallback(ServeFile::new(format!("{static_dir}/index.html")));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/analysis/start", post(handlers::handle_start_analysis))
        .route(
            "/api/analysis/:job_id/status",
            get(handlers::handle_job_status),
        )
        .route(
            "/api/analysis/:job_id/report",
            get(handlers::handle_job_report),
        )
        .route(
            "/api/analysis/discover-competitors",
            post(handlers::handle_discover_competitors),
        )
        .route(
            "/api/analysis/validate-urls",
            post(handlers::handle_validate_urls),
        )
        .fallback_service(frontend)
        .with_state(state)
}
