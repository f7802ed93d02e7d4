use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::analysis::domain::{canonical_url, normalize_domain, parse_host};
use crate::analysis::models::{
    CompetitorCandidate, CompetitorMode, PracticeProfile, PracticeType,
};
use crate::errors::AppError;
use crate::jobs::{Job, JobStatus};
use crate::providers::GeoLocation;
use crate::state::AppState;

const MAX_MANUAL_COMPETITORS: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAnalysisRequest {
    pub practice_name: Option<String>,
    pub address: Option<String>,
    pub website_url: Option<String>,
    pub practice_type: Option<String>,
    pub competitor_mode: Option<String>,
    pub manual_competitors: Option<Vec<String>>,
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_practice_type(raw: Option<&str>) -> Result<PracticeType, AppError> {
    raw.map(str::parse::<PracticeType>)
        .transpose()
        .map(Option::unwrap_or_default)
        .map_err(AppError::Validation)
}

impl StartAnalysisRequest {
    /// Validates the request. Nothing is stored when this fails.
    pub fn into_profile(self) -> Result<PracticeProfile, AppError> {
        let (Some(name), Some(address), Some(website_url)) = (
            required(self.practice_name),
            required(self.address),
            required(self.website_url),
        ) else {
            return Err(AppError::Validation(
                "Missing required fields: practiceName, address, websiteUrl".to_string(),
            ));
        };

        let practice_type = parse_practice_type(self.practice_type.as_deref())?;
        let competitor_mode = self
            .competitor_mode
            .as_deref()
            .map(str::parse::<CompetitorMode>)
            .transpose()
            .map_err(AppError::Validation)?
            .unwrap_or_default();

        let manual_competitors: Vec<String> = self
            .manual_competitors
            .unwrap_or_default()
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();
        if manual_competitors.len() > MAX_MANUAL_COMPETITORS {
            return Err(AppError::Validation(format!(
                "Maximum {MAX_MANUAL_COMPETITORS} competitors allowed"
            )));
        }

        let website_url = canonical_url(&website_url);
        Ok(PracticeProfile {
            domain: normalize_domain(&website_url),
            name,
            address,
            website_url,
            practice_type,
            competitor_mode,
            manual_competitors,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAnalysisResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub progress: u8,
    pub progress_message: String,
}

fn find_job(state: &AppState, raw_id: &str) -> Result<Job, AppError> {
    Uuid::parse_str(raw_id)
        .ok()
        .and_then(|id| state.jobs.get(&id))
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
}

/// POST /api/analysis/start
pub async fn handle_start_analysis(
    State(state): State<AppState>,
    payload: Result<Json<StartAnalysisRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StartAnalysisResponse>), AppError> {
    let Json(req) = payload?;
    let profile = req.into_profile()?;
    let job_id = state.orchestrator.submit(profile);
    Ok((
        StatusCode::ACCEPTED,
        Json(StartAnalysisResponse {
            job_id,
            status: JobStatus::Processing,
        }),
    ))
}

/// GET /api/analysis/:job_id/status
pub async fn handle_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusResponse>, AppError> {
    let job = find_job(&state, &job_id)?;
    Ok(Json(JobStatusResponse {
        job_id: job.id,
        status: job.status,
        progress: job.progress,
        progress_message: job.message,
    }))
}

/// GET /api/analysis/:job_id/report
pub async fn handle_job_report(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Response, AppError> {
    let job = find_job(&state, &job_id)?;
    match job.status {
        JobStatus::Failed => Err(AppError::AnalysisFailed(
            job.error.unwrap_or_else(|| "Analysis failed".to_string()),
        )),
        JobStatus::Processing => Ok((
            StatusCode::ACCEPTED,
            Json(json!({
                "message": "Analysis still in progress",
                "status": job.status,
                "progress": job.progress,
            })),
        )
            .into_response()),
        JobStatus::Completed => {
            let report = job.result.ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("completed job {} has no report", job.id))
            })?;
            Ok(Json(report.as_ref()).into_response())
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverRequest {
    pub address: Option<String>,
    pub practice_type: Option<String>,
}

#[derive(Serialize)]
pub struct DiscoverResponse {
    pub location: GeoLocation,
    pub competitors: Vec<CompetitorCandidate>,
}

/// POST /api/analysis/discover-competitors
pub async fn handle_discover_competitors(
    State(state): State<AppState>,
    payload: Result<Json<DiscoverRequest>, JsonRejection>,
) -> Result<Json<DiscoverResponse>, AppError> {
    let Json(req) = payload?;
    let address = required(req.address)
        .ok_or_else(|| AppError::Validation("Address is required".to_string()))?;
    let practice_type = parse_practice_type(req.practice_type.as_deref())?;

    let discovery = state
        .orchestrator
        .discover_preview(&address, practice_type)
        .await?;
    Ok(Json(DiscoverResponse {
        location: discovery.location,
        competitors: discovery.competitors,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ValidateUrlsRequest {
    pub urls: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ValidatedUrl {
    pub original: String,
    pub domain: Option<String>,
    pub valid: bool,
}

/// POST /api/analysis/validate-urls
pub async fn handle_validate_urls(
    payload: Result<Json<ValidateUrlsRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(req) = payload?;
    let urls = req
        .urls
        .ok_or_else(|| AppError::Validation("urls array is required".to_string()))?;

    let validated: Vec<ValidatedUrl> = urls
        .into_iter()
        .map(|original| {
            let domain = parse_host(&original);
            ValidatedUrl {
                valid: domain.is_some(),
                domain,
                original,
            }
        })
        .collect();

    Ok(Json(json!({ "urls": validated })))
}
