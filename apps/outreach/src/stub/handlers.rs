//! Axum route handlers for the stub backend.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::Uri,
    Json,
};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::models::{GeneratedEmail, JobData, PersonalInfo};
use crate::services::SUPPORTED_JOB_BOARDS;
use crate::stub::templates::{email_for, job_for_url};
use crate::stub::StubState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractJobRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateEmailRequest {
    pub job_data: JobData,
    pub personal_info: PersonalInfo,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /health
pub async fn handle_health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "All services are operational",
        "services": {
            "email_service": "online",
            "job_scraper": "online",
            "api": "online"
        }
    }))
}

/// GET /api/supported-sites
pub async fn handle_supported_sites() -> Json<Value> {
    Json(json!({ "supported_sites": SUPPORTED_JOB_BOARDS }))
}

/// POST /api/extract-job
///
/// Returns canned job details chosen by keyword match on the URL.
pub async fn handle_extract_job(
    State(state): State<StubState>,
    payload: Result<Json<ExtractJobRequest>, JsonRejection>,
) -> Result<Json<JobData>, AppError> {
    let Json(request) = payload.map_err(rejected)?;
    state.simulate_latency().await;

    let url = Url::parse(request.url.trim())
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .ok_or_else(|| AppError::Validation(format!("Invalid job URL: '{}'", request.url)))?;

    let job = job_for_url(&url);
    info!("Stub extracted {} at {} from {}", job.role, job.company, url);
    Ok(Json(job))
}

/// POST /api/generate-email
///
/// Renders the templated email for the given job and applicant.
pub async fn handle_generate_email(
    State(state): State<StubState>,
    payload: Result<Json<GenerateEmailRequest>, JsonRejection>,
) -> Result<Json<GeneratedEmail>, AppError> {
    let Json(request) = payload.map_err(rejected)?;
    state.simulate_latency().await;

    if request.job_data.role.trim().is_empty() {
        return Err(AppError::Validation("Job role is required".to_string()));
    }
    request
        .personal_info
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let email = email_for(&request.job_data, &request.personal_info);
    info!(
        "Stub generated email for {} (confidence {:.2})",
        request.job_data.role,
        email.confidence_score.unwrap_or_default()
    );
    Ok(Json(email))
}

/// Malformed bodies get the same `{"detail"}` shape as every other error.
fn rejected(rejection: JsonRejection) -> AppError {
    AppError::Validation(rejection.body_text())
}

pub async fn handle_not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}
