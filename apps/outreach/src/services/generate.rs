//! Email generation: the `POST /api/generate-email` call.

use reqwest::Method;
use serde::Serialize;
use tracing::info;

use crate::api_client::{ApiError, RequestClient};
use crate::models::{GeneratedEmail, JobData, PersonalInfo};
use crate::services::{GenerationError, GENERATE_EMAIL_ENDPOINT};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateEmailRequest<'a> {
    job_data: &'a JobData,
    personal_info: &'a PersonalInfo,
}

/// Asks the backend for an outreach email tailored to `job` and `info`.
pub async fn generate_email(
    client: &RequestClient,
    job: &JobData,
    info: &PersonalInfo,
) -> Result<GeneratedEmail, GenerationError> {
    info!("Requesting email generation for {} at {}", job.role, job.company);
    let body = serde_json::to_value(GenerateEmailRequest {
        job_data: job,
        personal_info: info,
    })
    .map_err(ApiError::from)?;

    let email = client
        .call_json::<GeneratedEmail>(GENERATE_EMAIL_ENDPOINT, Method::POST, Some(&body))
        .await?;
    info!(
        "Generated email (confidence: {})",
        email
            .confidence_score
            .map(|s| format!("{:.0}%", s * 100.0))
            .unwrap_or_else(|| "n/a".to_string())
    );
    Ok(email)
}
