//! Job extraction: URL pre-checks and the `POST /api/extract-job` call.

use reqwest::{Method, Url};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::api_client::{ApiError, RequestClient};
use crate::models::JobData;
use crate::services::{ExtractionError, EXTRACT_JOB_ENDPOINT};

/// Hosts the extraction backend knows how to read. Matched as substrings of
/// the URL host, so subdomains (`www.`, `boards.`, `jobs.`) are accepted.
pub const SUPPORTED_JOB_BOARDS: &[&str] = &[
    "linkedin.com",
    "indeed.com",
    "glassdoor.com",
    "lever.co",
    "greenhouse.io",
    "workday.com",
    "bamboohr.com",
    "careers.google.com",
    "jobs.apple.com",
    "amazon.jobs",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlValidationError {
    #[error("Please enter a job URL")]
    Empty,

    #[error("Please enter a valid URL starting with https://")]
    Malformed,

    #[error("This job board is not yet supported. Try LinkedIn, Indeed, or company career pages.")]
    UnsupportedBoard,
}

/// Checks a user-entered posting URL before anything is sent.
/// Returns the trimmed URL on success.
pub fn validate_job_url(input: &str) -> Result<&str, UrlValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    let url = Url::parse(trimmed).map_err(|_| UrlValidationError::Malformed)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlValidationError::Malformed);
    }
    let host = url.host_str().ok_or(UrlValidationError::Malformed)?.to_ascii_lowercase();

    if SUPPORTED_JOB_BOARDS.iter().any(|board| host.contains(board)) {
        Ok(trimmed)
    } else {
        Err(UrlValidationError::UnsupportedBoard)
    }
}

#[derive(Debug, Serialize)]
struct ExtractJobRequest<'a> {
    url: &'a str,
}

/// Asks the backend to extract structured job details from a posting URL.
pub async fn extract_job_data(
    client: &RequestClient,
    url: &str,
) -> Result<JobData, ExtractionError> {
    info!("Requesting job extraction for {url}");
    let body = serde_json::to_value(ExtractJobRequest { url }).map_err(ApiError::from)?;
    let job = client
        .call_json::<JobData>(EXTRACT_JOB_ENDPOINT, Method::POST, Some(&body))
        .await?;
    info!("Extracted {} at {} ({} skills)", job.role, job.company, job.skills.len());
    Ok(job)
}
