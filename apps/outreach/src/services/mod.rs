//! Typed backend operations used by the wizard. Each one is a fixed
//! invocation of `RequestClient::call`; retry and timeout policy live there.

pub mod extract;
pub mod generate;

use thiserror::Error;

use crate::api_client::ApiError;

pub use extract::{extract_job_data, validate_job_url, UrlValidationError, SUPPORTED_JOB_BOARDS};
pub use generate::generate_email;

pub const EXTRACT_JOB_ENDPOINT: &str = "/api/extract-job";
pub const GENERATE_EMAIL_ENDPOINT: &str = "/api/generate-email";

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ExtractionError(#[from] pub ApiError);

#[derive(Debug, Error)]
#[error(transparent)]
pub struct GenerationError(#[from] pub ApiError);
