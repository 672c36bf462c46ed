use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shortest accepted free-text skills summary (after trimming).
pub const MIN_SKILLS_LEN: usize = 10;

/// The applicant's details. Persisted between sessions and sent along with
/// the job data when generating an email.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    /// Free-text summary of skills and experience.
    pub skills: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersonalInfoError {
    #[error("Name is required")]
    MissingName,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Skills description must be at least 10 characters long")]
    SkillsTooShort,
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
}

impl PersonalInfo {
    /// Checks the fields the backend rejects. Returns the first problem found.
    pub fn validate(&self) -> Result<(), PersonalInfoError> {
        if self.name.trim().is_empty() {
            return Err(PersonalInfoError::MissingName);
        }
        if !email_pattern().is_match(self.email.trim()) {
            return Err(PersonalInfoError::InvalidEmail);
        }
        if self.skills.trim().chars().count() < MIN_SKILLS_LEN {
            return Err(PersonalInfoError::SkillsTooShort);
        }
        Ok(())
    }
}
