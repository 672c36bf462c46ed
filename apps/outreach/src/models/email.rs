use serde::{Deserialize, Serialize};

use crate::models::job::JobData;
use crate::models::personal::PersonalInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonalizationLevel {
    Low,
    Medium,
    High,
}

/// Email produced by the generation call (or by the local fallback).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedEmail {
    pub subject: String,
    pub content: String,
    /// 0.0 – 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personalization_level: Option<PersonalizationLevel>,
}

impl GeneratedEmail {
    /// Plain-text template used when generation fails, so the wizard can
    /// still finish with something the user can edit.
    pub fn fallback(job: &JobData, info: &PersonalInfo) -> Self {
        Self {
            subject: format!("Interest in {} Position", job.role),
            content: format!(
                "Dear Hiring Manager,\n\n\
                 I am writing to express my strong interest in the {role} \
                 position at {company}.\n\n\
                 {skills}\n\n\
                 I would love to discuss how my experience aligns with your needs.\n\n\
                 Best regards,\n{name}",
                role = job.role,
                company = job.company,
                skills = info.skills,
                name = info.name,
            ),
            confidence_score: None,
            suggestions: None,
            personalization_level: None,
        }
    }

    /// The copy/download rendering: subject line, blank line, body.
    pub fn to_plain_text(&self) -> String {
        format!("Subject: {}\n\n{}", self.subject, self.content)
    }

    pub fn is_empty(&self) -> bool {
        self.subject.is_empty() && self.content.is_empty()
    }
}
