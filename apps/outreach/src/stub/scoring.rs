//! Heuristic confidence for a rendered email: does it name the role and
//! company, is it long enough, is it signed, does it mention the job's skills.

use crate::models::{JobData, PersonalInfo, PersonalizationLevel};

const MAX_SKILL_BONUS: f64 = 0.3;

/// Score in 0.0 – 1.0.
pub fn confidence_score(subject: &str, content: &str, job: &JobData, info: &PersonalInfo) -> f64 {
    let subject = subject.to_lowercase();
    let content_lower = content.to_lowercase();
    let mut score = 0.0;

    let company = job.company.to_lowercase();
    if !company.is_empty() && subject.contains(&company) {
        score += 0.2;
    }
    let role = job.role.to_lowercase();
    if !role.is_empty() && subject.contains(&role) {
        score += 0.2;
    }

    let length = content.chars().count();
    if length > 100 {
        score += 0.2;
    }
    if length > 200 {
        score += 0.1;
    }

    let name = info.name.to_lowercase();
    if !name.is_empty() && content_lower.contains(&name) {
        score += 0.2;
    }

    let skill_matches = job
        .skills
        .iter()
        .filter(|skill| content_lower.contains(&skill.to_lowercase()))
        .count();
    score += (0.1 * skill_matches as f64).min(MAX_SKILL_BONUS);

    score.min(1.0)
}

pub fn personalization_level(score: f64) -> PersonalizationLevel {
    if score >= 0.8 {
        PersonalizationLevel::High
    } else if score >= 0.5 {
        PersonalizationLevel::Medium
    } else {
        PersonalizationLevel::Low
    }
}
