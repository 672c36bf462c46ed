//! Canned job templates and the email template used by the stub backend.
//!
//! Everything here is a pure function of its input: the same posting URL
//! always yields the same `JobData`.

use reqwest::Url;

use crate::models::{GeneratedEmail, JobData, JobType, PersonalInfo};
use crate::stub::scoring::{confidence_score, personalization_level};

/// A role shape selected by keyword match against the posting URL.
#[derive(Debug)]
pub struct JobTemplate {
    pub keywords: &'static [&'static str],
    pub role: &'static str,
    pub summary: &'static str,
    pub skills: &'static [&'static str],
    pub experience: &'static str,
}

/// Checked in order; the first template with a matching keyword wins.
pub static JOB_TEMPLATES: &[JobTemplate] = &[
    JobTemplate {
        keywords: &["design", "designer", "ux", "ui"],
        role: "Product Designer",
        summary: "shape end-to-end user experiences, from research through polished interactions",
        skills: &["Figma", "User Research", "Prototyping", "Design Systems"],
        experience: "3+ years",
    },
    JobTemplate {
        keywords: &["frontend", "front", "react", "web"],
        role: "Senior Frontend Developer",
        summary: "build fast, accessible interfaces used by millions of customers",
        skills: &["React", "TypeScript", "CSS", "Next.js", "Testing Library"],
        experience: "5+ years",
    },
    JobTemplate {
        keywords: &["backend", "api", "server", "rust", "golang"],
        role: "Backend Engineer",
        summary: "design and operate the services and data pipelines behind our product",
        skills: &["Rust", "Go", "PostgreSQL", "Kafka", "Docker"],
        experience: "4+ years",
    },
    JobTemplate {
        keywords: &["data", "analytics", "ml", "machine", "scientist"],
        role: "Data Scientist",
        summary: "turn product and customer data into models and decisions",
        skills: &["Python", "SQL", "pandas", "scikit-learn", "Statistics"],
        experience: "3+ years",
    },
    JobTemplate {
        keywords: &["devops", "sre", "platform", "infrastructure", "cloud"],
        role: "DevOps Engineer",
        summary: "keep our infrastructure reliable, observable and cheap to run",
        skills: &["Kubernetes", "Terraform", "AWS", "CI/CD", "Prometheus"],
        experience: "4+ years",
    },
    JobTemplate {
        keywords: &["mobile", "ios", "android"],
        role: "Mobile Engineer",
        summary: "ship native-quality mobile apps on both platforms",
        skills: &["Swift", "Kotlin", "React Native", "App Store Release"],
        experience: "3+ years",
    },
    JobTemplate {
        keywords: &["product", "pm", "manager"],
        role: "Product Manager",
        summary: "own the roadmap for a core product area and work closely with engineering",
        skills: &["Roadmapping", "Analytics", "Stakeholder Management", "Agile"],
        experience: "5+ years",
    },
];

pub static DEFAULT_TEMPLATE: JobTemplate = JobTemplate {
    keywords: &[],
    role: "Software Engineer",
    summary: "build and maintain the software at the heart of our business",
    skills: &["JavaScript", "Python", "Git", "SQL", "REST APIs"],
    experience: "2+ years",
};

const FALLBACK_COMPANIES: &[&str] = &[
    "Acme Corp",
    "Globex",
    "Initech",
    "Umbrella Labs",
    "Stark Industries",
    "Hooli",
];

const LOCATIONS: &[&str] = &[
    "San Francisco, CA",
    "New York, NY",
    "Austin, TX",
    "Seattle, WA",
    "Remote",
    "London, UK",
    "Berlin, Germany",
];

const SALARIES: &[Option<&str>] = &[
    Some("$120,000 - $150,000"),
    Some("$140,000 - $180,000"),
    Some("$90,000 - $120,000"),
    None,
];

const JOB_TYPES: &[JobType] = &[
    JobType::FullTime,
    JobType::FullTime,
    JobType::FullTime,
    JobType::Contract,
    JobType::PartTime,
];

/// 64-bit FNV-1a; stable across runs and platforms.
fn stable_hash(input: &str) -> u64 {
    input.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x0100_0000_01b3)
    })
}

fn pick<T: Copy>(items: &[T], hash: u64, salt: u64) -> T {
    items[(hash.rotate_left(salt as u32 * 8) % items.len() as u64) as usize]
}

fn tokens(url: &Url) -> Vec<String> {
    let mut text = url.path().to_lowercase();
    if let Some(query) = url.query() {
        text.push(' ');
        text.push_str(&query.to_lowercase());
    }
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn select_template(url: &Url) -> &'static JobTemplate {
    let tokens = tokens(url);
    JOB_TEMPLATES
        .iter()
        .find(|template| template.keywords.iter().any(|k| tokens.iter().any(|t| t == k)))
        .unwrap_or(&DEFAULT_TEMPLATE)
}

fn title_case(slug: &str) -> String {
    slug.split(|c: char| c == '-' || c == '_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Company name from the URL where the board encodes it, otherwise a canned one.
pub fn company_for(url: &Url, hash: u64) -> String {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    let first_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next())
        .filter(|s| !s.is_empty());

    if host.contains("careers.google.com") {
        return "Google".to_string();
    }
    if host.contains("jobs.apple.com") {
        return "Apple".to_string();
    }
    if host.contains("amazon.jobs") {
        return "Amazon".to_string();
    }
    if host.contains("lever.co") || host.contains("greenhouse.io") {
        if let Some(segment) = first_segment {
            return title_case(segment);
        }
    }
    if host.contains("workday.com") || host.contains("bamboohr.com") {
        if let Some(subdomain) = host.split('.').next().filter(|s| *s != "www") {
            return title_case(subdomain);
        }
    }
    pick(FALLBACK_COMPANIES, hash, 0).to_string()
}

/// Builds the canned job for a posting URL.
pub fn job_for_url(url: &Url) -> JobData {
    let hash = stable_hash(url.as_str());
    let template = select_template(url);
    let company = company_for(url, hash);
    let location = pick(LOCATIONS, hash, 1);

    JobData {
        role: template.role.to_string(),
        description: format!(
            "{company} is looking for a {} to {}.",
            template.role, template.summary
        ),
        company,
        skills: template.skills.iter().map(|s| s.to_string()).collect(),
        experience: template.experience.to_string(),
        location: location.to_string(),
        salary: pick(SALARIES, hash, 2).map(str::to_string),
        remote: Some(location == "Remote" || hash % 3 == 0),
        job_type: Some(pick(JOB_TYPES, hash, 3)),
    }
}

/// Job skills that the applicant's free-text summary mentions, in job order.
fn matched_skills<'a>(job: &'a JobData, info: &PersonalInfo) -> Vec<&'a str> {
    let applicant = info.skills.to_lowercase();
    job.skills
        .iter()
        .filter(|skill| applicant.contains(&skill.to_lowercase()))
        .map(String::as_str)
        .collect()
}

/// Renders the templated outreach email and scores it.
pub fn email_for(job: &JobData, info: &PersonalInfo) -> GeneratedEmail {
    let matched = matched_skills(job, info);

    let subject = format!("{} at {} - {}", job.role, job.company, info.name);

    let mut paragraphs = vec![
        format!("Dear {} Hiring Team,", job.company),
        format!(
            "I came across the {} opening at {} and wanted to reach out directly.",
            job.role, job.company
        ),
        info.skills.trim().to_string(),
    ];
    if !matched.is_empty() {
        paragraphs.push(format!(
            "In particular, my background with {} lines up with what you are looking for.",
            matched.join(", ")
        ));
    }
    if let Some(portfolio) = info.portfolio.as_deref().filter(|p| !p.trim().is_empty()) {
        paragraphs.push(format!("You can find examples of my work at {portfolio}."));
    }
    paragraphs.push(
        "I would welcome a short conversation about how I could help the team.".to_string(),
    );

    let mut signature = vec!["Best regards,".to_string(), info.name.clone(), info.email.clone()];
    if let Some(phone) = info.phone.as_deref().filter(|p| !p.trim().is_empty()) {
        signature.push(phone.to_string());
    }
    paragraphs.push(signature.join("\n"));

    let content = paragraphs.join("\n\n");

    let mut suggestions: Vec<String> = job
        .skills
        .iter()
        .filter(|skill| !matched.contains(&skill.as_str()))
        .take(3)
        .map(|skill| format!("Mention any experience with {skill}"))
        .collect();
    if info.portfolio.as_deref().map_or(true, |p| p.trim().is_empty()) {
        suggestions.push("Add a portfolio link to back up your experience".to_string());
    }

    let score = confidence_score(&subject, &content, job, info);

    GeneratedEmail {
        subject,
        content,
        confidence_score: Some(score),
        suggestions: Some(suggestions),
        personalization_level: Some(personalization_level(score)),
    }
}
