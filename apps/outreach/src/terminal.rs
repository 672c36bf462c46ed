//! Line-based front end for the wizard. Reads answers from any buffered
//! reader and writes prompts to any writer, so the same loop runs against
//! stdin/stdout or an in-memory script.

use std::path::PathBuf;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::debug;

use crate::models::{GeneratedEmail, JobData, PersonalInfo};
use crate::wizard::{NotificationKind, Wizard, WizardStep};

pub const DEFAULT_EXPORT_FILE: &str = "cold-email.txt";

pub struct Terminal<R, W> {
    lines: Lines<R>,
    out: W,
    export_path: PathBuf,
}

impl<R, W> Terminal<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
            export_path: PathBuf::from(DEFAULT_EXPORT_FILE),
        }
    }

    pub fn with_export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = path.into();
        self
    }

    pub fn into_writer(self) -> W {
        self.out
    }

    /// Runs the wizard until the user declines to start over or input ends.
    pub async fn run(&mut self, wizard: &mut Wizard) -> Result<()> {
        loop {
            self.header(wizard.step()).await?;
            let keep_going = match wizard.step() {
                WizardStep::Url => self.url_step(wizard).await?,
                WizardStep::Review => self.review_step(wizard).await?,
                WizardStep::PersonalInfo => self.personal_info_step(wizard).await?,
                WizardStep::Result => self.result_step(wizard).await?,
            };
            self.flush_notifications(wizard).await?;
            if !keep_going {
                return Ok(());
            }
        }
    }

    async fn url_step(&mut self, wizard: &mut Wizard) -> Result<bool> {
        let Some(url) = self.ask("Job posting URL", None).await? else {
            return Ok(false);
        };
        self.say("Extracting job details...").await?;
        if let Err(e) = wizard.submit_url(&url).await {
            self.say(&format!("  ! {e}")).await?;
        }
        Ok(true)
    }

    async fn review_step(&mut self, wizard: &mut Wizard) -> Result<bool> {
        let job = wizard.session().job.clone();
        self.print_job(&job).await?;

        let Some(answer) = self.ask("Edit these details? [y/N]", Some("n")).await? else {
            return Ok(false);
        };
        if is_yes(&answer) {
            let Some(edited) = self.edit_job(job).await? else {
                return Ok(false);
            };
            wizard.edit_job(edited)?;
        }
        wizard.confirm_review()?;
        Ok(true)
    }

    async fn personal_info_step(&mut self, wizard: &mut Wizard) -> Result<bool> {
        let saved = wizard.session().personal_info.clone();
        let Some(info) = self.read_personal_info(saved).await? else {
            return Ok(false);
        };
        self.say("Generating your email...").await?;
        if let Err(e) = wizard.submit_personal_info(info).await {
            self.say(&format!("  ! {e}")).await?;
        }
        Ok(true)
    }

    async fn result_step(&mut self, wizard: &mut Wizard) -> Result<bool> {
        let email = wizard.session().email.clone();
        self.print_email(&email).await?;

        let prompt = format!("Save to {}? [y/N]", self.export_path.display());
        let Some(answer) = self.ask(&prompt, Some("n")).await? else {
            return Ok(false);
        };
        if is_yes(&answer) {
            if let Err(e) = wizard.export_email(&self.export_path) {
                self.say(&format!("  ! {e}")).await?;
            }
        }

        let Some(answer) = self.ask("Start over with another job? [y/N]", Some("n")).await? else {
            return Ok(false);
        };
        if is_yes(&answer) {
            wizard.restart()?;
            return Ok(true);
        }
        Ok(false)
    }

    async fn edit_job(&mut self, job: JobData) -> Result<Option<JobData>> {
        let Some(role) = self.ask("Role", Some(&job.role)).await? else {
            return Ok(None);
        };
        let Some(company) = self.ask("Company", Some(&job.company)).await? else {
            return Ok(None);
        };
        let current_skills = job.skills.join(", ");
        let Some(skills) = self.ask("Skills (comma separated)", Some(&current_skills)).await? else {
            return Ok(None);
        };

        Ok(Some(JobData {
            role,
            company,
            skills: split_list(&skills),
            ..job
        }))
    }

    async fn read_personal_info(&mut self, saved: PersonalInfo) -> Result<Option<PersonalInfo>> {
        let Some(name) = self.ask("Your name", non_empty(&saved.name)).await? else {
            return Ok(None);
        };
        let Some(email) = self.ask("Your email", non_empty(&saved.email)).await? else {
            return Ok(None);
        };
        let Some(skills) = self.ask("Skills and experience", non_empty(&saved.skills)).await? else {
            return Ok(None);
        };
        let Some(portfolio) = self
            .ask("Portfolio URL (optional)", saved.portfolio.as_deref())
            .await?
        else {
            return Ok(None);
        };
        let Some(phone) = self.ask("Phone (optional)", saved.phone.as_deref()).await? else {
            return Ok(None);
        };

        Ok(Some(PersonalInfo {
            name,
            email,
            skills,
            portfolio: optional(portfolio),
            phone: optional(phone),
            ..saved
        }))
    }

    async fn print_job(&mut self, job: &JobData) -> Result<()> {
        let mut text = format!("  Role:       {}\n  Company:    {}\n", job.role, job.company);
        if !job.location.is_empty() {
            text.push_str(&format!("  Location:   {}\n", job.location));
        }
        if !job.experience.is_empty() {
            text.push_str(&format!("  Experience: {}\n", job.experience));
        }
        if let Some(salary) = &job.salary {
            text.push_str(&format!("  Salary:     {salary}\n"));
        }
        if !job.skills.is_empty() {
            text.push_str(&format!("  Skills:     {}\n", job.skills.join(", ")));
        }
        if !job.description.is_empty() {
            text.push_str(&format!("\n  {}\n", job.description));
        }
        self.write(&text).await
    }

    async fn print_email(&mut self, email: &GeneratedEmail) -> Result<()> {
        let mut text = format!("\n{}\n", email.to_plain_text());
        if let Some(score) = email.confidence_score {
            text.push_str(&format!("\nConfidence: {:.0}%", score * 100.0));
            if let Some(level) = email.personalization_level {
                text.push_str(&format!(" ({level:?} personalization)"));
            }
            text.push('\n');
        }
        for suggestion in email.suggestions.iter().flatten() {
            text.push_str(&format!("  - {suggestion}\n"));
        }
        self.write(&text).await
    }

    async fn header(&mut self, step: WizardStep) -> Result<()> {
        let text = format!(
            "\n[{}/{}] {}\n",
            step.number(),
            WizardStep::COUNT,
            step.title()
        );
        self.write(&text).await
    }

    /// Prints every queued toast once, then dismisses it. Unprinted toasts
    /// are never expired.
    async fn flush_notifications(&mut self, wizard: &mut Wizard) -> Result<()> {
        let pending: Vec<_> = wizard
            .session()
            .notifications
            .iter()
            .map(|n| (n.id, n.kind, n.message.clone()))
            .collect();

        for (id, kind, message) in pending {
            let marker = match kind {
                NotificationKind::Success => "ok",
                NotificationKind::Error => "error",
                NotificationKind::Warning => "warn",
                NotificationKind::Info => "info",
            };
            self.say(&format!("  [{marker}] {message}")).await?;
            wizard.dismiss(id)?;
        }
        Ok(())
    }

    /// `None` once input is exhausted. An empty answer takes the default.
    async fn ask(&mut self, label: &str, default: Option<&str>) -> Result<Option<String>> {
        let prompt = match default {
            Some(d) if !d.is_empty() => format!("{label} [{d}]: "),
            _ => format!("{label}: "),
        };
        self.write(&prompt).await?;

        let Some(line) = self.lines.next_line().await? else {
            debug!("Input closed at prompt '{label}'");
            return Ok(None);
        };
        let answer = line.trim();
        if answer.is_empty() {
            Ok(Some(default.unwrap_or_default().to_string()))
        } else {
            Ok(Some(answer.to_string()))
        }
    }

    async fn say(&mut self, line: &str) -> Result<()> {
        self.write(&format!("{line}\n")).await
    }

    async fn write(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::api_client::transport::scripted::{ScriptedTransport, Step};
    use crate::api_client::RequestClient;
    use crate::config::RequestConfig;
    use crate::storage::{KeyValueStore, MemoryStore, PersonalInfoStore, StorageError};

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    fn wizard(steps: Vec<Step>) -> Wizard {
        let transport = Arc::new(ScriptedTransport::new(steps));
        let client = RequestClient::with_transport(RequestConfig::default(), transport);
        Wizard::new(client, PersonalInfoStore::new(Arc::new(MemoryStore::default())))
    }

    fn job_json() -> serde_json::Value {
        json!({
            "role": "Site Reliability Engineer",
            "company": "Umbrella",
            "description": "Keep things up",
            "skills": ["Linux", "Terraform"]
        })
    }

    #[test]
    fn test_split_list_drops_blanks() {
        assert_eq!(split_list(" Rust, ,Go ,"), vec!["Rust", "Go"]);
    }

    #[test]
    fn test_yes_answers() {
        assert!(is_yes("Y"));
        assert!(is_yes(" yes "));
        assert!(!is_yes("n"));
        assert!(!is_yes(""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_session_exports_email() {
        let dir = tempfile::tempdir().unwrap();
        let export = dir.path().join("out.txt");
        let mut wizard = wizard(vec![
            Step::ok(job_json()),
            Step::ok(json!({
                "subject": "SRE at Umbrella",
                "content": "Hello Umbrella",
                "confidence_score": 0.9,
                "personalization_level": "high"
            })),
        ]);

        let input = "https://www.indeed.com/viewjob?jk=1\n\
                     \n\
                     Jill Valentine\n\
                     jill@example.com\n\
                     Linux fleets and Terraform modules\n\
                     \n\
                     \n\
                     y\n\
                     n\n";
        let mut terminal = Terminal::new(input.as_bytes(), Vec::new()).with_export_path(&export);
        terminal.run(&mut wizard).await.unwrap();

        assert_eq!(wizard.step(), WizardStep::Result);
        assert_eq!(
            std::fs::read_to_string(&export).unwrap(),
            "Subject: SRE at Umbrella\n\nHello Umbrella"
        );
        let output = String::from_utf8(terminal.into_writer()).unwrap();
        assert!(output.contains("Company:    Umbrella"));
        assert!(output.contains("Confidence: 90%"));
        assert!(wizard.session().notifications.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_url_is_reported_and_reprompted() {
        let mut wizard = wizard(vec![]);
        let input = "https://example.com/careers\n";
        let mut terminal = Terminal::new(input.as_bytes(), Vec::new());

        terminal.run(&mut wizard).await.unwrap();

        assert_eq!(wizard.step(), WizardStep::Url);
        let output = String::from_utf8(terminal.into_writer()).unwrap();
        assert_eq!(output.matches("Job posting URL").count(), 2);
        assert!(output.contains("  ! "));
    }

    #[tokio::test(start_paused = true)]
    async fn test_review_edits_replace_job_fields() {
        let mut wizard = wizard(vec![Step::ok(job_json())]);
        let input = "https://www.indeed.com/viewjob?jk=1\n\
                     y\n\
                     Platform Engineer\n\
                     \n\
                     Linux, Nomad\n";
        let mut terminal = Terminal::new(input.as_bytes(), Vec::new());

        terminal.run(&mut wizard).await.unwrap();

        let job = &wizard.session().job;
        assert_eq!(job.role, "Platform Engineer");
        assert_eq!(job.company, "Umbrella");
        assert_eq!(job.skills, vec!["Linux", "Nomad"]);
        assert_eq!(wizard.step(), WizardStep::PersonalInfo);
    }

    // Real clock: the generation call outlasts the toast lifetime.
    #[tokio::test]
    async fn test_storage_warning_survives_slow_generation() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Step::ok(job_json()),
            Step::Hang(std::time::Duration::from_millis(3200)),
        ]));
        let timeout = std::time::Duration::from_secs(30);
        let config = RequestConfig::new("http://backend.test", timeout, 0).unwrap();
        let client = RequestClient::with_transport(config, transport);
        let mut wizard = Wizard::new(client, PersonalInfoStore::new(Arc::new(ReadOnlyStore)));

        let input = "https://www.indeed.com/viewjob?jk=1\n\
                     \n\
                     Jill Valentine\n\
                     jill@example.com\n\
                     Linux fleets and Terraform modules\n\
                     \n\
                     \n";
        let mut terminal = Terminal::new(input.as_bytes(), Vec::new());
        terminal.run(&mut wizard).await.unwrap();

        assert_eq!(wizard.step(), WizardStep::Result);
        let output = String::from_utf8(terminal.into_writer()).unwrap();
        assert!(output.contains("[warn] Could not save your info: Storage I/O error: read-only"));
        assert!(output.contains("[error] "));
    }
}
