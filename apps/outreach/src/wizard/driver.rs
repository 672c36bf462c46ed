//! Drives a `Session` through the backend calls.
//!
//! Input is validated before anything is sent. Call failures never escape as
//! errors: they become session events (error text + toast, and the local
//! fallback email for generation) so the wizard can always continue.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api_client::RequestClient;
use crate::models::{GeneratedEmail, JobData, PersonalInfo};
use crate::services::{extract_job_data, generate_email, validate_job_url};
use crate::storage::PersonalInfoStore;
use crate::wizard::session::{Event, Session, WizardStep};
use crate::wizard::WizardError;

pub struct Wizard {
    client: RequestClient,
    store: PersonalInfoStore,
    session: Session,
}

impl Wizard {
    /// Starts a session, pre-filling personal info from the store.
    pub fn new(client: RequestClient, store: PersonalInfoStore) -> Self {
        let saved = store.load();
        if saved.is_some() {
            info!("Loaded saved personal info");
        }
        Self {
            client,
            store,
            session: Session::new(saved),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn step(&self) -> WizardStep {
        self.session.step
    }

    /// Step 1 → 2. Stays on step 1 (with an error toast) if extraction fails.
    pub async fn submit_url(&mut self, input: &str) -> Result<(), WizardError> {
        self.ensure_step(WizardStep::Url, "ExtractionStarted")?;
        let url = validate_job_url(input)?.to_string();

        self.dispatch(Event::ExtractionStarted)?;
        let event = match extract_job_data(&self.client, &url).await {
            Ok(job) => Event::JobExtracted(job),
            Err(e) => {
                warn!("Job extraction failed: {e}");
                Event::ExtractionFailed(e.to_string())
            }
        };
        self.dispatch(event)
    }

    pub fn edit_job(&mut self, job: JobData) -> Result<(), WizardError> {
        self.dispatch(Event::JobEdited(job))
    }

    /// Step 2 → 3.
    pub fn confirm_review(&mut self) -> Result<(), WizardError> {
        self.dispatch(Event::ReviewConfirmed)
    }

    /// Step 3 → 4. Saves the info, then generates; on failure the fallback
    /// email is shown instead.
    pub async fn submit_personal_info(&mut self, info: PersonalInfo) -> Result<(), WizardError> {
        self.ensure_step(WizardStep::PersonalInfo, "PersonalInfoSubmitted")?;
        info.validate()?;

        if let Err(e) = self.store.save(&info) {
            warn!("Failed to persist personal info: {e}");
            self.dispatch(Event::StorageFailed(e.to_string()))?;
        }

        self.dispatch(Event::PersonalInfoSubmitted(info))?;
        let session = &self.session;
        let event = match generate_email(&self.client, &session.job, &session.personal_info).await {
            Ok(email) => Event::EmailGenerated(email),
            Err(e) => {
                warn!("Email generation failed, using fallback template: {e}");
                Event::GenerationFailed(e.to_string())
            }
        };
        self.dispatch(event)
    }

    pub fn edit_email(&mut self, email: GeneratedEmail) -> Result<(), WizardError> {
        self.dispatch(Event::EmailEdited(email))
    }

    /// Writes the `Subject: ...` rendering of the current email to `path`.
    pub fn export_email(&mut self, path: &Path) -> Result<(), WizardError> {
        self.ensure_step(WizardStep::Result, "EmailExported")?;
        std::fs::write(path, self.session.email.to_plain_text())?;
        info!("Email written to {}", path.display());
        self.dispatch(Event::EmailExported(path.display().to_string()))
    }

    pub fn restart(&mut self) -> Result<(), WizardError> {
        self.dispatch(Event::Restart)
    }

    pub fn dismiss(&mut self, id: Uuid) -> Result<(), WizardError> {
        self.dispatch(Event::NotificationDismissed(id))
    }

    pub fn expire_notifications(&mut self, now: DateTime<Utc>) {
        self.session = std::mem::take(&mut self.session).expire_notifications(now);
    }

    fn ensure_step(&self, expected: WizardStep, event: &'static str) -> Result<(), WizardError> {
        if self.session.step == expected {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition {
                step: self.session.step,
                event,
            })
        }
    }

    fn dispatch(&mut self, event: Event) -> Result<(), WizardError> {
        self.session = self.session.clone().apply(event)?;
        Ok(())
    }
}
