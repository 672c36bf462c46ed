//! Wizard state as a plain value plus a transition function.
//!
//! `apply_at` does no I/O and reads no clock: toasts are stamped with the
//! `now` it is given. Only toast ids are random.
//!
//! ```text
//! URL ──JobExtracted──► REVIEW ──ReviewConfirmed──► PERSONAL_INFO ──PersonalInfoSubmitted──► RESULT
//!  ▲                                                                                           │
//!  └─────────────────────────────────────── Restart ◄──────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{GeneratedEmail, JobData, PersonalInfo};
use crate::wizard::notifications::Notification;
use crate::wizard::WizardError;

const EXTRACTION_FAILED_DEFAULT: &str =
    "Failed to extract job details. Please check the URL and try again.";
const GENERATION_FAILED_DEFAULT: &str = "Failed to generate email. Please try again.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WizardStep {
    #[default]
    Url,
    Review,
    PersonalInfo,
    Result,
}

impl WizardStep {
    pub const COUNT: usize = 4;

    /// 1-based position shown in the stepper.
    pub fn number(self) -> usize {
        match self {
            WizardStep::Url => 1,
            WizardStep::Review => 2,
            WizardStep::PersonalInfo => 3,
            WizardStep::Result => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Url => "Job URL",
            WizardStep::Review => "Review Details",
            WizardStep::PersonalInfo => "Your Info",
            WizardStep::Result => "Your Email",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::Url => "URL",
            WizardStep::Review => "REVIEW",
            WizardStep::PersonalInfo => "PERSONAL_INFO",
            WizardStep::Result => "RESULT",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    ExtractionStarted,
    JobExtracted(JobData),
    ExtractionFailed(String),
    JobEdited(JobData),
    ReviewConfirmed,
    PersonalInfoSubmitted(PersonalInfo),
    EmailGenerated(GeneratedEmail),
    GenerationFailed(String),
    EmailEdited(GeneratedEmail),
    EmailExported(String),
    StorageFailed(String),
    Restart,
    NotificationDismissed(Uuid),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::ExtractionStarted => "ExtractionStarted",
            Event::JobExtracted(_) => "JobExtracted",
            Event::ExtractionFailed(_) => "ExtractionFailed",
            Event::JobEdited(_) => "JobEdited",
            Event::ReviewConfirmed => "ReviewConfirmed",
            Event::PersonalInfoSubmitted(_) => "PersonalInfoSubmitted",
            Event::EmailGenerated(_) => "EmailGenerated",
            Event::GenerationFailed(_) => "GenerationFailed",
            Event::EmailEdited(_) => "EmailEdited",
            Event::EmailExported(_) => "EmailExported",
            Event::StorageFailed(_) => "StorageFailed",
            Event::Restart => "Restart",
            Event::NotificationDismissed(_) => "NotificationDismissed",
        }
    }
}

/// Everything the wizard shows. Only `apply` produces a new session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub step: WizardStep,
    pub job: JobData,
    pub personal_info: PersonalInfo,
    pub email: GeneratedEmail,
    pub is_loading: bool,
    pub error: Option<String>,
    pub notifications: Vec<Notification>,
}

impl Session {
    /// Fresh session; `personal_info` is whatever was saved last time.
    pub fn new(personal_info: Option<PersonalInfo>) -> Self {
        Self {
            personal_info: personal_info.unwrap_or_default(),
            ..Default::default()
        }
    }

    /// `apply_at` stamped with the wall clock.
    pub fn apply(self, event: Event) -> Result<Session, WizardError> {
        self.apply_at(event, Utc::now())
    }

    pub fn apply_at(self, event: Event, now: DateTime<Utc>) -> Result<Session, WizardError> {
        match (self.step, event) {
            (_, Event::Restart) => Ok(Session {
                step: WizardStep::Url,
                job: JobData::default(),
                email: GeneratedEmail::default(),
                is_loading: false,
                error: None,
                ..self
            }),
            (_, Event::StorageFailed(message)) => {
                let message = format!("Could not save your info: {message}");
                Ok(self.notify(Notification::warning(message, now)))
            }
            (_, Event::NotificationDismissed(id)) => {
                let mut next = self;
                next.notifications.retain(|n| n.id != id);
                Ok(next)
            }

            (WizardStep::Url, Event::ExtractionStarted) => Ok(Session {
                is_loading: true,
                error: None,
                ..self
            }),
            (WizardStep::Url, Event::JobExtracted(job)) => Ok(Session {
                step: WizardStep::Review,
                job,
                is_loading: false,
                error: None,
                ..self
            }
            .notify(Notification::success("Job details extracted successfully!", now))),
            (WizardStep::Url, Event::ExtractionFailed(message)) => {
                let message = or_default(message, EXTRACTION_FAILED_DEFAULT);
                Ok(Session {
                    is_loading: false,
                    error: Some(message.clone()),
                    ..self
                }
                .notify(Notification::error(message, now)))
            }

            (WizardStep::Review, Event::JobEdited(job)) => {
                Ok(Session { job, ..self }
                    .notify(Notification::success("Job details updated successfully!", now)))
            }
            (WizardStep::Review, Event::ReviewConfirmed) => Ok(Session {
                step: WizardStep::PersonalInfo,
                ..self
            }),

            (WizardStep::PersonalInfo, Event::PersonalInfoSubmitted(info)) => Ok(Session {
                step: WizardStep::Result,
                personal_info: info,
                is_loading: true,
                error: None,
                ..self
            }),

            (WizardStep::Result, Event::EmailGenerated(email)) => Ok(Session {
                email,
                is_loading: false,
                ..self
            }
            .notify(Notification::success("Personalized email generated!", now))),
            (WizardStep::Result, Event::GenerationFailed(message)) => {
                let message = or_default(message, GENERATION_FAILED_DEFAULT);
                let email = GeneratedEmail::fallback(&self.job, &self.personal_info);
                Ok(Session {
                    email,
                    is_loading: false,
                    error: Some(message.clone()),
                    ..self
                }
                .notify(Notification::error(message, now)))
            }
            (WizardStep::Result, Event::EmailEdited(email)) => Ok(Session { email, ..self }),
            (WizardStep::Result, Event::EmailExported(destination)) => {
                Ok(self.notify(Notification::info(format!("Email saved to {destination}"), now)))
            }

            (step, event) => Err(WizardError::InvalidTransition {
                step,
                event: event.name(),
            }),
        }
    }

    /// Drops toasts whose display time has passed.
    pub fn expire_notifications(mut self, now: DateTime<Utc>) -> Session {
        self.notifications.retain(|n| !n.is_expired(now));
        self
    }

    fn notify(mut self, notification: Notification) -> Session {
        self.notifications.push(notification);
        self
    }
}

fn or_default(message: String, default: &str) -> String {
    if message.trim().is_empty() {
        default.to_string()
    } else {
        message
    }
}
