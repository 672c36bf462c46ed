//! The four-step outreach wizard: pure session state plus an async driver
//! that performs the backend calls between steps.

pub mod driver;
pub mod notifications;
pub mod session;

use thiserror::Error;

use crate::models::PersonalInfoError;
use crate::services::UrlValidationError;

pub use driver::Wizard;
pub use notifications::{Notification, NotificationKind};
pub use session::{Event, Session, WizardStep};

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Cannot apply {event} during the {step} step")]
    InvalidTransition { step: WizardStep, event: &'static str },

    #[error("{0}")]
    InvalidUrl(#[from] UrlValidationError),

    #[error("{0}")]
    InvalidPersonalInfo(#[from] PersonalInfoError),

    #[error("Failed to write email: {0}")]
    Export(#[from] std::io::Error),
}
