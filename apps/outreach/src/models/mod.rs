pub mod email;
pub mod job;
pub mod personal;

pub use email::{GeneratedEmail, PersonalizationLevel};
pub use job::{JobData, JobType};
pub use personal::{PersonalInfo, PersonalInfoError};
