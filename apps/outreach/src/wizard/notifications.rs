use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// How long a toast stays up unless dismissed.
pub const DEFAULT_TOAST_MS: i64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

/// A transient user-facing message.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
    pub duration: Duration,
}

impl Notification {
    pub fn new(
        message: impl Into<String>,
        kind: NotificationKind,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            kind,
            created_at,
            duration: Duration::milliseconds(DEFAULT_TOAST_MS),
        }
    }

    pub fn success(message: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self::new(message, NotificationKind::Success, created_at)
    }

    pub fn error(message: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self::new(message, NotificationKind::Error, created_at)
    }

    pub fn warning(message: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self::new(message, NotificationKind::Warning, created_at)
    }

    pub fn info(message: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self::new(message, NotificationKind::Info, created_at)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + self.duration
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}
