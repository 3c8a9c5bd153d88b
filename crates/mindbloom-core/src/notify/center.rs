//! The platform notification collaborator seam.
//!
//! The GUI shell implements [`NotificationCenter`] over the real OS
//! notification APIs; this crate only consumes the contract. A scheduled
//! reminder is pending until the platform either delivers it (it then
//! leaves the scheduled list) or an explicit cancel removes it. There is no
//! retry -- a missed delivery is not resurrected here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock;
use crate::error::NotificationError;
use crate::session::SessionType;

/// Routing payload carried by every reminder, so a delivered-notification
/// tap can be correlated back to its session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPayload {
    pub session_id: String,
    pub session_type: SessionType,
    pub goal: String,
    pub minutes_before: u32,
}

/// What the platform displays, plus the routing payload and presentation
/// hints forwarded from preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderContent {
    pub title: String,
    pub body: String,
    pub data: ReminderPayload,
    pub sound: bool,
    pub vibration: bool,
}

/// A reminder currently scheduled with the platform. Owned by the
/// collaborator; referenced, never persisted by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledReminder {
    pub identifier: String,
    pub content: ReminderContent,
    pub fire_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    #[default]
    Undetermined,
    Granted,
    Denied,
}

/// Contract of the platform notification service.
pub trait NotificationCenter {
    /// Register one local notification for a concrete future instant.
    /// Returns the platform identifier used for later cancellation.
    fn schedule(
        &mut self,
        content: ReminderContent,
        fire_at: DateTime<Utc>,
    ) -> Result<String, NotificationError>;

    /// Remove one scheduled notification. Unknown identifiers are a no-op.
    fn cancel(&mut self, identifier: &str) -> Result<(), NotificationError>;

    /// Remove every scheduled notification regardless of owner.
    fn cancel_all(&mut self) -> Result<(), NotificationError>;

    /// The live list of pending notifications.
    fn scheduled(&self) -> Result<Vec<ScheduledReminder>, NotificationError>;

    fn permission_status(&self) -> PermissionStatus;

    /// Prompt the user when permission is still undetermined.
    fn request_permission(&mut self) -> PermissionStatus;
}

/// In-process notification center.
///
/// Backs tests and headless runs. Behaves like the platforms at the
/// contract level -- past triggers are rejected -- but never delivers
/// anything.
#[derive(Debug, Default)]
pub struct MemoryNotificationCenter {
    pending: Vec<ScheduledReminder>,
    permission: PermissionStatus,
}

impl MemoryNotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A center whose permission prompt has already been declined.
    pub fn denied() -> Self {
        Self {
            pending: Vec::new(),
            permission: PermissionStatus::Denied,
        }
    }
}

impl NotificationCenter for MemoryNotificationCenter {
    fn schedule(
        &mut self,
        content: ReminderContent,
        fire_at: DateTime<Utc>,
    ) -> Result<String, NotificationError> {
        if fire_at <= clock::now() {
            return Err(NotificationError::PastTrigger { fire_at });
        }
        let identifier = Uuid::new_v4().to_string();
        self.pending.push(ScheduledReminder {
            identifier: identifier.clone(),
            content,
            fire_at,
        });
        Ok(identifier)
    }

    fn cancel(&mut self, identifier: &str) -> Result<(), NotificationError> {
        self.pending.retain(|r| r.identifier != identifier);
        Ok(())
    }

    fn cancel_all(&mut self) -> Result<(), NotificationError> {
        self.pending.clear();
        Ok(())
    }

    fn scheduled(&self) -> Result<Vec<ScheduledReminder>, NotificationError> {
        Ok(self.pending.clone())
    }

    fn permission_status(&self) -> PermissionStatus {
        self.permission
    }

    fn request_permission(&mut self) -> PermissionStatus {
        if self.permission == PermissionStatus::Undetermined {
            self.permission = PermissionStatus::Granted;
        }
        self.permission
    }
}
