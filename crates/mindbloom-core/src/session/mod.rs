//! Coaching-session model and lifecycle management.

pub mod manager;

pub use manager::{CleanupReport, SessionManager, CLEANUP_INTERVAL_SECS, RETENTION_DAYS};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Call,
    Chat,
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionType::Call => write!(f, "call"),
            SessionType::Chat => write!(f, "chat"),
        }
    }
}

/// Recurrence cadence. Informational only -- sessions are single-occurrence
/// and nothing in this crate expands a cadence into extra instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    None,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Upcoming,
    Completed,
    Cancelled,
}

/// A scheduled coaching session.
///
/// Serialized with the app's historical camelCase keys; `fullDate` and
/// `createdAt` round-trip as ISO-8601 strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachingSession {
    /// Stable unique id; the join key to scheduled reminders.
    pub id: String,
    /// Free-text purpose label (display only).
    pub goal: String,
    pub session_type: SessionType,
    pub recurring: Recurrence,
    /// Authoritative session start instant.
    pub full_date: DateTime<Utc>,
    /// Precomputed human-readable time string. Derived and
    /// non-authoritative; stored verbatim, never recomputed here.
    pub display_time: String,
    pub status: SessionStatus,
    /// Immutable creation instant; tie-break and sort key.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a session. The manager assigns the id, the status,
/// and the creation time.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub goal: String,
    pub session_type: SessionType,
    pub recurring: Recurrence,
    pub full_date: DateTime<Utc>,
    pub display_time: String,
}

impl CoachingSession {
    /// Build a fresh `upcoming` session from creation input.
    pub(crate) fn create(data: NewSession) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            goal: data.goal,
            session_type: data.session_type,
            recurring: data.recurring,
            full_date: data.full_date,
            display_time: data.display_time,
            status: SessionStatus::Upcoming,
            created_at: clock::now(),
        }
    }

    /// Whether the session start has passed relative to `now`.
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.full_date < now
    }

    /// Whether the session starts on the current local calendar day.
    pub fn starts_today(&self) -> bool {
        clock::same_local_day(self.full_date, clock::now())
    }
}

/// Partial update applied with shallow-merge semantics: `None` fields are
/// left untouched. The id, status, and creation time are not patchable.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub goal: Option<String>,
    pub session_type: Option<SessionType>,
    pub recurring: Option<Recurrence>,
    pub full_date: Option<DateTime<Utc>>,
    pub display_time: Option<String>,
}

impl SessionPatch {
    pub(crate) fn apply(self, session: &mut CoachingSession) {
        if let Some(goal) = self.goal {
            session.goal = goal;
        }
        if let Some(session_type) = self.session_type {
            session.session_type = session_type;
        }
        if let Some(recurring) = self.recurring {
            session.recurring = recurring;
        }
        if let Some(full_date) = self.full_date {
            session.full_date = full_date;
        }
        if let Some(display_time) = self.display_time {
            session.display_time = display_time;
        }
    }
}
