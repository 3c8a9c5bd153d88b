//! Reminder scheduling engine.
//!
//! Keeps the platform reminder set for a session consistent with current
//! preferences: exactly one reminder per (session, lead time) pair, never
//! one whose fire instant is not strictly in the future. The collaborator's
//! live list is the source of truth -- the desired set is re-derived from
//! the session and the preferences on every call, so re-scheduling is
//! cancel-then-register and idempotent.

use std::rc::Rc;

use chrono::Duration;

use crate::clock;
use crate::notify::center::{
    NotificationCenter, PermissionStatus, ReminderContent, ReminderPayload, ScheduledReminder,
};
use crate::notify::{NotificationPreferences, PreferencesUpdate};
use crate::session::CoachingSession;
use crate::storage::Database;

/// Sessions starting sooner than this many minutes get no reminders at all,
/// even for lead times that would still fit. Guards against a reminder
/// firing seconds after the session was created.
pub const MIN_LEAD_BUFFER_MIN: i64 = 5;

pub struct NotificationScheduler {
    db: Rc<Database>,
    center: Box<dyn NotificationCenter>,
    preferences: NotificationPreferences,
    permission: PermissionStatus,
}

impl NotificationScheduler {
    /// Load persisted preferences (defaults when absent) and resolve the
    /// notification permission. Denied permission leaves the scheduler
    /// usable; scheduling calls just become no-ops.
    pub fn new(db: Rc<Database>, mut center: Box<dyn NotificationCenter>) -> Self {
        let preferences = db.load_preferences().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load notification preferences, using defaults");
            NotificationPreferences::default()
        });
        let permission = match center.permission_status() {
            PermissionStatus::Undetermined => center.request_permission(),
            status => status,
        };
        if permission == PermissionStatus::Denied {
            tracing::warn!("notification permission denied, reminders will not be scheduled");
        }
        Self {
            db,
            center,
            preferences,
            permission,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn preferences(&self) -> &NotificationPreferences {
        &self.preferences
    }

    pub fn permission_status(&self) -> PermissionStatus {
        self.permission
    }

    /// The collaborator's live list, read fresh on every call. No caching.
    pub fn scheduled_reminders(&self) -> Vec<ScheduledReminder> {
        self.center.scheduled().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to list scheduled reminders");
            Vec::new()
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Register one reminder per configured lead time for `session`.
    ///
    /// Existing reminders tagged with the session id are cancelled first,
    /// so calling this repeatedly (e.g. after an edit) never duplicates.
    /// Lead times whose fire instant already passed are skipped silently.
    /// Returns the number registered.
    pub fn schedule_session_reminders(&mut self, session: &CoachingSession) -> usize {
        if !self.preferences.enabled {
            tracing::debug!(session_id = %session.id, "reminders disabled, skipping");
            return 0;
        }
        if self.permission == PermissionStatus::Denied {
            tracing::debug!(session_id = %session.id, "notification permission denied, skipping");
            return 0;
        }
        let now = clock::now();
        if session.full_date <= now {
            // Already started or passed.
            return 0;
        }
        if session.full_date - now < Duration::minutes(MIN_LEAD_BUFFER_MIN) {
            tracing::debug!(
                session_id = %session.id,
                minutes_until_start = clock::minutes_until(session.full_date, now),
                "session starts inside the lead buffer, skipping"
            );
            return 0;
        }

        self.cancel_session_reminders(&session.id);

        let lead_times = self.preferences.reminder_times.clone();
        let sound = self.preferences.sound;
        let vibration = self.preferences.vibration;
        let mut registered = 0;
        for minutes_before in lead_times {
            let fire_at = clock::minutes_before(session.full_date, minutes_before);
            if fire_at <= now {
                continue; // This lead time no longer fits.
            }
            let content = reminder_content(session, minutes_before, sound, vibration);
            match self.center.schedule(content, fire_at) {
                Ok(identifier) => {
                    registered += 1;
                    tracing::debug!(
                        session_id = %session.id,
                        identifier = %identifier,
                        minutes_before,
                        "reminder scheduled"
                    );
                }
                Err(e) => {
                    // One rejected trigger must not sink the rest of the batch.
                    tracing::warn!(
                        session_id = %session.id,
                        minutes_before,
                        error = %e,
                        "failed to schedule reminder"
                    );
                }
            }
        }
        registered
    }

    /// Cancel every reminder whose payload carries `session_id`. Zero
    /// matches is a no-op, not an error. Returns the number cancelled.
    pub fn cancel_session_reminders(&mut self, session_id: &str) -> usize {
        let victims: Vec<String> = match self.center.scheduled() {
            Ok(list) => list
                .into_iter()
                .filter(|r| r.content.data.session_id == session_id)
                .map(|r| r.identifier)
                .collect(),
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "failed to list reminders for cancellation");
                return 0;
            }
        };
        let mut cancelled = 0;
        for identifier in victims {
            match self.center.cancel(&identifier) {
                Ok(()) => cancelled += 1,
                Err(e) => {
                    tracing::warn!(session_id = %session_id, identifier = %identifier, error = %e, "failed to cancel reminder");
                }
            }
        }
        cancelled
    }

    /// User-initiated "clear all": drops every reminder regardless of owner.
    pub fn cancel_all_reminders(&mut self) {
        if let Err(e) = self.center.cancel_all() {
            tracing::warn!(error = %e, "failed to clear scheduled reminders");
        }
    }

    /// Shallow-merge `update` into the current preferences and persist the
    /// full merged object. Existing reminders are not rescheduled -- a
    /// caller that changes lead times re-invokes
    /// [`Self::schedule_session_reminders`] per affected session.
    pub fn update_preferences(&mut self, update: PreferencesUpdate) {
        update.apply(&mut self.preferences);
        if let Err(e) = self.db.save_preferences(&self.preferences) {
            tracing::warn!(error = %e, "failed to persist notification preferences");
        }
    }
}

fn reminder_content(
    session: &CoachingSession,
    minutes_before: u32,
    sound: bool,
    vibration: bool,
) -> ReminderContent {
    ReminderContent {
        title: "Coaching session reminder".to_string(),
        body: format!(
            "Your {} session \"{}\" starts in {} minutes",
            session.session_type, session.goal, minutes_before
        ),
        data: ReminderPayload {
            session_id: session.id.clone(),
            session_type: session.session_type,
            goal: session.goal.clone(),
            minutes_before,
        },
        sound,
        vibration,
    }
}
