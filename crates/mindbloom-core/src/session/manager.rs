//! Session lifecycle management.
//!
//! The manager is the single source of truth for the session collection and
//! owns the upcoming -> completed state machine. It spawns no threads: the
//! embedding application calls [`SessionManager::cleanup_old_sessions`] on
//! its own cadence (hourly is plenty), and the manager re-runs the same
//! pass after every mutation, so stale entries get reconciled promptly no
//! matter which trigger fires first.
//!
//! ## State Transitions
//!
//! ```text
//! Upcoming -> Completed      (automatic, during a reconciliation pass)
//! Upcoming -> Cancelled      (explicit user cancel; swept by the next pass)
//! ```
//!
//! Deletion is destructive, not a state -- it removes the entry outright.

use std::rc::Rc;

use crate::clock;
use crate::events::Event;
use crate::notify::NotificationScheduler;
use crate::session::{CoachingSession, NewSession, SessionPatch, SessionStatus};
use crate::storage::{ActivityTracker, Database};

/// Completed sessions older than this many days are dropped for good. No
/// soft-delete, no archive.
pub const RETENTION_DAYS: i64 = 7;

/// Suggested cadence for the caller-driven reconciliation safety net, in
/// seconds.
pub const CLEANUP_INTERVAL_SECS: u64 = 3600;

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Sessions flipped upcoming -> completed by this pass.
    pub newly_completed: usize,
    /// Sessions dropped by the retention policy.
    pub pruned: usize,
    /// Whether the collection changed (and was re-persisted).
    pub changed: bool,
}

/// Owns the canonical session collection and its collaborators.
///
/// Constructed explicitly at the composition root -- there is exactly one
/// instance per process, but nothing here is a global.
pub struct SessionManager {
    db: Rc<Database>,
    scheduler: NotificationScheduler,
    activity: ActivityTracker,
    sessions: Vec<CoachingSession>,
    events: Vec<Event>,
}

impl SessionManager {
    /// Load the persisted collection and wire the collaborators together.
    ///
    /// A load failure is logged and yields an empty collection -- local
    /// state may come up stale, never fatal.
    pub fn new(
        db: Rc<Database>,
        scheduler: NotificationScheduler,
        activity: ActivityTracker,
    ) -> Self {
        let sessions = db.load_sessions().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load sessions, starting empty");
            Vec::new()
        });
        Self {
            db,
            scheduler,
            activity,
            sessions,
            events: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self, id: &str) -> Option<&CoachingSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// The raw collection, unfiltered and unsorted.
    pub fn sessions(&self) -> &[CoachingSession] {
        &self.sessions
    }

    /// Upcoming sessions strictly in the future, soonest first. Recomputed
    /// on every call; never contains a session whose start has passed,
    /// regardless of stored status.
    pub fn upcoming_sessions(&self) -> Vec<CoachingSession> {
        let now = clock::now();
        let mut upcoming: Vec<CoachingSession> = self
            .sessions
            .iter()
            .filter(|s| s.status == SessionStatus::Upcoming && s.full_date > now)
            .cloned()
            .collect();
        upcoming.sort_by(|a, b| {
            a.full_date
                .cmp(&b.full_date)
                .then(a.created_at.cmp(&b.created_at))
        });
        upcoming
    }

    /// Completed sessions, most recent first. Upcoming sessions whose start
    /// already passed are included before any reconciliation pass flips
    /// them, so the history view is current the moment a session ends.
    pub fn completed_sessions(&self) -> Vec<CoachingSession> {
        let now = clock::now();
        let mut completed: Vec<CoachingSession> = self
            .sessions
            .iter()
            .filter(|s| match s.status {
                SessionStatus::Completed => true,
                SessionStatus::Upcoming => s.has_started(now),
                SessionStatus::Cancelled => false,
            })
            .cloned()
            .collect();
        completed.sort_by(|a, b| {
            b.full_date
                .cmp(&a.full_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        completed
    }

    pub fn scheduler(&self) -> &NotificationScheduler {
        &self.scheduler
    }

    /// Mutable scheduler access for preference updates and user-initiated
    /// clears.
    pub fn scheduler_mut(&mut self) -> &mut NotificationScheduler {
        &mut self.scheduler
    }

    /// Buffered state-change events, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Create a session and register its reminders.
    ///
    /// The session is kept even when persistence or scheduling fails --
    /// both degrade to a warning and never roll back the creation.
    pub fn add_session(&mut self, data: NewSession) -> CoachingSession {
        let session = CoachingSession::create(data);
        self.sessions.push(session.clone());
        self.persist();
        let count = self.scheduler.schedule_session_reminders(&session);
        let at = clock::now();
        self.events.push(Event::SessionAdded {
            session_id: session.id.clone(),
            full_date: session.full_date,
            at,
        });
        if count > 0 {
            self.events.push(Event::RemindersScheduled {
                session_id: session.id.clone(),
                count,
                at,
            });
        }
        self.cleanup_old_sessions();
        session
    }

    /// Shallow-merge `patch` into the matching session and persist.
    ///
    /// Reminders are not re-registered here -- a caller that moves
    /// `full_date` re-invokes the scheduler for the session explicitly.
    /// Unknown ids are a no-op.
    pub fn update_session(&mut self, id: &str, patch: SessionPatch) -> bool {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
            tracing::debug!(session_id = %id, "update for unknown session ignored");
            return false;
        };
        patch.apply(session);
        self.persist();
        self.events.push(Event::SessionUpdated {
            session_id: id.to_string(),
            at: clock::now(),
        });
        self.cleanup_old_sessions();
        true
    }

    /// Remove the session outright (any state) and cancel its reminders.
    /// Unknown ids are a no-op.
    pub fn delete_session(&mut self, id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        if self.sessions.len() == before {
            tracing::debug!(session_id = %id, "delete for unknown session ignored");
            return false;
        }
        self.persist();
        // Best-effort reminder cleanup; the deletion stands regardless.
        self.scheduler.cancel_session_reminders(id);
        self.events.push(Event::SessionDeleted {
            session_id: id.to_string(),
            at: clock::now(),
        });
        self.cleanup_old_sessions();
        true
    }

    /// Cancel without deleting: the session stays visible as cancelled
    /// until the next reconciliation pass sweeps it. Only an upcoming
    /// session can be cancelled; anything else is a no-op.
    ///
    /// Does not run the reactive pass here: it would sweep the entry
    /// before the UI ever saw the cancelled state.
    pub fn cancel_session(&mut self, id: &str) -> bool {
        let Some(session) = self
            .sessions
            .iter_mut()
            .find(|s| s.id == id && s.status == SessionStatus::Upcoming)
        else {
            return false;
        };
        session.status = SessionStatus::Cancelled;
        self.persist();
        self.scheduler.cancel_session_reminders(id);
        self.events.push(Event::SessionCancelled {
            session_id: id.to_string(),
            at: clock::now(),
        });
        true
    }

    /// One reconciliation pass.
    ///
    /// Runs after every mutation and on the embedding app's interval; both
    /// producers feed this one idempotent handler, so overlapping triggers
    /// are harmless. The upcoming -> completed flip is the exactly-once
    /// guard for the usage counter: a session makes that transition once,
    /// no matter how often the pass runs.
    pub fn cleanup_old_sessions(&mut self) -> CleanupReport {
        let now = clock::now();
        let cutoff = clock::days_before(now, RETENTION_DAYS);

        let mut newly_completed: Vec<String> = Vec::new();
        for session in &mut self.sessions {
            if session.status == SessionStatus::Upcoming && session.full_date < now {
                session.status = SessionStatus::Completed;
                newly_completed.push(session.id.clone());
            }
        }

        let before = self.sessions.len();
        self.sessions.retain(|s| match s.status {
            SessionStatus::Upcoming => s.full_date > now,
            SessionStatus::Completed => s.full_date > cutoff,
            SessionStatus::Cancelled => false,
        });
        let pruned = before - self.sessions.len();

        let report = CleanupReport {
            newly_completed: newly_completed.len(),
            pruned,
            changed: !newly_completed.is_empty() || pruned > 0,
        };

        if report.changed {
            self.persist();
            for session_id in newly_completed {
                let total_completed = self.activity.record_completed_session();
                self.events.push(Event::SessionCompleted {
                    session_id,
                    total_completed,
                    at: now,
                });
            }
            self.events.push(Event::CleanupPass {
                newly_completed: report.newly_completed,
                pruned: report.pruned,
                at: now,
            });
        }
        report
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Serialize the full collection. Best-effort durability: a write
    /// failure leaves the in-memory state authoritative and is only logged.
    fn persist(&self) {
        if let Err(e) = self.db.save_sessions(&self.sessions) {
            tracing::warn!(error = %e, "failed to persist sessions");
        }
    }
}
