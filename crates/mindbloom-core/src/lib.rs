//! # Mindbloom Core Library
//!
//! Core scheduling and lifecycle engine for Mindbloom's coaching-session
//! reminders. The GUI is a thin layer over this crate: screens call the
//! [`SessionManager`] to mutate the session collection, and the manager
//! keeps persistence, reminder registration, and the usage counter
//! consistent.
//!
//! ## Architecture
//!
//! - **Session Lifecycle Manager**: single source of truth for the session
//!   collection and its upcoming -> completed state machine; the caller
//!   drives the hourly reconciliation pass -- no internal threads
//! - **Notification Scheduler**: derives reminder fire times from sessions
//!   and user lead-time preferences, keeping the platform reminder set
//!   consistent through cancel-then-reschedule
//! - **Storage**: SQLite-backed key/value store holding the JSON session
//!   collection, preferences, and activity counter
//!
//! ## Key Components
//!
//! - [`SessionManager`]: session collection, state machine, cleanup
//! - [`NotificationScheduler`]: reminder registration and preferences
//! - [`NotificationCenter`]: the platform notification seam
//! - [`Database`]: key/value persistence

pub mod clock;
pub mod error;
pub mod events;
pub mod notify;
pub mod session;
pub mod storage;

pub use error::{CoreError, NotificationError, Result, StorageError};
pub use events::Event;
pub use notify::{
    MemoryNotificationCenter, NotificationCenter, NotificationPreferences, NotificationScheduler,
    PermissionStatus, PreferencesUpdate, ReminderContent, ReminderPayload, ScheduledReminder,
    MIN_LEAD_BUFFER_MIN,
};
pub use session::{
    CleanupReport, CoachingSession, NewSession, Recurrence, SessionManager, SessionPatch,
    SessionStatus, SessionType, CLEANUP_INTERVAL_SECS, RETENTION_DAYS,
};
pub use storage::{ActivityTracker, Database, UserActivityData};
