use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every change to the session collection produces an Event.
/// The GUI polls the manager and drains these to refresh itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionAdded {
        session_id: String,
        full_date: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    SessionUpdated {
        session_id: String,
        at: DateTime<Utc>,
    },
    SessionDeleted {
        session_id: String,
        at: DateTime<Utc>,
    },
    /// Explicit user cancel. The entry stays visible as cancelled until the
    /// next reconciliation pass sweeps it.
    SessionCancelled {
        session_id: String,
        at: DateTime<Utc>,
    },
    /// A session crossed its start instant during a reconciliation pass.
    SessionCompleted {
        session_id: String,
        /// Lifetime completed-session count after this completion.
        total_completed: u64,
        at: DateTime<Utc>,
    },
    /// One reconciliation pass that changed the collection.
    CleanupPass {
        newly_completed: usize,
        pruned: usize,
        at: DateTime<Utc>,
    },
    /// Reminders were registered for a session.
    RemindersScheduled {
        session_id: String,
        count: usize,
        at: DateTime<Utc>,
    },
}
