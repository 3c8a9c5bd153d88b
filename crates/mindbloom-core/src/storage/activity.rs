//! Usage counter collaborator.
//!
//! The lifetime completed-session count lives in the `userActivityData`
//! document, which belongs to the app's activity subsystem. This core only
//! bumps `totalSessions`, so every other field is carried through the
//! read-modify-write untouched.

use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

use super::database::{Database, ACTIVITY_KEY};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivityData {
    #[serde(default)]
    pub total_sessions: u64,
    /// Fields owned by the activity collaborator, preserved verbatim.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Advances the lifetime completed-session counter. The lifecycle manager's
/// reconciliation pass is the sole caller of the increment.
pub struct ActivityTracker {
    db: Rc<Database>,
}

impl ActivityTracker {
    pub fn new(db: Rc<Database>) -> Self {
        Self { db }
    }

    /// Current lifetime count. Zero when the document is absent or
    /// unreadable.
    pub fn total_sessions(&self) -> u64 {
        self.load().total_sessions
    }

    /// Bump the counter by one and persist. A write failure is logged; the
    /// in-memory increment still counts. Returns the new total.
    pub fn record_completed_session(&self) -> u64 {
        let mut data = self.load();
        data.total_sessions += 1;
        if let Err(e) = self.save(&data) {
            tracing::warn!(error = %e, "failed to persist activity counter");
        }
        data.total_sessions
    }

    fn load(&self) -> UserActivityData {
        match self.db.kv_get(ACTIVITY_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "activity document unreadable, starting from zero");
                UserActivityData::default()
            }),
            Ok(None) => UserActivityData::default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read activity document");
                UserActivityData::default()
            }
        }
    }

    fn save(&self, data: &UserActivityData) -> Result<(), CoreError> {
        let json = serde_json::to_string(data)?;
        self.db.kv_set(ACTIVITY_KEY, &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_from_zero() {
        let tracker = ActivityTracker::new(Rc::new(Database::open_memory().unwrap()));
        assert_eq!(tracker.total_sessions(), 0);
        assert_eq!(tracker.record_completed_session(), 1);
        assert_eq!(tracker.record_completed_session(), 2);
        assert_eq!(tracker.total_sessions(), 2);
    }

    #[test]
    fn preserves_fields_owned_by_the_activity_subsystem() {
        let db = Rc::new(Database::open_memory().unwrap());
        db.kv_set(ACTIVITY_KEY, r#"{"totalSessions":5,"streakDays":12}"#)
            .unwrap();

        let tracker = ActivityTracker::new(Rc::clone(&db));
        assert_eq!(tracker.record_completed_session(), 6);

        let stored: serde_json::Value =
            serde_json::from_str(&db.kv_get(ACTIVITY_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored["totalSessions"], 6);
        assert_eq!(stored["streakDays"], 12);
    }
}
