//! Integration tests for reminder scheduling.
//!
//! Covers the idempotence and lead-buffer guarantees, preference
//! persistence, and the permission-denied degradation path.

use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use mindbloom_core::{
    ActivityTracker, CoachingSession, Database, MemoryNotificationCenter, NewSession,
    NotificationScheduler, PermissionStatus, PreferencesUpdate, Recurrence, SessionManager,
    SessionStatus, SessionType,
};
use proptest::prelude::*;

fn scheduler_with_db(db: Rc<Database>) -> NotificationScheduler {
    NotificationScheduler::new(db, Box::new(MemoryNotificationCenter::new()))
}

fn manager_with_center(center: MemoryNotificationCenter) -> SessionManager {
    let db = Rc::new(Database::open_memory().unwrap());
    let scheduler = NotificationScheduler::new(Rc::clone(&db), Box::new(center));
    let activity = ActivityTracker::new(Rc::clone(&db));
    SessionManager::new(db, scheduler, activity)
}

fn manager() -> SessionManager {
    manager_with_center(MemoryNotificationCenter::new())
}

fn new_session_at(full_date: DateTime<Utc>) -> NewSession {
    NewSession {
        goal: "Anxiety coaching".into(),
        session_type: SessionType::Call,
        recurring: Recurrence::None,
        full_date,
        display_time: "2:00 PM".into(),
    }
}

fn upcoming_session_at(full_date: DateTime<Utc>) -> CoachingSession {
    CoachingSession {
        id: "fixed-id".into(),
        goal: "Focus work".into(),
        session_type: SessionType::Chat,
        recurring: Recurrence::Daily,
        full_date,
        display_time: "11:00 AM".into(),
        status: SessionStatus::Upcoming,
        created_at: Utc::now(),
    }
}

fn reminders_for(mgr: &SessionManager, id: &str) -> usize {
    mgr.scheduler()
        .scheduled_reminders()
        .iter()
        .filter(|r| r.content.data.session_id == id)
        .count()
}

#[test]
fn scheduling_twice_leaves_the_same_reminder_set() {
    let mut mgr = manager();
    let session = mgr.add_session(new_session_at(Utc::now() + Duration::minutes(40)));
    assert_eq!(reminders_for(&mgr, &session.id), 1);

    // A second pass (e.g. after an edit) cancels and re-registers.
    let count = mgr.scheduler_mut().schedule_session_reminders(&session);
    assert_eq!(count, 1);
    assert_eq!(reminders_for(&mgr, &session.id), 1);
}

#[test]
fn reminder_fires_thirty_minutes_before_the_session() {
    let mut mgr = manager();
    let full_date = Utc::now() + Duration::minutes(40);
    let session = mgr.add_session(new_session_at(full_date));

    let reminders = mgr.scheduler().scheduled_reminders();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].fire_at, full_date - Duration::minutes(30));
    assert_eq!(reminders[0].content.data.session_id, session.id);
}

#[test]
fn session_inside_the_lead_buffer_gets_no_reminders() {
    let mut mgr = manager();
    let session = mgr.add_session(new_session_at(Utc::now() + Duration::minutes(3)));
    assert_eq!(reminders_for(&mgr, &session.id), 0);
}

#[test]
fn lead_times_that_no_longer_fit_are_skipped() {
    let mut mgr = manager();
    mgr.scheduler_mut().update_preferences(PreferencesUpdate {
        reminder_times: Some(vec![30, 60]),
        ..Default::default()
    });

    // 40 minutes out: the 30-minute reminder fits, the 60-minute one is
    // already in the past and is skipped without error.
    let full_date = Utc::now() + Duration::minutes(40);
    let session = mgr.add_session(new_session_at(full_date));
    let reminders = mgr.scheduler().scheduled_reminders();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].content.data.session_id, session.id);
    assert_eq!(reminders[0].content.data.minutes_before, 30);
}

#[test]
fn multiple_lead_times_schedule_one_reminder_each() {
    let mut mgr = manager();
    mgr.scheduler_mut().update_preferences(PreferencesUpdate {
        reminder_times: Some(vec![15, 60]),
        ..Default::default()
    });

    let session = mgr.add_session(new_session_at(Utc::now() + Duration::hours(3)));
    assert_eq!(reminders_for(&mgr, &session.id), 2);
}

#[test]
fn delete_cancels_only_that_sessions_reminders() {
    let mut mgr = manager();
    let doomed = mgr.add_session(new_session_at(Utc::now() + Duration::hours(1)));
    let kept = mgr.add_session(new_session_at(Utc::now() + Duration::hours(2)));

    assert!(mgr.delete_session(&doomed.id));
    assert_eq!(reminders_for(&mgr, &doomed.id), 0);
    assert_eq!(reminders_for(&mgr, &kept.id), 1);
}

#[test]
fn disabling_preferences_does_not_revoke_existing_reminders() {
    let mut mgr = manager();
    let earlier = mgr.add_session(new_session_at(Utc::now() + Duration::hours(1)));
    mgr.scheduler_mut().update_preferences(PreferencesUpdate {
        enabled: Some(false),
        ..Default::default()
    });
    let later = mgr.add_session(new_session_at(Utc::now() + Duration::hours(2)));

    // The new session is suppressed; the old reminder stays until an
    // explicit cancel.
    assert_eq!(reminders_for(&mgr, &later.id), 0);
    assert_eq!(reminders_for(&mgr, &earlier.id), 1);

    mgr.scheduler_mut().cancel_all_reminders();
    assert!(mgr.scheduler().scheduled_reminders().is_empty());
}

#[test]
fn denied_permission_degrades_to_a_noop() {
    let mut mgr = manager_with_center(MemoryNotificationCenter::denied());
    assert_eq!(
        mgr.scheduler().permission_status(),
        PermissionStatus::Denied
    );
    let session = mgr.add_session(new_session_at(Utc::now() + Duration::hours(1)));
    assert_eq!(reminders_for(&mgr, &session.id), 0);
    // The session itself is still created and tracked.
    assert_eq!(mgr.upcoming_sessions().len(), 1);
}

#[test]
fn preferences_stored_by_an_older_version_merge_over_defaults() {
    let db = Rc::new(Database::open_memory().unwrap());
    db.kv_set("notification_preferences", r#"{"enabled":false}"#)
        .unwrap();

    let scheduler = scheduler_with_db(db);
    assert!(!scheduler.preferences().enabled);
    assert_eq!(scheduler.preferences().reminder_times, vec![30]);
    assert!(scheduler.preferences().sound);
}

#[test]
fn update_preferences_persists_the_merged_object() {
    let db = Rc::new(Database::open_memory().unwrap());
    let mut scheduler = scheduler_with_db(Rc::clone(&db));
    scheduler.update_preferences(PreferencesUpdate {
        reminder_times: Some(vec![15, 45]),
        sound: Some(false),
        ..Default::default()
    });
    drop(scheduler);

    let reloaded = db.load_preferences().unwrap();
    assert!(reloaded.enabled);
    assert_eq!(reloaded.reminder_times, vec![15, 45]);
    assert!(!reloaded.sound);
    assert!(reloaded.vibration);
}

proptest! {
    /// Whatever the lead-time mix and session offset, every registered
    /// reminder fires strictly in the future, and re-scheduling reproduces
    /// exactly the same set.
    #[test]
    fn registered_fire_times_are_strictly_future(
        lead_times in proptest::collection::vec(1u32..240, 1..4),
        offset_min in 6i64..600,
    ) {
        let db = Rc::new(Database::open_memory().unwrap());
        let mut scheduler = scheduler_with_db(db);
        scheduler.update_preferences(PreferencesUpdate {
            reminder_times: Some(lead_times),
            ..Default::default()
        });

        let session = upcoming_session_at(Utc::now() + Duration::minutes(offset_min));
        let registered = scheduler.schedule_session_reminders(&session);

        let now = Utc::now();
        let reminders = scheduler.scheduled_reminders();
        prop_assert_eq!(reminders.len(), registered);
        for reminder in &reminders {
            prop_assert!(reminder.fire_at > now);
        }

        let again = scheduler.schedule_session_reminders(&session);
        prop_assert_eq!(again, registered);
        prop_assert_eq!(scheduler.scheduled_reminders().len(), registered);
    }
}
