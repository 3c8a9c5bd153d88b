//! Reminder scheduling against the platform notification collaborator.

pub mod center;
pub mod scheduler;

pub use center::{
    MemoryNotificationCenter, NotificationCenter, PermissionStatus, ReminderContent,
    ReminderPayload, ScheduledReminder,
};
pub use scheduler::{NotificationScheduler, MIN_LEAD_BUFFER_MIN};

use serde::{Deserialize, Serialize};

/// Notification preferences.
///
/// Persisted as JSON under the `notification_preferences` key. Every field
/// carries a serde default so payloads written by older app versions merge
/// over current defaults on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    /// Master kill-switch. When false no new reminders are created;
    /// already-scheduled ones are left alone until explicitly cleared.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Minutes-before-session lead times, in the order the user configured
    /// them. The UI currently exposes a single value; the model supports
    /// several.
    #[serde(default = "default_reminder_times")]
    pub reminder_times: Vec<u32>,
    /// Presentation hint forwarded to the platform, not enforced here.
    #[serde(default = "default_true")]
    pub sound: bool,
    /// Presentation hint forwarded to the platform, not enforced here.
    #[serde(default = "default_true")]
    pub vibration: bool,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_reminder_times() -> Vec<u32> {
    vec![30]
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            enabled: true,
            reminder_times: default_reminder_times(),
            sound: true,
            vibration: true,
        }
    }
}

/// Partial preference update, shallow-merged by
/// [`NotificationScheduler::update_preferences`].
#[derive(Debug, Clone, Default)]
pub struct PreferencesUpdate {
    pub enabled: Option<bool>,
    pub reminder_times: Option<Vec<u32>>,
    pub sound: Option<bool>,
    pub vibration: Option<bool>,
}

impl PreferencesUpdate {
    pub(crate) fn apply(self, prefs: &mut NotificationPreferences) {
        if let Some(enabled) = self.enabled {
            prefs.enabled = enabled;
        }
        if let Some(times) = self.reminder_times {
            // Ordered set of positive offsets: drop zeros, first occurrence wins.
            let mut normalized = Vec::with_capacity(times.len());
            for minutes in times {
                if minutes > 0 && !normalized.contains(&minutes) {
                    normalized.push(minutes);
                }
            }
            prefs.reminder_times = normalized;
        }
        if let Some(sound) = self.sound {
            prefs.sound = sound;
        }
        if let Some(vibration) = self.vibration {
            prefs.vibration = vibration;
        }
    }
}
