//! SQLite-backed key/value store.
//!
//! The app's durable state is three JSON documents in a single `kv` table:
//! the session collection, the notification preferences, and the activity
//! counter document. Writes are whole-document -- every mutation serializes
//! the full current object, last writer wins. Single-process local state
//! needs no optimistic concurrency.

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{CoreError, StorageError};
use crate::notify::NotificationPreferences;
use crate::session::CoachingSession;

use super::data_dir;

/// kv key holding the JSON session collection.
pub const SESSIONS_KEY: &str = "coaching_sessions";
/// kv key holding the JSON notification preferences.
pub const PREFERENCES_KEY: &str = "notification_preferences";
/// kv key holding the activity counter document.
pub const ACTIVITY_KEY: &str = "userActivityData";

/// SQLite database holding the key/value state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/mindbloom/mindbloom.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("mindbloom.db");
        Self::open_at(path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: impl Into<std::path::PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let conn = Connection::open(&path)
            .map_err(|source| StorageError::OpenFailed { path, source })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    /// Open an in-memory database (tests, headless runs).
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Read one value.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Write one value (insert or replace).
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    // ── Typed round-trips ────────────────────────────────────────────

    /// Load the full session collection. An absent key means first run and
    /// yields an empty list; `fullDate`/`createdAt` come back as instants.
    pub fn load_sessions(&self) -> Result<Vec<CoachingSession>, CoreError> {
        match self.kv_get(SESSIONS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Persist the full session collection (not deltas).
    pub fn save_sessions(&self, sessions: &[CoachingSession]) -> Result<(), CoreError> {
        let json = serde_json::to_string(sessions)?;
        self.kv_set(SESSIONS_KEY, &json)?;
        Ok(())
    }

    /// Load preferences. Stored keys merge over defaults, so payloads
    /// written by older app versions pick up newly introduced fields.
    pub fn load_preferences(&self) -> Result<NotificationPreferences, CoreError> {
        match self.kv_get(PREFERENCES_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(NotificationPreferences::default()),
        }
    }

    /// Persist the full preferences object.
    pub fn save_preferences(&self, preferences: &NotificationPreferences) -> Result<(), CoreError> {
        let json = serde_json::to_string(preferences)?;
        self.kv_set(PREFERENCES_KEY, &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_round_trip() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.kv_get("missing").unwrap(), None);
        db.kv_set("k", "v1").unwrap();
        db.kv_set("k", "v2").unwrap();
        assert_eq!(db.kv_get("k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn fresh_store_has_no_sessions_and_default_preferences() {
        let db = Database::open_memory().unwrap();
        assert!(db.load_sessions().unwrap().is_empty());
        assert_eq!(
            db.load_preferences().unwrap(),
            NotificationPreferences::default()
        );
    }

    #[test]
    fn preferences_round_trip() {
        let db = Database::open_memory().unwrap();
        let mut prefs = NotificationPreferences::default();
        prefs.enabled = false;
        prefs.reminder_times = vec![15, 60];
        db.save_preferences(&prefs).unwrap();
        assert_eq!(db.load_preferences().unwrap(), prefs);
    }
}
