//! Persistence: SQLite-backed key/value store and the usage counter.

pub mod activity;
pub mod database;

pub use activity::{ActivityTracker, UserActivityData};
pub use database::Database;

use std::path::PathBuf;

/// Returns `~/.config/mindbloom[-dev]/` based on MINDBLOOM_ENV.
///
/// Set MINDBLOOM_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MINDBLOOM_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("mindbloom-dev")
    } else {
        base_dir.join("mindbloom")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
