//! SQLite persistence for users, sessions and saved plans.
//!
//! A single connection guarded by a mutex. Every operation is a short
//! statement or transaction, so handlers call straight in.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use rusqlite::types::Type;
use tracing::{debug, info};

mod error;
mod models;
mod projects;
mod sessions;
mod users;

pub use error::{DatabaseResultExt, Result, StoreError};
pub use models::{HistoryEntry, SUMMARY_SNIPPET_CHARS, Session, StoredProject, User};

/// Database connection and operations handler
pub struct Store {
    connection: Mutex<Connection>,
}

impl Store {
    /// Opens (creating if needed) the database at `path` and initializes the schema
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(?path, "Store::open: called");
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::FileSystem {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let connection = Connection::open(path).db_context("Failed to open database connection")?;
        let store = Self::with_connection(connection)?;
        info!("Opened database at {}", path.display());
        Ok(store)
    }

    /// In-memory database, used by tests and one-shot CLI runs
    pub fn open_in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory().db_context("Failed to open in-memory database")?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self> {
        let store = Self {
            connection: Mutex::new(connection),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initializes the database schema using the embedded SQL file
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("PRAGMA foreign_keys = ON", [])
            .db_context("Failed to enable foreign keys")?;

        let schema_sql = include_str!("../../assets/schema.sql");
        conn.execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection.lock().map_err(|_| StoreError::Poisoned)
    }
}

/// Timestamps are stored as fixed-precision RFC 3339 so text order is time order
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_round_trip() {
        let now = Utc::now();
        let parsed = parse_timestamp(0, &format_timestamp(now)).unwrap();
        // Micro-second precision on disk
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn test_timestamp_text_order_matches_time_order() {
        let early = Utc::now();
        let late = early + chrono::Duration::milliseconds(1500);
        assert!(format_timestamp(early) < format_timestamp(late));
    }

    #[test]
    fn test_bad_timestamp_is_conversion_error() {
        assert!(matches!(
            parse_timestamp(3, "yesterday"),
            Err(rusqlite::Error::FromSqlConversionFailure(3, Type::Text, _))
        ));
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/planwright.db");
        Store::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planwright.db");
        Store::open(&path).unwrap();
        Store::open(&path).unwrap();
    }
}
