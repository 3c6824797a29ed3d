//! SQLite-backed settings store.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{SettingsError, SettingsSnapshot, SettingsStore};

/// Key under which the whole snapshot is stored.
const SNAPSHOT_KEY: &str = "snapshot";

/// SQLite-backed settings store.
///
/// The snapshot is written as a single JSON row so a save is atomic.
pub struct SqliteSettingsStore {
    conn: Mutex<Connection>,
}

impl SqliteSettingsStore {
    /// Open (or create) the database file and its tables.
    pub fn new(path: &Path) -> Result<Self, SettingsError> {
        let conn = Connection::open(path).map_err(|e| SettingsError::Store(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, SettingsError> {
        let conn = Connection::open_in_memory().map_err(|e| SettingsError::Store(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), SettingsError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| SettingsError::Store(e.to_string()))
    }
}

impl SettingsStore for SqliteSettingsStore {
    fn load(&self) -> Result<Option<SettingsSnapshot>, SettingsError> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);

        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![SNAPSHOT_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| SettingsError::Store(e.to_string()))?;

        value
            .map(|json| {
                serde_json::from_str::<SettingsSnapshot>(&json)
                    .map(SettingsSnapshot::normalized)
                    .map_err(|e| SettingsError::Store(format!("corrupt settings row: {e}")))
            })
            .transpose()
    }

    fn save(&self, snapshot: &SettingsSnapshot) -> Result<(), SettingsError> {
        let json =
            serde_json::to_string(snapshot).map_err(|e| SettingsError::Store(e.to_string()))?;
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);

        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?, ?, ?)",
            params![SNAPSHOT_KEY, json, Utc::now().to_rfc3339()],
        )
        .map_err(|e| SettingsError::Store(e.to_string()))?;

        Ok(())
    }
}
