//! Persistence for per-title `filtered` flags.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use super::{FilterFlag, FilterKind};

/// Errors from the filter store.
#[derive(Debug, Error)]
pub enum FilterStoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Unknown item type in store: {0}")]
    CorruptRow(String),

    /// Ids are stored as SQLite integers, so anything above `i64::MAX` is refused.
    #[error("Id out of range: {0}")]
    IdOutOfRange(u64),
}

fn stored_id(id: u64) -> Result<i64, FilterStoreError> {
    i64::try_from(id).map_err(|_| FilterStoreError::IdOutOfRange(id))
}

/// Tracks which shows and movies are flagged for censoring.
///
/// A title with no stored row is not filtered.
pub trait FilterStore: Send + Sync {
    fn is_filtered(&self, kind: FilterKind, id: u64) -> Result<bool, FilterStoreError>;

    /// Upsert the flag for a title.
    fn set_filtered(
        &self,
        kind: FilterKind,
        id: u64,
        filtered: bool,
    ) -> Result<FilterFlag, FilterStoreError>;

    /// All titles of `kind` that are currently flagged, ordered by id.
    fn list(&self, kind: FilterKind) -> Result<Vec<FilterFlag>, FilterStoreError>;
}

/// SQLite-backed filter store (`bleeparr_items` table).
pub struct SqliteFilterStore {
    conn: Mutex<Connection>,
}

impl SqliteFilterStore {
    /// Open (or create) the database file.
    pub fn new(path: &Path) -> Result<Self, FilterStoreError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, FilterStoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), FilterStoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS bleeparr_items (
                id INTEGER NOT NULL,
                type TEXT NOT NULL CHECK(type IN ('show', 'movie')),
                filtered INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (id, type)
            );
            "#,
        )?;
        Ok(())
    }
}

impl FilterStore for SqliteFilterStore {
    fn is_filtered(&self, kind: FilterKind, id: u64) -> Result<bool, FilterStoreError> {
        // An id that cannot be stored has no row.
        let Ok(id) = stored_id(id) else {
            return Ok(false);
        };
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let filtered: Option<bool> = conn
            .query_row(
                "SELECT filtered FROM bleeparr_items WHERE id = ? AND type = ?",
                params![id, kind.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(filtered.unwrap_or(false))
    }

    fn set_filtered(
        &self,
        kind: FilterKind,
        id: u64,
        filtered: bool,
    ) -> Result<FilterFlag, FilterStoreError> {
        let row_id = stored_id(id)?;
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute(
            r#"
            INSERT INTO bleeparr_items (id, type, filtered) VALUES (?1, ?2, ?3)
            ON CONFLICT(id, type) DO UPDATE SET filtered = excluded.filtered
            "#,
            params![row_id, kind.as_str(), filtered],
        )?;
        Ok(FilterFlag { id, kind, filtered })
    }

    fn list(&self, kind: FilterKind) -> Result<Vec<FilterFlag>, FilterStoreError> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt = conn.prepare(
            "SELECT id, type FROM bleeparr_items WHERE type = ? AND filtered = 1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![kind.as_str()], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut flags = Vec::new();
        for row in rows {
            let (id, kind_str) = row?;
            let id = u64::try_from(id)
                .map_err(|_| FilterStoreError::CorruptRow(format!("{kind_str} id {id}")))?;
            let kind =
                FilterKind::parse(&kind_str).ok_or(FilterStoreError::CorruptRow(kind_str))?;
            flags.push(FilterFlag {
                id,
                kind,
                filtered: true,
            });
        }
        Ok(flags)
    }
}

/// Non-persistent filter store.
#[derive(Debug, Default)]
pub struct InMemoryFilterStore {
    flags: Mutex<HashMap<(FilterKind, u64), bool>>,
}

impl InMemoryFilterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FilterStore for InMemoryFilterStore {
    fn is_filtered(&self, kind: FilterKind, id: u64) -> Result<bool, FilterStoreError> {
        let flags = self.flags.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(flags.get(&(kind, id)).copied().unwrap_or(false))
    }

    fn set_filtered(
        &self,
        kind: FilterKind,
        id: u64,
        filtered: bool,
    ) -> Result<FilterFlag, FilterStoreError> {
        stored_id(id)?;
        self.flags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((kind, id), filtered);
        Ok(FilterFlag { id, kind, filtered })
    }

    fn list(&self, kind: FilterKind) -> Result<Vec<FilterFlag>, FilterStoreError> {
        let flags = self.flags.lock().unwrap_or_else(PoisonError::into_inner);
        let mut out: Vec<FilterFlag> = flags
            .iter()
            .filter(|((k, _), filtered)| *k == kind && **filtered)
            .map(|((k, id), _)| FilterFlag {
                id: *id,
                kind: *k,
                filtered: true,
            })
            .collect();
        out.sort_by_key(|f| f.id);
        Ok(out)
    }
}
