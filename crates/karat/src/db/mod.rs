//! Database module for persistent storage.
//!
//! Uses rusqlite (SQLite) with a thread-safe `Database` handle.
//! All access is serialized through a `Mutex<Connection>`. Repository
//! functions take a `&Connection` so several of them can share one
//! transaction.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Transaction};

pub mod error;
pub mod history_repo;
pub mod job_repo;
pub mod lot_repo;
pub mod manufacturer_repo;
pub mod migrations;
pub mod order_repo;
pub mod sequence;
pub mod sku_repo;

pub use error::DatabaseError;

/// Thread-safe database handle wrapping a single rusqlite connection.
///
/// Cloning is cheap (inner `Arc`). WAL mode is enabled for file databases.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) the database at the given path and runs all
    /// pending migrations.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        migrations::run_all(&conn)?;

        log::info!("Database opened at {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory database for testing. Runs all migrations.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        migrations::run_all(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Provides locked access to the underlying connection.
    pub fn with_conn<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<DatabaseError>,
    {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        f(&conn)
    }

    /// Runs `f` inside a transaction. The transaction commits when `f`
    /// returns `Ok` and rolls back on `Err`.
    pub fn with_tx<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<DatabaseError>,
    {
        let mut conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        let tx = conn.transaction().map_err(DatabaseError::from)?;
        let value = f(&tx)?;
        tx.commit().map_err(DatabaseError::from)?;
        Ok(value)
    }
}

/// Returns the canonical database path: `~/.karat/data/karat.db`.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".karat").join("data").join("karat.db"))
}

/// Numeric suffix of a `PREFIX-0042` display ID, for sorting past the padded width.
pub(crate) const DISPLAY_NUMBER: &str =
    "CAST(substr(display_id, instr(display_id, '-') + 1) AS INTEGER)";

/// Current time in the RFC 3339 form every table stores.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Reads at most one row from a prepared query.
pub(crate) fn optional_row<T>(
    mut rows: impl Iterator<Item = Result<T, rusqlite::Error>>,
) -> Result<Option<T>, DatabaseError> {
    match rows.next() {
        Some(Ok(row)) => Ok(Some(row)),
        Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
        None => Ok(None),
    }
}

/// Collects `WHERE` conditions with numbered parameters.
#[derive(Default)]
pub(crate) struct WhereBuilder {
    conditions: Vec<String>,
    params: Vec<Box<dyn rusqlite::types::ToSql>>,
}

impl WhereBuilder {
    /// Adds `column <op> ?N` when `value` is present.
    pub fn push<V>(&mut self, column: &str, op: &str, value: Option<V>)
    where
        V: rusqlite::types::ToSql + 'static,
    {
        if let Some(value) = value {
            self.params.push(Box::new(value));
            self.conditions
                .push(format!("{} {} ?{}", column, op, self.params.len()));
        }
    }

    pub fn clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Appends a trailing parameter (e.g. LIMIT/OFFSET) and returns its index.
    pub fn bind(&mut self, value: i64) -> usize {
        self.params.push(Box::new(value));
        self.params.len()
    }

    pub fn params(&self) -> Vec<&dyn rusqlite::types::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}
