//! Storage layer for undertaker.
//!
//! [`WillStore`] is the document-store seam the flows talk to. It only
//! creates and reads; wills are never updated or deleted. [`SqliteStore`]
//! is the bundled implementation.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::will::{NewWill, WillRecord, DATE_FORMAT};

/// Columns selected for every will query, in `row_to_raw` order.
const WILL_COLUMNS: &str =
    "id, request_id, full_name, date_of_birth, message, user_id, created_at, updated_at";

/// A document store holding will records.
#[async_trait]
pub trait WillStore: Send + Sync {
    /// Persist a new will and return its id.
    ///
    /// Creating twice with the same `request_id` returns the id of the
    /// first record and stores nothing new.
    async fn create(&self, will: &NewWill) -> Result<i64>;

    /// The most recently created will owned by `user_id`.
    async fn latest_for_owner(&self, user_id: &str) -> Result<Option<WillRecord>>;

    /// Get a will by id.
    async fn get(&self, id: i64) -> Result<Option<WillRecord>>;

    /// Number of wills owned by `user_id`.
    async fn count_for_owner(&self, user_id: &str) -> Result<i64>;
}

/// `SQLite`-backed will store.
///
/// The connection sits behind a mutex; every call is a short synchronous
/// statement, so the lock is never held across an await point.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("store connection lock poisoned"))
    }

    /// Insert a will, deduplicating on its request id.
    ///
    /// # Errors
    ///
    /// Returns `RequestConflict` if the request id is already stored for a
    /// different owner, or an error if the database operation fails.
    pub fn insert(&self, will: &NewWill) -> Result<i64> {
        let conn = self.conn()?;
        let request_id = will.request_id.to_string();

        let inserted = conn.execute(
            r"
            INSERT INTO wills
                (request_id, full_name, date_of_birth, message, user_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(request_id) DO NOTHING
            ",
            params![
                request_id,
                will.full_name,
                will.date_of_birth.format(DATE_FORMAT).to_string(),
                will.message,
                will.user_id,
                format_timestamp(will.created_at),
                format_timestamp(will.updated_at),
            ],
        )?;

        if inserted == 0 {
            let (id, owner): (i64, String) = conn.query_row(
                "SELECT id, user_id FROM wills WHERE request_id = ?1",
                [&request_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            if owner != will.user_id {
                return Err(Error::RequestConflict {
                    request_id: will.request_id,
                });
            }
            debug!("Request {} already stored as will {}", request_id, id);
            return Ok(id);
        }

        let id = conn.last_insert_rowid();
        debug!("Inserted will with id {}", id);
        Ok(id)
    }

    /// Get the newest will of an owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or the row is corrupt.
    pub fn find_latest_for_owner(&self, user_id: &str) -> Result<Option<WillRecord>> {
        let raw = self
            .conn()?
            .query_row(
                &format!(
                    "SELECT {WILL_COLUMNS} FROM wills WHERE user_id = ?1 \
                     ORDER BY created_at DESC, id DESC LIMIT 1"
                ),
                [user_id],
                row_to_raw,
            )
            .optional()?;
        raw.map(RawWill::into_record).transpose()
    }

    /// Get a will by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or the row is corrupt.
    pub fn find(&self, id: i64) -> Result<Option<WillRecord>> {
        let raw = self
            .conn()?
            .query_row(
                &format!("SELECT {WILL_COLUMNS} FROM wills WHERE id = ?1"),
                [id],
                row_to_raw,
            )
            .optional()?;
        raw.map(RawWill::into_record).transpose()
    }

    /// Count the wills of an owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_owned_by(&self, user_id: &str) -> Result<i64> {
        let count = self.conn()?.query_row(
            "SELECT COUNT(*) FROM wills WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let (total_wills, newest): (i64, Option<String>) = self.conn()?.query_row(
            "SELECT COUNT(*), MAX(created_at) FROM wills",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let newest_will = newest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_wills,
            newest_will,
            db_size_bytes,
        })
    }
}

#[async_trait]
impl WillStore for SqliteStore {
    async fn create(&self, will: &NewWill) -> Result<i64> {
        self.insert(will)
    }

    async fn latest_for_owner(&self, user_id: &str) -> Result<Option<WillRecord>> {
        self.find_latest_for_owner(user_id)
    }

    async fn get(&self, id: i64) -> Result<Option<WillRecord>> {
        self.find(id)
    }

    async fn count_for_owner(&self, user_id: &str) -> Result<i64> {
        self.count_owned_by(user_id)
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Total number of wills stored, across all owners.
    pub total_wills: i64,
    /// Creation time of the newest will.
    pub newest_will: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

/// Fixed-width UTC timestamp so that text order is time order.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A row as stored, before its text columns are parsed.
struct RawWill {
    id: i64,
    request_id: String,
    full_name: String,
    date_of_birth: String,
    message: String,
    user_id: String,
    created_at: String,
    updated_at: String,
}

fn row_to_raw(row: &rusqlite::Row) -> rusqlite::Result<RawWill> {
    Ok(RawWill {
        id: row.get(0)?,
        request_id: row.get(1)?,
        full_name: row.get(2)?,
        date_of_birth: row.get(3)?,
        message: row.get(4)?,
        user_id: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

impl RawWill {
    fn into_record(self) -> Result<WillRecord> {
        let id = self.id;
        let corrupt = |message: String| Error::CorruptRecord { id, message };

        let request_id = Uuid::parse_str(&self.request_id)
            .map_err(|e| corrupt(format!("request_id: {e}")))?;
        let date_of_birth = NaiveDate::parse_from_str(&self.date_of_birth, DATE_FORMAT)
            .map_err(|e| corrupt(format!("date_of_birth: {e}")))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| corrupt(format!("created_at: {e}")))?
            .with_timezone(&Utc);
        let updated_at = DateTime::parse_from_rfc3339(&self.updated_at)
            .map_err(|e| corrupt(format!("updated_at: {e}")))?
            .with_timezone(&Utc);

        Ok(WillRecord {
            id,
            request_id,
            full_name: self.full_name,
            date_of_birth,
            message: self.message,
            user_id: self.user_id,
            created_at,
            updated_at,
        })
    }
}
