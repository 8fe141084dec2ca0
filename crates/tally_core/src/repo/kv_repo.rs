//! Key-value repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide `get`/`put` over string keys and string values.
//! - Map storage failures into `StorageError`.

use crate::db::DbError;
use crate::model::bill::{BillId, BillValidationError};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence failure surfaced to ledger callers.
///
/// In-memory state is left as mutated when a save fails; the error only
/// reports that the durable copy is stale.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    /// Collection could not be encoded for `key`.
    Serialize {
        key: String,
        source: serde_json::Error,
    },
    /// Stored value under `key` is not a valid collection.
    Malformed {
        key: String,
        source: serde_json::Error,
    },
    /// Stored bill parsed but violates bill validation.
    InvalidRecord {
        key: String,
        bill_id: BillId,
        source: BillValidationError,
    },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialize { key, source } => {
                write!(f, "failed to serialize `{key}`: {source}")
            }
            Self::Malformed { key, source } => {
                write!(f, "stored value for `{key}` is malformed: {source}")
            }
            Self::InvalidRecord {
                key,
                bill_id,
                source,
            } => write!(f, "stored bill {bill_id} under `{key}` is invalid: {source}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialize { source, .. } | Self::Malformed { source, .. } => Some(source),
            Self::InvalidRecord { source, .. } => Some(source),
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable string-keyed storage.
pub trait KvRepository {
    /// Returns the value under `key`, or `None` when it was never written.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Replaces the value under `key`.
    fn put(&self, key: &str, value: &str) -> StorageResult<()>;
}

impl<T: KvRepository + ?Sized> KvRepository for &T {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).put(key, value)
    }
}

/// SQLite-backed key-value repository over the `kv_entries` table.
pub struct SqliteKvRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KvRepository for SqliteKvRepository<'_> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }
}
