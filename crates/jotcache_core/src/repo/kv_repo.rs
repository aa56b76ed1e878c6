//! Namespaced key-value repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide whole-value load/save over `kv_entries`, scoped to one namespace.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `save` replaces the whole value for a key; there are no partial writes.
//! - A missing key reads as `None`, never as an error.
//! - Connections are checked for the required schema on construction.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

const KV_TABLE: &str = "kv_entries";
const KV_COLUMNS: [&str; 4] = ["namespace", "key", "value", "updated_at"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for key-value persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// A collection could not be serialized for writing.
    Encode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::Encode(err) => write!(f, "failed to encode collection: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::MissingRequiredTable(_) | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Byte-valued key-value namespace.
pub trait KvRepository {
    /// Reads the value stored under `key`.
    fn load(&self, key: &str) -> RepoResult<Option<Vec<u8>>>;
    /// Replaces the value stored under `key`.
    fn save(&self, key: &str, value: &[u8]) -> RepoResult<()>;
}

/// SQLite-backed key-value namespace.
pub struct SqliteKvRepository {
    conn: Connection,
    namespace: String,
}

impl SqliteKvRepository {
    /// Wraps a migrated (or read-only, already migrated) connection.
    pub fn try_new(conn: Connection, namespace: impl Into<String>) -> RepoResult<Self> {
        ensure_kv_connection_ready(&conn)?;
        Ok(Self {
            conn,
            namespace: namespace.into(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl KvRepository for SqliteKvRepository {
    fn load(&self, key: &str) -> RepoResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE namespace = ?1 AND key = ?2;",
                params![self.namespace.as_str(), key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save(&self, key: &str, value: &[u8]) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (namespace, key, value, updated_at)
             VALUES (?1, ?2, ?3, CAST(strftime('%s', 'now') AS INTEGER) * 1000)
             ON CONFLICT(namespace, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.namespace.as_str(), key, value],
        )?;
        Ok(())
    }
}

fn ensure_kv_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, KV_TABLE)? {
        return Err(RepoError::MissingRequiredTable(KV_TABLE));
    }

    for column in KV_COLUMNS {
        if !table_has_column(conn, KV_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: KV_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
