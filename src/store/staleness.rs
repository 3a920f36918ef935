//! Decide whether an existing store can be reused

use rusqlite::{Connection, OpenFlags};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::config::SCHEMA_VERSION;
use crate::schema::ALL_TABLES;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreStatus {
    Ready,
    Missing,
    Unreadable(String),
    Empty,
    MissingColumns { table: String, columns: Vec<String> },
    VersionMismatch { found: i64 },
}

impl StoreStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, StoreStatus::Ready)
    }
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreStatus::Ready => write!(f, "store is up to date"),
            StoreStatus::Missing => write!(f, "store does not exist"),
            StoreStatus::Unreadable(reason) => write!(f, "store could not be read: {}", reason),
            StoreStatus::Empty => write!(f, "store has no pokemon"),
            StoreStatus::MissingColumns { table, columns } => {
                write!(f, "table {} lacks columns {}", table, columns.join(", "))
            }
            StoreStatus::VersionMismatch { found } => {
                write!(f, "store version {} does not match {}", found, SCHEMA_VERSION)
            }
        }
    }
}

/// Check an existing store without modifying it
pub fn inspect_store(path: &Path) -> StoreStatus {
    if !path.exists() {
        return StoreStatus::Missing;
    }
    check(path).unwrap_or_else(|err| StoreStatus::Unreadable(err.to_string()))
}

fn check(path: &Path) -> rusqlite::Result<StoreStatus> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

    let count: i64 = conn.query_row("SELECT COUNT(*) FROM pokemon", [], |r| r.get(0))?;
    if count == 0 {
        return Ok(StoreStatus::Empty);
    }

    for schema in ALL_TABLES {
        let present = table_columns(&conn, schema.name)?;
        let missing: Vec<String> = schema
            .columns
            .iter()
            .filter(|c| !present.contains(c.name))
            .map(|c| c.name.to_string())
            .collect();
        if !missing.is_empty() {
            return Ok(StoreStatus::MissingColumns {
                table: schema.name.to_string(),
                columns: missing,
            });
        }
    }

    let found: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if found != SCHEMA_VERSION {
        return Ok(StoreStatus::VersionMismatch { found });
    }

    Ok(StoreStatus::Ready)
}

fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt.query_map([], |r| r.get::<_, String>(1))?;
    names.collect()
}
