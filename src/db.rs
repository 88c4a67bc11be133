//! Database module for Contrakt
//!
//! Persists structured contributions (error reports, feature suggestions).

mod schema;

pub use schema::*;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Contribution not found: {0}")]
    ContributionNotFound(String),
    #[error("Contribution already exists: {0}")]
    DuplicateId(String),
    #[error("Invalid stored value in {column}: {value}")]
    InvalidValue { column: &'static str, value: String },
    #[error("Database lock poisoned")]
    LockPoisoned,
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    fn run_migrations(&self) -> DbResult<()> {
        self.conn()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Contribution Operations ====================

    /// Insert a new contribution. Never overwrites: an existing id is an error.
    pub fn insert_contribution(
        &self,
        id: &str,
        record: &ContributionRecord,
        created_at: DateTime<Utc>,
    ) -> DbResult<StoredContribution> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO contributions (id, kind, description, details, impact, priority, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                record.kind.as_str(),
                record.description,
                record.details,
                record.impact,
                record.priority.as_str(),
                created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == ErrorCode::ConstraintViolation =>
            {
                DbError::DuplicateId(id.to_string())
            }
            other => DbError::Sqlite(other),
        })?;

        Ok(StoredContribution {
            id: id.to_string(),
            record: record.clone(),
            created_at,
        })
    }

    /// Get contribution by ID
    pub fn get_contribution(&self, id: &str) -> DbResult<StoredContribution> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, kind, description, details, impact, priority, created_at
             FROM contributions WHERE id = ?1",
        )?;

        let raw = stmt
            .query_row(params![id], RawContribution::from_row)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    DbError::ContributionNotFound(id.to_string())
                }
                other => DbError::Sqlite(other),
            })?;
        raw.into_stored()
    }

    /// Most recent contributions first
    pub fn list_contributions(&self, limit: u32) -> DbResult<Vec<StoredContribution>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, kind, description, details, impact, priority, created_at
             FROM contributions ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit], RawContribution::from_row)?;
        rows.map(|row| row.map_err(DbError::from).and_then(RawContribution::into_stored))
            .collect()
    }

    pub fn count_contributions(&self) -> DbResult<u64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM contributions", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

/// Row as read from SQLite, before enum and timestamp parsing
struct RawContribution {
    id: String,
    kind: String,
    description: String,
    details: String,
    impact: String,
    priority: String,
    created_at: String,
}

impl RawContribution {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            kind: row.get(1)?,
            description: row.get(2)?,
            details: row.get(3)?,
            impact: row.get(4)?,
            priority: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn into_stored(self) -> DbResult<StoredContribution> {
        let kind = ContributionKind::parse(&self.kind).ok_or(DbError::InvalidValue {
            column: "kind",
            value: self.kind.clone(),
        })?;
        let priority = Priority::parse(&self.priority).ok_or(DbError::InvalidValue {
            column: "priority",
            value: self.priority.clone(),
        })?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| DbError::InvalidValue {
                column: "created_at",
                value: self.created_at.clone(),
            })?;

        Ok(StoredContribution {
            id: self.id,
            record: ContributionRecord {
                kind,
                description: self.description,
                details: self.details,
                impact: self.impact,
                priority,
            },
            created_at,
        })
    }
}
