//! Intention repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist intention rows without a uniqueness constraint on week.
//! - Provide the transactional week write that collapses duplicates.
//! - Apply record-level changes delivered by the replication transport.
//!
//! # Invariants
//! - "First" record of a week is the earliest `created_at`, ties broken by
//!   the lowest `id` string. Every read and write uses this order.
//! - After `write_week` commits, the week has zero or one physical rows.

use crate::db::DbError;
use crate::model::intention::{IntentionId, IntentionRecord};
use crate::model::week::WeekStart;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const INTENTION_SELECT_SQL: &str = "SELECT
    id,
    week_start,
    text,
    created_at
FROM intentions";

const DEDUP_ORDER_SQL: &str = "created_at ASC, id ASC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for intention persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted intention data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
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

/// Result of one transactional week write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeekWrite {
    /// Text was empty; every row for the week was removed.
    Cleared { removed: usize },
    /// The first row was updated in place and `removed_duplicates` others
    /// were deleted.
    Updated {
        id: IntentionId,
        removed_duplicates: usize,
    },
    /// No row existed; one was inserted.
    Created { id: IntentionId },
}

/// One record-level change delivered by the replication transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteChange {
    /// Insert or replace by record id. No week uniqueness is checked.
    Upsert(IntentionRecord),
    Delete(IntentionId),
}

/// Repository interface for intention rows.
pub trait IntentionRepository {
    /// Replaces the week's effective text, collapsing duplicates.
    ///
    /// `text` must already be trimmed; an empty value clears the week.
    fn write_week(&self, week: WeekStart, text: &str, created_at: i64) -> RepoResult<WeekWrite>;
    /// First record of the week under the dedup order.
    fn first_for_week(&self, week: WeekStart) -> RepoResult<Option<IntentionRecord>>;
    /// All physical rows of the week under the dedup order.
    fn list_for_week(&self, week: WeekStart) -> RepoResult<Vec<IntentionRecord>>;
    /// All rows ordered by week descending, then dedup order.
    fn list_all(&self) -> RepoResult<Vec<IntentionRecord>>;
    /// Applies a transport batch atomically: either every change lands or
    /// none does.
    fn apply_remote_batch(&self, changes: &[RemoteChange]) -> RepoResult<()>;
}

/// SQLite-backed intention repository.
pub struct SqliteIntentionRepository {
    conn: Connection,
}

impl SqliteIntentionRepository {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl IntentionRepository for SqliteIntentionRepository {
    fn write_week(&self, week: WeekStart, text: &str, created_at: i64) -> RepoResult<WeekWrite> {
        let tx = self.conn.unchecked_transaction()?;

        if text.is_empty() {
            let removed = tx.execute(
                "DELETE FROM intentions WHERE week_start = ?1;",
                [week.to_storage_key()],
            )?;
            tx.commit()?;
            return Ok(WeekWrite::Cleared { removed });
        }

        let matches = select_week(&tx, week)?;
        let outcome = if let Some((first, duplicates)) = matches.split_first() {
            tx.execute(
                "UPDATE intentions SET text = ?1 WHERE id = ?2;",
                params![text, first.id.to_string()],
            )?;
            for duplicate in duplicates {
                tx.execute(
                    "DELETE FROM intentions WHERE id = ?1;",
                    [duplicate.id.to_string()],
                )?;
            }
            WeekWrite::Updated {
                id: first.id,
                removed_duplicates: duplicates.len(),
            }
        } else {
            let record = IntentionRecord::new(week, text, created_at);
            insert_record(&tx, &record)?;
            WeekWrite::Created { id: record.id }
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn first_for_week(&self, week: WeekStart) -> RepoResult<Option<IntentionRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{INTENTION_SELECT_SQL}
             WHERE week_start = ?1
             ORDER BY {DEDUP_ORDER_SQL}
             LIMIT 1;"
        ))?;
        let raw = stmt
            .query_row([week.to_storage_key()], read_raw_row)
            .optional()?;
        raw.map(parse_raw_row).transpose()
    }

    fn list_for_week(&self, week: WeekStart) -> RepoResult<Vec<IntentionRecord>> {
        select_week(&self.conn, week)
    }

    fn list_all(&self) -> RepoResult<Vec<IntentionRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{INTENTION_SELECT_SQL} ORDER BY week_start DESC, {DEDUP_ORDER_SQL};"
        ))?;
        let records = collect_rows(stmt.query([])?)?;
        Ok(records)
    }

    fn apply_remote_batch(&self, changes: &[RemoteChange]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for change in changes {
            apply_remote_change(&tx, change)?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn apply_remote_change(conn: &Connection, change: &RemoteChange) -> RepoResult<()> {
    match change {
        RemoteChange::Upsert(record) => {
            conn.execute(
                "INSERT INTO intentions (id, week_start, text, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    week_start = excluded.week_start,
                    text = excluded.text,
                    created_at = excluded.created_at;",
                params![
                    record.id.to_string(),
                    record.week_start.to_storage_key(),
                    record.text.as_str(),
                    record.created_at,
                ],
            )?;
        }
        RemoteChange::Delete(id) => {
            conn.execute("DELETE FROM intentions WHERE id = ?1;", [id.to_string()])?;
        }
    }
    Ok(())
}

fn insert_record(conn: &Connection, record: &IntentionRecord) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO intentions (id, week_start, text, created_at)
         VALUES (?1, ?2, ?3, ?4);",
        params![
            record.id.to_string(),
            record.week_start.to_storage_key(),
            record.text.as_str(),
            record.created_at,
        ],
    )?;
    Ok(())
}

fn select_week(conn: &Connection, week: WeekStart) -> RepoResult<Vec<IntentionRecord>> {
    let mut stmt = conn.prepare(&format!(
        "{INTENTION_SELECT_SQL}
         WHERE week_start = ?1
         ORDER BY {DEDUP_ORDER_SQL};"
    ))?;
    let records = collect_rows(stmt.query([week.to_storage_key()])?)?;
    Ok(records)
}

fn collect_rows(mut rows: rusqlite::Rows<'_>) -> RepoResult<Vec<IntentionRecord>> {
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(parse_raw_row(read_raw_row(row)?)?);
    }
    Ok(records)
}

struct RawRow {
    id: String,
    week_start: String,
    text: String,
    created_at: i64,
}

fn read_raw_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get("id")?,
        week_start: row.get("week_start")?,
        text: row.get("text")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_raw_row(raw: RawRow) -> RepoResult<IntentionRecord> {
    let id = Uuid::parse_str(&raw.id).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{}` in intentions.id", raw.id))
    })?;
    let week_start = WeekStart::parse_storage_key(&raw.week_start).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid week `{}` in intentions.week_start",
            raw.week_start
        ))
    })?;

    Ok(IntentionRecord::with_id(
        id,
        week_start,
        raw.text,
        raw.created_at,
    ))
}
