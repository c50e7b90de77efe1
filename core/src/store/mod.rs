//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database. Engine components call store
//! methods; they never execute SQL directly.

mod complaint;
mod metrics;
mod notification;
mod staff;

use crate::error::DeskResult;
use crate::types::ComplaintId;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::sync::atomic::{AtomicU64, Ordering};

/// Distinguishes the shared-cache in-memory databases handed out by
/// [`DeskStore::in_memory`] so parallel tests never collide.
static MEM_DB_SEQ: AtomicU64 = AtomicU64::new(0);

pub struct DeskStore {
    conn: Connection,
    path: String,
}

impl DeskStore {
    pub fn open(path: &str) -> DeskResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only applies to real files (in-memory databases ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;")?;
        Ok(Self {
            conn,
            path: path.to_string(),
        })
    }

    /// Open a fresh in-memory database. Uses a shared-cache URI so
    /// [`reopen`](Self::reopen) yields a second handle onto the same data;
    /// the engine, the notifier, and test assertions each hold their own
    /// connection.
    pub fn in_memory() -> DeskResult<Self> {
        let n = MEM_DB_SEQ.fetch_add(1, Ordering::Relaxed);
        Self::open(&format!("file:deskmem_{n}?mode=memory&cache=shared"))
    }

    /// Open a second connection to the same database (file or shared-cache
    /// memory). The in-memory database lives as long as at least one
    /// connection stays open.
    pub fn reopen(&self) -> DeskResult<Self> {
        Self::open(&self.path)
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> DeskResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_sweep_ledger.sql"))?;
        Ok(())
    }

    // ── Complaint identity ─────────────────────────────────────

    /// Issue the next human-readable complaint number (`CMP-1001`, ...).
    /// Single-statement increment-and-read, so two connections allocating
    /// concurrently can never observe the same value.
    pub fn allocate_complaint_id(&self) -> DeskResult<ComplaintId> {
        let n: i64 = self.conn.query_row(
            "UPDATE complaint_seq SET value = value + 1 WHERE id = 1 RETURNING value",
            [],
            |row| row.get(0),
        )?;
        Ok(format!("CMP-{n}"))
    }
}

// ── Row-mapping helpers ────────────────────────────────────────

/// Timestamps are persisted as unix seconds.
pub(crate) fn ts(at: DateTime<Utc>) -> i64 {
    at.timestamp()
}

pub(crate) fn datetime_col(idx: usize, secs: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Integer,
            format!("timestamp {secs} out of range").into(),
        )
    })
}

pub(crate) fn enum_col<T>(
    idx: usize,
    raw: &str,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    parse(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unrecognized value '{raw}'").into(),
        )
    })
}
