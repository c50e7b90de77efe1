use super::{datetime_col, enum_col, ts, DeskStore};
use crate::error::DeskResult;
use crate::notifier::{NewNotification, NotificationKind, NotificationRecord};
use chrono::{DateTime, Utc};
use rusqlite::params;

fn notification_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<NotificationRecord> {
    let kind_raw: String = row.get(4)?;
    Ok(NotificationRecord {
        id: row.get(0)?,
        recipient_id: row.get(1)?,
        title: row.get(2)?,
        message: row.get(3)?,
        kind: enum_col(4, &kind_raw, NotificationKind::parse)?,
        complaint_id: row.get(5)?,
        created_at: datetime_col(6, row.get(6)?)?,
    })
}

impl DeskStore {
    // ── Notification ───────────────────────────────────────────

    pub fn insert_notification(&self, note: &NewNotification, at: DateTime<Utc>) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO notification (recipient_id, title, message, kind, complaint_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &note.recipient_id,
                &note.title,
                &note.message,
                note.kind.as_str(),
                note.complaint_id.as_deref(),
                ts(at),
            ],
        )?;
        Ok(())
    }

    pub fn notifications_for(&self, recipient_id: &str) -> DeskResult<Vec<NotificationRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, recipient_id, title, message, kind, complaint_id, created_at
             FROM notification WHERE recipient_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![recipient_id], notification_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn notification_count(&self, kind: NotificationKind) -> DeskResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM notification WHERE kind = ?1",
                params![kind.as_str()],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
