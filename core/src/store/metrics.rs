use super::{datetime_col, enum_col, ts, DeskStore};
use crate::complaint::{ComplaintStatus, ComplaintType};
use crate::error::DeskResult;
use crate::metrics::{GroupStats, MonthCount, SweepRecord, TypeCount};
use rusqlite::params;

fn group_stats_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<GroupStats> {
    Ok(GroupStats {
        key: row.get(0)?,
        total: row.get(1)?,
        resolved: row.get(2)?,
        overdue: row.get(3)?,
        avg_resolution_hours: row.get(4)?,
    })
}

fn sweep_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<SweepRecord> {
    Ok(SweepRecord {
        sweep_id: row.get(0)?,
        started_at: datetime_col(1, row.get(1)?)?,
        finished_at: datetime_col(2, row.get(2)?)?,
        breaches_found: row.get(3)?,
        escalated: row.get(4)?,
    })
}

impl DeskStore {
    // ── Grouped performance statistics ─────────────────────────
    //
    // One row per group: total, resolved (RESOLVED only, CLOSED does not
    // count), overdue flags, and the average resolution time in hours (NULL
    // until a group has at least one timed resolution).

    pub fn group_stats_by_locality(&self) -> DeskResult<Vec<GroupStats>> {
        let mut stmt = self.conn.prepare(
            "SELECT locality,
                    COUNT(*),
                    SUM(CASE WHEN status = 'RESOLVED' THEN 1 ELSE 0 END),
                    SUM(is_overdue),
                    AVG(time_to_resolve)
             FROM complaint
             GROUP BY locality ORDER BY locality ASC",
        )?;
        let rows = stmt.query_map([], group_stats_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn group_stats_by_staff(&self) -> DeskResult<Vec<GroupStats>> {
        let mut stmt = self.conn.prepare(
            "SELECT assigned_to,
                    COUNT(*),
                    SUM(CASE WHEN status = 'RESOLVED' THEN 1 ELSE 0 END),
                    SUM(is_overdue),
                    AVG(time_to_resolve)
             FROM complaint
             WHERE assigned_to IS NOT NULL
             GROUP BY assigned_to ORDER BY assigned_to ASC",
        )?;
        let rows = stmt.query_map([], group_stats_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn group_stats_by_type(&self) -> DeskResult<Vec<GroupStats>> {
        let mut stmt = self.conn.prepare(
            "SELECT kind,
                    COUNT(*),
                    SUM(CASE WHEN status = 'RESOLVED' THEN 1 ELSE 0 END),
                    SUM(is_overdue),
                    AVG(time_to_resolve)
             FROM complaint
             GROUP BY kind ORDER BY kind ASC",
        )?;
        let rows = stmt.query_map([], group_stats_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Dashboard counters ─────────────────────────────────────

    pub fn status_count(&self, status: ComplaintStatus) -> DeskResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM complaint WHERE status = ?1",
                params![status.as_str()],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    pub fn active_complaint_count(&self) -> DeskResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM complaint WHERE status IN ('OPEN', 'IN_PROGRESS')",
                [],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    pub fn complaints_by_type(&self) -> DeskResult<Vec<TypeCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, COUNT(*) FROM complaint GROUP BY kind ORDER BY kind ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            let kind_raw: String = row.get(0)?;
            Ok(TypeCount {
                kind: enum_col(0, &kind_raw, ComplaintType::parse)?,
                count: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Submission volume for the most recent `limit` calendar months
    /// (`YYYY-MM`), presented oldest first.
    pub fn monthly_trend(&self, limit: usize) -> DeskResult<Vec<MonthCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT month, n FROM (
                 SELECT strftime('%Y-%m', created_at, 'unixepoch') AS month, COUNT(*) AS n
                 FROM complaint
                 GROUP BY month ORDER BY month DESC LIMIT ?1
             ) ORDER BY month ASC",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(MonthCount {
                month: row.get(0)?,
                count: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Sweep ledger ───────────────────────────────────────────

    pub fn insert_sweep(&self, s: &SweepRecord) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO sweep_log (sweep_id, started_at, finished_at, breaches_found, escalated)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &s.sweep_id,
                ts(s.started_at),
                ts(s.finished_at),
                s.breaches_found,
                s.escalated,
            ],
        )?;
        Ok(())
    }

    pub fn sweep_count(&self) -> DeskResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM sweep_log", [], |row| row.get(0))
            .map_err(Into::into)
    }

    pub fn sweep_history(&self, limit: usize) -> DeskResult<Vec<SweepRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT sweep_id, started_at, finished_at, breaches_found, escalated
             FROM sweep_log ORDER BY started_at DESC, sweep_id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], sweep_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
