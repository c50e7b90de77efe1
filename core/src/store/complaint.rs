use super::{datetime_col, enum_col, ts, DeskStore};
use crate::complaint::{ComplaintRecord, ComplaintStatus, ComplaintType, NoteRecord, Priority};
use crate::error::DeskResult;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

fn complaint_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<ComplaintRecord> {
    let kind_raw: String = row.get(2)?;
    let status_raw: String = row.get(7)?;
    let priority_raw: String = row.get(8)?;
    Ok(ComplaintRecord {
        complaint_id: row.get(0)?,
        citizen_id: row.get(1)?,
        kind: enum_col(2, &kind_raw, ComplaintType::parse)?,
        description: row.get(3)?,
        address: row.get(4)?,
        locality: row.get(5)?,
        ward: row.get(6)?,
        status: enum_col(7, &status_raw, ComplaintStatus::parse)?,
        priority: enum_col(8, &priority_raw, Priority::parse)?,
        assigned_to: row.get(9)?,
        sla_deadline: datetime_col(10, row.get(10)?)?,
        is_overdue: row.get::<_, i32>(11)? != 0,
        escalation_level: row.get(12)?,
        time_to_assign: row.get(13)?,
        time_to_resolve: row.get(14)?,
        created_at: datetime_col(15, row.get(15)?)?,
        updated_at: datetime_col(16, row.get(16)?)?,
        resolved_at: row
            .get::<_, Option<i64>>(17)?
            .map(|s| datetime_col(17, s))
            .transpose()?,
    })
}

fn note_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<NoteRecord> {
    Ok(NoteRecord {
        id: row.get(0)?,
        complaint_id: row.get(1)?,
        author_id: row.get(2)?,
        body: row.get(3)?,
        created_at: datetime_col(4, row.get(4)?)?,
    })
}

impl DeskStore {
    // ── Complaint ──────────────────────────────────────────────

    pub fn insert_complaint(&self, c: &ComplaintRecord) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO complaint (
                complaint_id, citizen_id, kind, description, address, locality, ward,
                status, priority, assigned_to, sla_deadline, is_overdue,
                escalation_level, time_to_assign, time_to_resolve,
                created_at, updated_at, resolved_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
            params![
                &c.complaint_id,
                &c.citizen_id,
                c.kind.as_str(),
                &c.description,
                &c.address,
                &c.locality,
                c.ward.as_deref(),
                c.status.as_str(),
                c.priority.as_str(),
                c.assigned_to.as_deref(),
                ts(c.sla_deadline),
                if c.is_overdue { 1i32 } else { 0i32 },
                c.escalation_level,
                c.time_to_assign,
                c.time_to_resolve,
                ts(c.created_at),
                ts(c.updated_at),
                c.resolved_at.map(ts),
            ],
        )?;
        Ok(())
    }

    pub fn get_complaint(&self, complaint_id: &str) -> DeskResult<Option<ComplaintRecord>> {
        self.conn
            .query_row(
                "SELECT complaint_id, citizen_id, kind, description, address, locality, ward,
                        status, priority, assigned_to, sla_deadline, is_overdue,
                        escalation_level, time_to_assign, time_to_resolve,
                        created_at, updated_at, resolved_at
                 FROM complaint WHERE complaint_id = ?1",
                params![complaint_id],
                complaint_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn complaints_for_citizen(&self, citizen_id: &str) -> DeskResult<Vec<ComplaintRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT complaint_id, citizen_id, kind, description, address, locality, ward,
                    status, priority, assigned_to, sla_deadline, is_overdue,
                    escalation_level, time_to_assign, time_to_resolve,
                    created_at, updated_at, resolved_at
             FROM complaint WHERE citizen_id = ?1
             ORDER BY created_at DESC, complaint_id DESC",
        )?;
        let rows = stmt.query_map(params![citizen_id], complaint_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn complaints_for_staff(&self, staff_id: &str) -> DeskResult<Vec<ComplaintRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT complaint_id, citizen_id, kind, description, address, locality, ward,
                    status, priority, assigned_to, sla_deadline, is_overdue,
                    escalation_level, time_to_assign, time_to_resolve,
                    created_at, updated_at, resolved_at
             FROM complaint WHERE assigned_to = ?1
             ORDER BY created_at DESC, complaint_id DESC",
        )?;
        let rows = stmt.query_map(params![staff_id], complaint_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn recent_complaints(&self, limit: i64) -> DeskResult<Vec<ComplaintRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT complaint_id, citizen_id, kind, description, address, locality, ward,
                    status, priority, assigned_to, sla_deadline, is_overdue,
                    escalation_level, time_to_assign, time_to_resolve,
                    created_at, updated_at, resolved_at
             FROM complaint
             ORDER BY created_at DESC, complaint_id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], complaint_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn complaint_count(&self) -> DeskResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM complaint", [], |row| row.get(0))
            .map_err(Into::into)
    }

    /// Current workload of one staff member: assigned complaints still in an
    /// active status.
    pub fn active_count_for(&self, staff_id: &str) -> DeskResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM complaint
                 WHERE assigned_to = ?1 AND status IN ('OPEN', 'IN_PROGRESS')",
                params![staff_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    // ── Assignment writes ──────────────────────────────────────
    //
    // Every mutation below is a single guarded UPDATE: the precondition sits
    // in the WHERE clause and the return value says whether the row still
    // qualified. Callers treat `false` as "someone else got there first".

    /// Auto-assignment write: only an unassigned OPEN complaint qualifies.
    pub fn assign_complaint(
        &self,
        complaint_id: &str,
        staff_id: &str,
        time_to_assign: f64,
        now: DateTime<Utc>,
    ) -> DeskResult<bool> {
        let n = self.conn.execute(
            "UPDATE complaint
             SET assigned_to = ?2, status = 'IN_PROGRESS',
                 time_to_assign = ?3, updated_at = ?4
             WHERE complaint_id = ?1 AND assigned_to IS NULL AND status = 'OPEN'",
            params![complaint_id, staff_id, time_to_assign, ts(now)],
        )?;
        Ok(n == 1)
    }

    /// Manual (re)assignment write: any active complaint qualifies.
    /// `time_to_assign` is only stamped if the complaint was never assigned.
    pub fn reassign_complaint(
        &self,
        complaint_id: &str,
        staff_id: &str,
        time_to_assign: f64,
        now: DateTime<Utc>,
    ) -> DeskResult<bool> {
        let n = self.conn.execute(
            "UPDATE complaint
             SET assigned_to = ?2, status = 'IN_PROGRESS',
                 time_to_assign = COALESCE(time_to_assign, ?3), updated_at = ?4
             WHERE complaint_id = ?1 AND status IN ('OPEN', 'IN_PROGRESS')",
            params![complaint_id, staff_id, time_to_assign, ts(now)],
        )?;
        Ok(n == 1)
    }

    // ── Status transitions ─────────────────────────────────────

    pub fn update_status(
        &self,
        complaint_id: &str,
        from: ComplaintStatus,
        to: ComplaintStatus,
        now: DateTime<Utc>,
    ) -> DeskResult<bool> {
        let n = self.conn.execute(
            "UPDATE complaint SET status = ?3, updated_at = ?4
             WHERE complaint_id = ?1 AND status = ?2",
            params![complaint_id, from.as_str(), to.as_str(), ts(now)],
        )?;
        Ok(n == 1)
    }

    /// Transition into RESOLVED, stamping `resolved_at` and the derived
    /// resolution-time metric in the same statement.
    pub fn resolve_complaint(
        &self,
        complaint_id: &str,
        from: ComplaintStatus,
        time_to_resolve: f64,
        now: DateTime<Utc>,
    ) -> DeskResult<bool> {
        let n = self.conn.execute(
            "UPDATE complaint
             SET status = 'RESOLVED', resolved_at = ?3, time_to_resolve = ?4, updated_at = ?3
             WHERE complaint_id = ?1 AND status = ?2",
            params![complaint_id, from.as_str(), ts(now), time_to_resolve],
        )?;
        Ok(n == 1)
    }

    // ── Breach detection ───────────────────────────────────────

    /// Active complaints past their deadline and not yet flagged, oldest
    /// deadline first.
    pub fn overdue_candidates(&self, now: DateTime<Utc>) -> DeskResult<Vec<ComplaintRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT complaint_id, citizen_id, kind, description, address, locality, ward,
                    status, priority, assigned_to, sla_deadline, is_overdue,
                    escalation_level, time_to_assign, time_to_resolve,
                    created_at, updated_at, resolved_at
             FROM complaint
             WHERE status IN ('OPEN', 'IN_PROGRESS') AND is_overdue = 0 AND sla_deadline < ?1
             ORDER BY sla_deadline ASC, complaint_id ASC",
        )?;
        let rows = stmt.query_map(params![ts(now)], complaint_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Flag one complaint overdue. Returns false if it was resolved or
    /// already flagged since the candidate query ran.
    pub fn flag_overdue(&self, complaint_id: &str, now: DateTime<Utc>) -> DeskResult<bool> {
        let n = self.conn.execute(
            "UPDATE complaint SET is_overdue = 1, updated_at = ?2
             WHERE complaint_id = ?1 AND is_overdue = 0 AND status IN ('OPEN', 'IN_PROGRESS')",
            params![complaint_id, ts(now)],
        )?;
        Ok(n == 1)
    }

    pub fn overdue_count(&self) -> DeskResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM complaint WHERE is_overdue = 1",
                [],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    // ── Escalation ─────────────────────────────────────────────

    /// Overdue, active complaints still below the escalation ceiling.
    pub fn escalation_candidates(&self, ceiling: i64) -> DeskResult<Vec<ComplaintRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT complaint_id, citizen_id, kind, description, address, locality, ward,
                    status, priority, assigned_to, sla_deadline, is_overdue,
                    escalation_level, time_to_assign, time_to_resolve,
                    created_at, updated_at, resolved_at
             FROM complaint
             WHERE status IN ('OPEN', 'IN_PROGRESS') AND is_overdue = 1 AND escalation_level < ?1
             ORDER BY sla_deadline ASC, complaint_id ASC",
        )?;
        let rows = stmt.query_map(params![ceiling], complaint_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Bump the escalation level by one, guarded on the level the caller
    /// read. With a supervisor, the complaint is re-routed to them in the
    /// same statement; without one, only the level moves.
    pub fn escalate_complaint(
        &self,
        complaint_id: &str,
        expected_level: i64,
        supervisor_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> DeskResult<bool> {
        let n = match supervisor_id {
            Some(admin) => self.conn.execute(
                "UPDATE complaint
                 SET escalation_level = escalation_level + 1,
                     assigned_to = ?3, status = 'IN_PROGRESS', updated_at = ?4
                 WHERE complaint_id = ?1 AND escalation_level = ?2
                   AND is_overdue = 1 AND status IN ('OPEN', 'IN_PROGRESS')",
                params![complaint_id, expected_level, admin, ts(now)],
            )?,
            None => self.conn.execute(
                "UPDATE complaint
                 SET escalation_level = escalation_level + 1, updated_at = ?3
                 WHERE complaint_id = ?1 AND escalation_level = ?2
                   AND is_overdue = 1 AND status IN ('OPEN', 'IN_PROGRESS')",
                params![complaint_id, expected_level, ts(now)],
            )?,
        };
        Ok(n == 1)
    }

    // ── Notes ──────────────────────────────────────────────────

    pub fn insert_note(
        &self,
        complaint_id: &str,
        author_id: &str,
        body: &str,
        now: DateTime<Utc>,
    ) -> DeskResult<i64> {
        self.conn.execute(
            "INSERT INTO complaint_note (complaint_id, author_id, body, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![complaint_id, author_id, body, ts(now)],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn notes_for_complaint(&self, complaint_id: &str) -> DeskResult<Vec<NoteRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, complaint_id, author_id, body, created_at
             FROM complaint_note WHERE complaint_id = ?1
             ORDER BY created_at ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![complaint_id], note_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
