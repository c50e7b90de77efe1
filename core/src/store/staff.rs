use super::{datetime_col, enum_col, ts, DeskStore};
use crate::error::DeskResult;
use crate::staff::{Department, StaffRecord, StaffRole};
use rusqlite::{params, OptionalExtension};

fn staff_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<StaffRecord> {
    let role_raw: String = row.get(2)?;
    let dept_raw: Option<String> = row.get(3)?;
    Ok(StaffRecord {
        staff_id: row.get(0)?,
        name: row.get(1)?,
        role: enum_col(2, &role_raw, StaffRole::parse)?,
        department: dept_raw
            .map(|d| enum_col(3, &d, Department::parse))
            .transpose()?,
        locality: row.get(4)?,
        is_approved: row.get::<_, i32>(5)? != 0,
        is_active: row.get::<_, i32>(6)? != 0,
        created_at: datetime_col(7, row.get(7)?)?,
    })
}

/// Candidate rows carry the staff record plus its current active workload,
/// computed in the same query the candidate was retrieved by.
fn candidate_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<(StaffRecord, i64)> {
    Ok((staff_row_mapper(row)?, row.get(8)?))
}

impl DeskStore {
    // ── Staff directory ────────────────────────────────────────

    /// Install or refresh a directory entry. Used by seeding and tests; the
    /// engine itself only reads the directory.
    pub fn upsert_staff(&self, s: &StaffRecord) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO staff (staff_id, name, role, department, locality,
                                is_approved, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT (staff_id) DO UPDATE SET
                name = excluded.name, role = excluded.role,
                department = excluded.department, locality = excluded.locality,
                is_approved = excluded.is_approved, is_active = excluded.is_active",
            params![
                &s.staff_id,
                &s.name,
                s.role.as_str(),
                s.department.map(|d| d.as_str()),
                &s.locality,
                if s.is_approved { 1i32 } else { 0i32 },
                if s.is_active { 1i32 } else { 0i32 },
                ts(s.created_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_staff(&self, staff_id: &str) -> DeskResult<Option<StaffRecord>> {
        self.conn
            .query_row(
                "SELECT staff_id, name, role, department, locality,
                        is_approved, is_active, created_at
                 FROM staff WHERE staff_id = ?1",
                params![staff_id],
                staff_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Headcount of workers (admins excluded).
    pub fn staff_count(&self) -> DeskResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM staff WHERE role = 'Staff'",
                [],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    // ── Assignment candidate queries ───────────────────────────
    //
    // Candidates come back in ascending staff_id order; the assigner's
    // "first one wins" tie-break is therefore stable across runs.

    /// Eligible staff in the complaint's own locality, with workloads.
    pub fn assignment_candidates(
        &self,
        department: Department,
        locality: &str,
    ) -> DeskResult<Vec<(StaffRecord, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.staff_id, s.name, s.role, s.department, s.locality,
                    s.is_approved, s.is_active, s.created_at,
                    (SELECT COUNT(*) FROM complaint c
                     WHERE c.assigned_to = s.staff_id
                       AND c.status IN ('OPEN', 'IN_PROGRESS')) AS active_load
             FROM staff s
             WHERE s.role = 'Staff' AND s.department = ?1 AND s.locality = ?2
               AND s.is_approved = 1 AND s.is_active = 1
             ORDER BY s.staff_id ASC",
        )?;
        let rows = stmt.query_map(params![department.as_str(), locality], candidate_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Department-wide fallback pool, any locality, capped at `limit`.
    pub fn fallback_candidates(
        &self,
        department: Department,
        limit: usize,
    ) -> DeskResult<Vec<(StaffRecord, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.staff_id, s.name, s.role, s.department, s.locality,
                    s.is_approved, s.is_active, s.created_at,
                    (SELECT COUNT(*) FROM complaint c
                     WHERE c.assigned_to = s.staff_id
                       AND c.status IN ('OPEN', 'IN_PROGRESS')) AS active_load
             FROM staff s
             WHERE s.role = 'Staff' AND s.department = ?1
               AND s.is_approved = 1 AND s.is_active = 1
             ORDER BY s.staff_id ASC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(
            params![department.as_str(), limit as i64],
            candidate_row_mapper,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Admin lookups ──────────────────────────────────────────

    /// The supervising admin for a locality, if one exists. Lowest staff_id
    /// wins when a locality has several.
    pub fn locality_admin(&self, locality: &str) -> DeskResult<Option<StaffRecord>> {
        self.conn
            .query_row(
                "SELECT staff_id, name, role, department, locality,
                        is_approved, is_active, created_at
                 FROM staff
                 WHERE role = 'Admin' AND locality = ?1 AND is_active = 1
                 ORDER BY staff_id ASC LIMIT 1",
                params![locality],
                staff_row_mapper,
            )
            .optional()
            .map_err(Into::into)
    }

    /// All active admins, for submission fan-out.
    pub fn admins(&self) -> DeskResult<Vec<StaffRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT staff_id, name, role, department, locality,
                    is_approved, is_active, created_at
             FROM staff WHERE role = 'Admin' AND is_active = 1
             ORDER BY staff_id ASC",
        )?;
        let rows = stmt.query_map([], staff_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
