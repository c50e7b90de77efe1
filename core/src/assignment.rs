//! Workload-aware auto-assignment.
//!
//! Candidate order: eligible staff in the complaint's own locality first;
//! if the locality has none, a department-wide pool capped at
//! `FALLBACK_POOL_LIMIT`. Within a pool the least-busy member wins, ties
//! going to the first candidate retrieved (ascending staff id, so the
//! outcome is stable across runs).

use crate::clock::Clock;
use crate::complaint::{hours_between, ComplaintRecord};
use crate::error::DeskResult;
use crate::notifier::{deliver_or_log, NewNotification, Notifier};
use crate::staff::StaffRecord;
use crate::store::DeskStore;
use crate::triage;

/// How many department-wide candidates the any-locality fallback considers.
pub const FALLBACK_POOL_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub enum AssignmentOutcome {
    Assigned(StaffRecord),
    /// No eligible staff in the locality or the department-wide fallback.
    /// Not an error: the caller owes the locality admin a heads-up.
    NoneAvailable,
}

/// Pick the least-busy eligible staff member for a complaint, without
/// writing anything. Returns None when both candidate pools are empty.
pub fn select_assignee(
    store: &DeskStore,
    complaint: &ComplaintRecord,
) -> DeskResult<Option<StaffRecord>> {
    let department = triage::department_for(complaint.kind);

    let mut candidates = store.assignment_candidates(department, &complaint.locality)?;
    if candidates.is_empty() {
        candidates = store.fallback_candidates(department, FALLBACK_POOL_LIMIT)?;
        if !candidates.is_empty() {
            log::debug!(
                "no {department} staff in {}; considering {} department-wide candidates",
                complaint.locality,
                candidates.len()
            );
        }
    }

    // min_by_key keeps the first of several minima, which is the retrieval
    // order the tie-break is defined on.
    Ok(candidates
        .into_iter()
        .min_by_key(|(_, load)| *load)
        .map(|(staff, _)| staff))
}

/// Full auto-assignment pass for a freshly created, unassigned complaint:
/// select, persist (flips OPEN to IN_PROGRESS and stamps `time_to_assign`),
/// and notify the selected staff member.
pub fn auto_assign(
    store: &DeskStore,
    notifier: &dyn Notifier,
    clock: &dyn Clock,
    complaint: &ComplaintRecord,
) -> DeskResult<AssignmentOutcome> {
    let Some(staff) = select_assignee(store, complaint)? else {
        log::info!(
            "no eligible staff for complaint {} ({} in {})",
            complaint.complaint_id,
            complaint.kind,
            complaint.locality
        );
        return Ok(AssignmentOutcome::NoneAvailable);
    };

    let now = clock.now();
    let time_to_assign = hours_between(complaint.created_at, now);
    let updated = store.assign_complaint(
        &complaint.complaint_id,
        &staff.staff_id,
        time_to_assign,
        now,
    )?;
    if !updated {
        log::warn!(
            "complaint {} was assigned concurrently; leaving it alone",
            complaint.complaint_id
        );
        return Ok(AssignmentOutcome::NoneAvailable);
    }

    log::info!(
        "auto-assigned {} to {} ({} dept, locality {}) after {time_to_assign}h",
        complaint.complaint_id,
        staff.staff_id,
        triage::department_for(complaint.kind),
        staff.locality
    );
    deliver_or_log(
        notifier,
        NewNotification::auto_assignment(&staff.staff_id, complaint),
    );
    Ok(AssignmentOutcome::Assigned(staff))
}
