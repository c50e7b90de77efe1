//! Breach detection: the first step of every sweep.
//!
//! RULE: This step only flips `is_overdue` and notifies. It never touches
//! `escalation_level` or `assigned_to`; that is the escalation step's job,
//! which runs after it in the same sweep.

use crate::clock::Clock;
use crate::error::DeskResult;
use crate::notifier::{deliver_or_log, NewNotification, Notifier};
use crate::store::DeskStore;

/// Flag every active complaint past its deadline, notifying the assigned
/// staff member and the locality admin (either may be absent; that skips
/// the notification, nothing else). Returns the number of complaints newly
/// flagged in this pass.
///
/// Per-record failures are logged and the pass continues with the next
/// candidate; only the candidate query itself can fail the whole step.
pub fn detect(store: &DeskStore, notifier: &dyn Notifier, clock: &dyn Clock) -> DeskResult<i64> {
    let now = clock.now();
    let candidates = store.overdue_candidates(now)?;
    let mut flagged = 0i64;

    for complaint in candidates {
        match store.flag_overdue(&complaint.complaint_id, now) {
            Ok(true) => {}
            Ok(false) => {
                // Resolved or flagged by someone else since the query ran.
                log::debug!("complaint {} no longer qualifies", complaint.complaint_id);
                continue;
            }
            Err(e) => {
                log::warn!(
                    "failed to flag complaint {} overdue: {e}",
                    complaint.complaint_id
                );
                continue;
            }
        }
        flagged += 1;

        if let Some(staff_id) = complaint.assigned_to.as_deref() {
            deliver_or_log(
                notifier,
                NewNotification::sla_breach_assignee(staff_id, &complaint),
            );
        }
        match store.locality_admin(&complaint.locality) {
            Ok(Some(admin)) => deliver_or_log(
                notifier,
                NewNotification::sla_breach_admin(&admin.staff_id, &complaint),
            ),
            Ok(None) => {}
            Err(e) => log::warn!(
                "admin lookup for locality {} failed: {e}",
                complaint.locality
            ),
        }
    }

    if flagged > 0 {
        log::info!("breach sweep flagged {flagged} overdue complaints");
    }
    Ok(flagged)
}
