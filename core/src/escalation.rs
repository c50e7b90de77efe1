//! Escalation and reassignment: the second step of every sweep.
//!
//! Overdue complaints below the ceiling get their escalation level bumped
//! and are re-routed to the locality's supervising admin. A locality with
//! no admin still gets the level bump; only the re-routing is skipped.
//! Complaints at the ceiling are left for manual handling.

use crate::clock::Clock;
use crate::error::DeskResult;
use crate::notifier::{deliver_or_log, NewNotification, Notifier};
use crate::store::DeskStore;

/// An overdue complaint is escalated at most this many times.
pub const ESCALATION_CEILING: i64 = 2;

/// One escalation pass. Returns the number of complaints whose level was
/// bumped. Per-record failures are logged and the pass continues.
pub fn run(store: &DeskStore, notifier: &dyn Notifier, clock: &dyn Clock) -> DeskResult<i64> {
    let now = clock.now();
    let candidates = store.escalation_candidates(ESCALATION_CEILING)?;
    let mut escalated = 0i64;

    for complaint in candidates {
        let supervisor = match store.locality_admin(&complaint.locality) {
            Ok(s) => s,
            Err(e) => {
                log::warn!(
                    "admin lookup for locality {} failed: {e}",
                    complaint.locality
                );
                continue;
            }
        };

        let supervisor_id = supervisor.as_ref().map(|s| s.staff_id.as_str());
        match store.escalate_complaint(
            &complaint.complaint_id,
            complaint.escalation_level,
            supervisor_id,
            now,
        ) {
            Ok(true) => {}
            Ok(false) => {
                log::debug!("complaint {} no longer qualifies", complaint.complaint_id);
                continue;
            }
            Err(e) => {
                log::warn!(
                    "failed to escalate complaint {}: {e}",
                    complaint.complaint_id
                );
                continue;
            }
        }
        escalated += 1;

        let new_level = complaint.escalation_level + 1;
        match supervisor {
            Some(admin) => {
                log::info!(
                    "escalated {} to level {new_level}, re-routed to {}",
                    complaint.complaint_id,
                    admin.staff_id
                );
                deliver_or_log(
                    notifier,
                    NewNotification::escalation(&admin.staff_id, &complaint, new_level),
                );
            }
            None => log::warn!(
                "no admin for locality {}; complaint {} escalated to level {new_level} without reassignment",
                complaint.locality,
                complaint.complaint_id
            ),
        }
    }

    Ok(escalated)
}
