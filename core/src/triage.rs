//! Intake triage: complaint type decides priority, priority decides the SLA
//! window, and complaint type decides which department works it.
//!
//! The tables are exhaustive matches so adding a complaint type without
//! routing it is a compile error.

use crate::complaint::{ComplaintType, Priority};
use crate::staff::Department;
use chrono::{DateTime, Duration, Utc};

/// Hazard categories (active water, live electrical, sewage) rank HIGH;
/// everything else starts MEDIUM. URGENT and LOW exist for manual overrides
/// and escalation policy, not for intake.
pub fn priority_for(kind: ComplaintType) -> Priority {
    match kind {
        ComplaintType::WaterLeakage | ComplaintType::Electricity | ComplaintType::Sewage => {
            Priority::High
        }
        ComplaintType::RoadDamage | ComplaintType::Garbage | ComplaintType::Other => {
            Priority::Medium
        }
    }
}

/// Resolution window in whole days per priority band.
pub fn sla_days(priority: Priority) -> i64 {
    match priority {
        Priority::Urgent => 1,
        Priority::High => 3,
        Priority::Medium => 7,
        Priority::Low => 14,
    }
}

/// Deadline stamped at submission: creation instant plus the priority's
/// window. Never recomputed afterwards, including on escalation.
pub fn sla_deadline(priority: Priority, created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + Duration::days(sla_days(priority))
}

/// Which department's staff pool a complaint type draws from. Sewage routes
/// to Water (same field crews handle both).
pub fn department_for(kind: ComplaintType) -> Department {
    match kind {
        ComplaintType::RoadDamage => Department::Roads,
        ComplaintType::WaterLeakage | ComplaintType::Sewage => Department::Water,
        ComplaintType::Garbage => Department::Garbage,
        ComplaintType::Electricity => Department::Electricity,
        ComplaintType::Other => Department::General,
    }
}
