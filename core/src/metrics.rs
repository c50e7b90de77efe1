//! Metrics aggregation: read-only projections over the complaint history.
//!
//! RULE: Nothing in this module mutates a complaint. Aggregation reads a
//! point-in-time view and may run concurrently with the lifecycle steps.

use crate::clock::Clock;
use crate::error::DeskResult;
use crate::store::DeskStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Months of submission history the dashboard trend covers.
pub const TREND_MONTHS: usize = 12;

/// Per-group performance line: one per locality, staff member, or complaint
/// type. `avg_resolution_hours` is None until the group has a timed
/// resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStats {
    pub key: String,
    pub total: i64,
    pub resolved: i64,
    pub overdue: i64,
    pub avg_resolution_hours: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub generated_at: DateTime<Utc>,
    pub by_locality: Vec<GroupStats>,
    pub by_staff: Vec<GroupStats>,
    pub by_type: Vec<GroupStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeCount {
    pub kind: crate::complaint::ComplaintType,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthCount {
    /// Calendar month, `YYYY-MM`.
    pub month: String,
    pub count: i64,
}

/// Overview numbers for the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_complaints: i64,
    pub resolved_complaints: i64,
    pub pending_complaints: i64,
    pub total_staff: i64,
    pub by_type: Vec<TypeCount>,
    pub monthly_trend: Vec<MonthCount>,
}

/// One ledger row per completed sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRecord {
    pub sweep_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub breaches_found: i64,
    pub escalated: i64,
}

/// The three performance groupings (locality, staff, type), computed
/// back-to-back over the same store handle.
pub fn snapshot(store: &DeskStore, clock: &dyn Clock) -> DeskResult<MetricsSnapshot> {
    let snap = MetricsSnapshot {
        generated_at: clock.now(),
        by_locality: store.group_stats_by_locality()?,
        by_staff: store.group_stats_by_staff()?,
        by_type: store.group_stats_by_type()?,
    };
    log::debug!(
        "metrics snapshot: {} localities, {} staff, {} types",
        snap.by_locality.len(),
        snap.by_staff.len(),
        snap.by_type.len()
    );
    Ok(snap)
}

pub fn dashboard(store: &DeskStore) -> DeskResult<DashboardStats> {
    Ok(DashboardStats {
        total_complaints: store.complaint_count()?,
        resolved_complaints: store.status_count(crate::complaint::ComplaintStatus::Resolved)?,
        pending_complaints: store.active_complaint_count()?,
        total_staff: store.staff_count()?,
        by_type: store.complaints_by_type()?,
        monthly_trend: store.monthly_trend(TREND_MONTHS)?,
    })
}
