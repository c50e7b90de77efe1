//! Metrics tests: the grouped performance statistics, the admin dashboard
//! counters, and the monthly submission trend.

use chrono::{DateTime, Duration, TimeZone, Utc};
use civicdesk_core::complaint::{ComplaintStatus, ComplaintType, NewComplaint};
use civicdesk_core::engine::DeskEngine;
use civicdesk_core::staff::{Department, StaffRecord, StaffRole};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

fn field_staff(id: &str, department: Department, locality: &str) -> StaffRecord {
    StaffRecord {
        staff_id: id.to_string(),
        name: format!("Worker {id}"),
        role: StaffRole::Staff,
        department: Some(department),
        locality: locality.to_string(),
        is_approved: true,
        is_active: true,
        created_at: start(),
    }
}

fn submission(kind: ComplaintType, locality: &str) -> NewComplaint {
    NewComplaint {
        citizen_id: "CIT-001".to_string(),
        kind,
        description: "logged for the monthly numbers".to_string(),
        address: "90 Mill Lane".to_string(),
        locality: locality.to_string(),
        ward: None,
    }
}

/// Two complaints on one worker: one resolved after 26 hours, one left to
/// breach. Every grouping reports total 2, resolved 1, overdue 1, and the
/// 26-hour average.
#[test]
fn group_stats_track_resolution_and_overdue() {
    let (engine, store, clock) = DeskEngine::build_test(start()).unwrap();
    store.upsert_staff(&field_staff("S-RAVI", Department::Roads, "Riverside")).unwrap();

    let c1 = engine.submit_complaint(submission(ComplaintType::RoadDamage, "Riverside")).unwrap();
    engine.submit_complaint(submission(ComplaintType::RoadDamage, "Riverside")).unwrap();

    clock.advance(Duration::hours(26));
    engine.transition_status(&c1.complaint_id, ComplaintStatus::Resolved).unwrap();

    // Move past the 7-day window and let the sweep flag the second one.
    clock.advance(Duration::days(8) - Duration::hours(26));
    engine.run_sweep().unwrap();

    let snap = engine.metrics_snapshot().unwrap();

    assert_eq!(snap.by_type.len(), 1);
    let by_type = &snap.by_type[0];
    assert_eq!(by_type.key, "RoadDamage");
    assert_eq!(by_type.total, 2);
    assert_eq!(by_type.resolved, 1);
    assert_eq!(by_type.overdue, 1);
    assert_eq!(by_type.avg_resolution_hours, Some(26.0));

    let by_staff = &snap.by_staff[0];
    assert_eq!(by_staff.key, "S-RAVI");
    assert_eq!(by_staff.total, 2, "both complaints sit on the one worker");

    let by_locality = &snap.by_locality[0];
    assert_eq!(by_locality.key, "Riverside");
    assert_eq!(by_locality.total, 2);
}

/// With nothing resolved yet the average stays null rather than zero.
#[test]
fn avg_resolution_is_null_until_a_timed_resolution() {
    let (engine, _store, _clock) = DeskEngine::build_test(start()).unwrap();
    engine.submit_complaint(submission(ComplaintType::Garbage, "Riverside")).unwrap();

    let snap = engine.metrics_snapshot().unwrap();
    assert_eq!(snap.by_type[0].avg_resolution_hours, None);
    assert_eq!(snap.by_type[0].resolved, 0);
}

/// The per-staff grouping only covers assigned complaints; an unassignable
/// one still shows up under its locality and type.
#[test]
fn by_staff_ignores_unassigned_complaints() {
    let (engine, _store, _clock) = DeskEngine::build_test(start()).unwrap();
    engine.submit_complaint(submission(ComplaintType::RoadDamage, "Riverside")).unwrap();

    let snap = engine.metrics_snapshot().unwrap();
    assert!(snap.by_staff.is_empty(), "nobody was assigned, got {:?}", snap.by_staff);
    assert_eq!(snap.by_locality.len(), 1);
    assert_eq!(snap.by_type.len(), 1);
}

/// Dashboard counters: totals, resolved/pending split, the staff headcount
/// (admins excluded), and the per-type breakdown.
#[test]
fn dashboard_counts_and_pending_split() {
    let (engine, store, _clock) = DeskEngine::build_test(start()).unwrap();
    store.upsert_staff(&field_staff("S-RAVI", Department::Roads, "Riverside")).unwrap();
    store.upsert_staff(&StaffRecord {
        staff_id: "A-MEERA".to_string(),
        name: "Admin A-MEERA".to_string(),
        role: StaffRole::Admin,
        department: None,
        locality: "Riverside".to_string(),
        is_approved: true,
        is_active: true,
        created_at: start(),
    }).unwrap();

    let c1 = engine.submit_complaint(submission(ComplaintType::RoadDamage, "Riverside")).unwrap();
    engine.submit_complaint(submission(ComplaintType::RoadDamage, "Riverside")).unwrap();
    engine.submit_complaint(submission(ComplaintType::Garbage, "Riverside")).unwrap();
    engine.transition_status(&c1.complaint_id, ComplaintStatus::Resolved).unwrap();

    let dash = engine.dashboard().unwrap();
    assert_eq!(dash.total_complaints, 3);
    assert_eq!(dash.resolved_complaints, 1);
    assert_eq!(dash.pending_complaints, 2);
    assert_eq!(dash.total_staff, 1, "the admin does not count as field staff");

    let road = dash.by_type.iter().find(|t| t.kind == ComplaintType::RoadDamage).unwrap();
    assert_eq!(road.count, 2);
    let garbage = dash.by_type.iter().find(|t| t.kind == ComplaintType::Garbage).unwrap();
    assert_eq!(garbage.count, 1);
}

/// Submissions spanning a month boundary produce one trend bucket per
/// calendar month, oldest first.
#[test]
fn monthly_trend_buckets_by_calendar_month() {
    let (engine, _store, clock) = DeskEngine::build_test(start()).unwrap();

    engine.submit_complaint(submission(ComplaintType::Other, "Riverside")).unwrap();
    clock.advance(Duration::days(35));
    engine.submit_complaint(submission(ComplaintType::Other, "Riverside")).unwrap();
    engine.submit_complaint(submission(ComplaintType::Other, "Riverside")).unwrap();

    let dash = engine.dashboard().unwrap();
    assert_eq!(dash.monthly_trend.len(), 2, "got {:?}", dash.monthly_trend);
    assert_eq!(dash.monthly_trend[0].month, "2025-03");
    assert_eq!(dash.monthly_trend[0].count, 1);
    assert_eq!(dash.monthly_trend[1].month, "2025-04");
    assert_eq!(dash.monthly_trend[1].count, 2);
}

/// Snapshots are stamped from the engine clock, not the wall clock.
#[test]
fn snapshot_is_stamped_by_the_engine_clock() {
    let (engine, _store, clock) = DeskEngine::build_test(start()).unwrap();
    clock.advance(Duration::hours(2));

    let snap = engine.metrics_snapshot().unwrap();
    assert_eq!(snap.generated_at, start() + Duration::hours(2));
}
