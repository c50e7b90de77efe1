//! Lifecycle tests: intake numbering and validation, the forward-only
//! status machine, manual assignment, resolution metrics, and notes.

use chrono::{DateTime, Duration, TimeZone, Utc};
use civicdesk_core::complaint::{ComplaintStatus, ComplaintType, NewComplaint};
use civicdesk_core::engine::DeskEngine;
use civicdesk_core::error::DeskError;
use civicdesk_core::notifier::NotificationKind;
use civicdesk_core::staff::{Department, StaffRecord, StaffRole};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

fn field_staff(id: &str, department: Department) -> StaffRecord {
    StaffRecord {
        staff_id: id.to_string(),
        name: format!("Worker {id}"),
        role: StaffRole::Staff,
        department: Some(department),
        locality: "Riverside".to_string(),
        is_approved: true,
        is_active: true,
        created_at: start(),
    }
}

fn admin(id: &str, locality: &str) -> StaffRecord {
    StaffRecord {
        staff_id: id.to_string(),
        name: format!("Admin {id}"),
        role: StaffRole::Admin,
        department: None,
        locality: locality.to_string(),
        is_approved: true,
        is_active: true,
        created_at: start(),
    }
}

fn submission(citizen: &str, kind: ComplaintType) -> NewComplaint {
    NewComplaint {
        citizen_id: citizen.to_string(),
        kind,
        description: "streetlight out since last week".to_string(),
        address: "22 Temple Street".to_string(),
        locality: "Riverside".to_string(),
        ward: None,
    }
}

/// Complaint numbers come from the shared sequence: CMP-1001 first, then
/// one-by-one with no gaps or repeats.
#[test]
fn complaint_numbers_start_at_1001_and_increment() {
    let (engine, _store, _clock) = DeskEngine::build_test(start()).unwrap();

    let a = engine.submit_complaint(submission("CIT-001", ComplaintType::Other)).unwrap();
    let b = engine.submit_complaint(submission("CIT-001", ComplaintType::Other)).unwrap();
    let c = engine.submit_complaint(submission("CIT-002", ComplaintType::Other)).unwrap();

    assert_eq!(a.complaint_id, "CMP-1001");
    assert_eq!(b.complaint_id, "CMP-1002");
    assert_eq!(c.complaint_id, "CMP-1003");
}

/// Every admin hears about every submission, whatever their locality.
#[test]
fn submission_notifies_every_admin() {
    let (engine, store, _clock) = DeskEngine::build_test(start()).unwrap();
    store.upsert_staff(&admin("A-MEERA", "Riverside")).unwrap();
    store.upsert_staff(&admin("A-VIJAY", "Hillview")).unwrap();

    engine.submit_complaint(submission("CIT-001", ComplaintType::Garbage)).unwrap();

    for admin_id in ["A-MEERA", "A-VIJAY"] {
        let inbox = engine.notifications_for(admin_id).unwrap();
        assert!(
            inbox.iter().any(|n| n.kind == NotificationKind::Submission),
            "{admin_id} should be told about the submission, got {inbox:?}"
        );
    }
    assert_eq!(
        store.notification_count(NotificationKind::Submission).unwrap(),
        2,
        "one submission notice per admin, no more"
    );
}

/// Intake validation: over-length descriptions and blank addresses are
/// rejected before anything is written.
#[test]
fn invalid_submissions_are_rejected() {
    let (engine, store, _clock) = DeskEngine::build_test(start()).unwrap();

    let mut long = submission("CIT-001", ComplaintType::Other);
    long.description = "x".repeat(501);
    let err = engine.submit_complaint(long).unwrap_err();
    assert!(matches!(err, DeskError::Validation(_)), "got {err:?}");

    let mut blank = submission("CIT-001", ComplaintType::Other);
    blank.address = "   ".to_string();
    let err = engine.submit_complaint(blank).unwrap_err();
    assert!(matches!(err, DeskError::Validation(_)), "got {err:?}");

    assert_eq!(store.complaint_count().unwrap(), 0, "nothing should be persisted");
}

/// The description cap counts characters, not UTF-8 bytes: 500 accented
/// characters (1000 bytes) are accepted, 501 are not.
#[test]
fn description_limit_counts_characters_not_bytes() {
    let (engine, _store, _clock) = DeskEngine::build_test(start()).unwrap();

    let mut at_cap = submission("CIT-001", ComplaintType::Other);
    at_cap.description = "\u{e9}".repeat(500);
    let c = engine.submit_complaint(at_cap).unwrap();
    assert_eq!(c.description.chars().count(), 500, "persisted intact");

    let mut over_cap = submission("CIT-001", ComplaintType::Other);
    over_cap.description = "\u{e9}".repeat(501);
    let err = engine.submit_complaint(over_cap).unwrap_err();
    assert!(matches!(err, DeskError::Validation(_)), "got {err:?}");
}

/// The status machine only moves forward. Skipping ahead is allowed,
/// standing still and moving back are not.
#[test]
fn status_only_moves_forward() {
    let (engine, _store, _clock) = DeskEngine::build_test(start()).unwrap();
    let c = engine.submit_complaint(submission("CIT-001", ComplaintType::Other)).unwrap();

    // OPEN -> RESOLVED is a legal forward skip.
    let resolved = engine.transition_status(&c.complaint_id, ComplaintStatus::Resolved).unwrap();
    assert_eq!(resolved.status, ComplaintStatus::Resolved);

    let err = engine
        .transition_status(&c.complaint_id, ComplaintStatus::InProgress)
        .unwrap_err();
    assert!(matches!(err, DeskError::InvalidTransition { .. }), "no moving backward, got {err:?}");

    let err = engine
        .transition_status(&c.complaint_id, ComplaintStatus::Resolved)
        .unwrap_err();
    assert!(matches!(err, DeskError::InvalidTransition { .. }), "no standing still, got {err:?}");

    let closed = engine.transition_status(&c.complaint_id, ComplaintStatus::Closed).unwrap();
    assert_eq!(closed.status, ComplaintStatus::Closed);

    let err = engine
        .transition_status(&c.complaint_id, ComplaintStatus::Resolved)
        .unwrap_err();
    assert!(matches!(err, DeskError::InvalidTransition { .. }), "CLOSED is final, got {err:?}");
}

/// Resolving stamps `resolved_at` and the elapsed hours since creation, and
/// the citizen is told about the change.
#[test]
fn resolving_stamps_the_resolution_metrics() {
    let (engine, _store, clock) = DeskEngine::build_test(start()).unwrap();
    let c = engine.submit_complaint(submission("CIT-001", ComplaintType::Other)).unwrap();

    clock.advance(Duration::hours(26));
    let resolved = engine.transition_status(&c.complaint_id, ComplaintStatus::Resolved).unwrap();

    assert_eq!(resolved.time_to_resolve, Some(26.0));
    assert_eq!(resolved.resolved_at, Some(start() + Duration::hours(26)));

    let inbox = engine.notifications_for("CIT-001").unwrap();
    assert!(
        inbox.iter().any(|n| n.kind == NotificationKind::StatusChange),
        "citizen should hear about the resolution, got {inbox:?}"
    );
}

/// An admin can hand a complaint to any approved staff member, department
/// match or not. Both the staff member and the citizen are notified.
#[test]
fn manual_assignment_notifies_staff_and_citizen() {
    let (engine, store, clock) = DeskEngine::build_test(start()).unwrap();
    store.upsert_staff(&field_staff("S-WATER", Department::Water)).unwrap();

    // Roads complaint, so auto-assignment finds nobody.
    let c = engine.submit_complaint(submission("CIT-001", ComplaintType::RoadDamage)).unwrap();
    assert_eq!(c.assigned_to, None);

    clock.advance(Duration::hours(2));
    let assigned = engine.assign_manual(&c.complaint_id, "S-WATER").unwrap();

    assert_eq!(assigned.assigned_to.as_deref(), Some("S-WATER"));
    assert_eq!(assigned.status, ComplaintStatus::InProgress);
    assert_eq!(assigned.time_to_assign, Some(2.0));

    let staff_inbox = engine.notifications_for("S-WATER").unwrap();
    assert!(
        staff_inbox.iter().any(|n| n.kind == NotificationKind::Assignment),
        "staff member should be notified, got {staff_inbox:?}"
    );
    let citizen_inbox = engine.notifications_for("CIT-001").unwrap();
    assert!(
        citizen_inbox.iter().any(|n| n.kind == NotificationKind::Assignment),
        "citizen should be notified, got {citizen_inbox:?}"
    );
}

/// Manual assignment refuses unknown ids, members awaiting approval, and
/// admins (who supervise, not work, the queue).
#[test]
fn manual_assignment_rejects_ineligible_targets() {
    let (engine, store, _clock) = DeskEngine::build_test(start()).unwrap();
    let mut pending = field_staff("S-NEW", Department::Roads);
    pending.is_approved = false;
    store.upsert_staff(&pending).unwrap();
    store.upsert_staff(&admin("A-MEERA", "Riverside")).unwrap();

    let c = engine.submit_complaint(submission("CIT-001", ComplaintType::Other)).unwrap();

    let err = engine.assign_manual(&c.complaint_id, "S-GHOST").unwrap_err();
    assert!(matches!(err, DeskError::StaffNotFound(_)), "got {err:?}");

    let err = engine.assign_manual(&c.complaint_id, "S-NEW").unwrap_err();
    assert!(matches!(err, DeskError::Validation(_)), "got {err:?}");

    let err = engine.assign_manual(&c.complaint_id, "A-MEERA").unwrap_err();
    assert!(matches!(err, DeskError::Validation(_)), "got {err:?}");
}

/// Terminal complaints cannot be (re)assigned.
#[test]
fn manual_assignment_rejects_terminal_complaints() {
    let (engine, store, _clock) = DeskEngine::build_test(start()).unwrap();
    store.upsert_staff(&field_staff("S-RAVI", Department::General)).unwrap();

    let c = engine.submit_complaint(submission("CIT-001", ComplaintType::Other)).unwrap();
    engine.transition_status(&c.complaint_id, ComplaintStatus::Resolved).unwrap();

    let err = engine.assign_manual(&c.complaint_id, "S-RAVI").unwrap_err();
    assert!(matches!(err, DeskError::InvalidTransition { .. }), "got {err:?}");
}

/// Re-routing a complaint never rewrites `time_to_assign`: the metric
/// records the wait for the first assignment only.
#[test]
fn reassignment_keeps_the_first_time_to_assign() {
    let (engine, store, clock) = DeskEngine::build_test(start()).unwrap();
    store.upsert_staff(&field_staff("S-ANITA", Department::Roads)).unwrap();
    store.upsert_staff(&field_staff("S-BHARAT", Department::Roads)).unwrap();

    let c = engine.submit_complaint(submission("CIT-001", ComplaintType::RoadDamage)).unwrap();
    assert_eq!(c.assigned_to.as_deref(), Some("S-ANITA"));
    assert_eq!(c.time_to_assign, Some(0.0));

    clock.advance(Duration::hours(5));
    let moved = engine.assign_manual(&c.complaint_id, "S-BHARAT").unwrap();
    assert_eq!(moved.assigned_to.as_deref(), Some("S-BHARAT"));
    assert_eq!(moved.time_to_assign, Some(0.0), "first-assignment metric must survive re-routing");
}

/// Notes append in order and read back oldest first; blank notes and
/// unknown authors are rejected.
#[test]
fn notes_append_in_order() {
    let (engine, store, clock) = DeskEngine::build_test(start()).unwrap();
    store.upsert_staff(&field_staff("S-RAVI", Department::General)).unwrap();

    let c = engine.submit_complaint(submission("CIT-001", ComplaintType::Other)).unwrap();
    engine.add_note(&c.complaint_id, "S-RAVI", "visited the site").unwrap();
    clock.advance(Duration::minutes(30));
    engine.add_note(&c.complaint_id, "S-RAVI", "parts ordered").unwrap();

    let notes = engine.notes_for_complaint(&c.complaint_id).unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].body, "visited the site");
    assert_eq!(notes[1].body, "parts ordered");

    let err = engine.add_note(&c.complaint_id, "S-RAVI", "   ").unwrap_err();
    assert!(matches!(err, DeskError::Validation(_)), "got {err:?}");
    let err = engine.add_note(&c.complaint_id, "S-GHOST", "hello").unwrap_err();
    assert!(matches!(err, DeskError::StaffNotFound(_)), "got {err:?}");
}

/// Looking up a number that was never issued is a not-found error, as is
/// annotating one.
#[test]
fn unknown_complaint_is_not_found() {
    let (engine, store, _clock) = DeskEngine::build_test(start()).unwrap();
    store.upsert_staff(&field_staff("S-RAVI", Department::General)).unwrap();

    let err = engine.complaint("CMP-9999").unwrap_err();
    assert!(matches!(err, DeskError::ComplaintNotFound(_)), "got {err:?}");

    let err = engine.add_note("CMP-9999", "S-RAVI", "hello").unwrap_err();
    assert!(matches!(err, DeskError::ComplaintNotFound(_)), "got {err:?}");
}

/// Citizens see their own complaints, staff see their assigned queue.
#[test]
fn citizen_and_staff_views_are_scoped() {
    let (engine, store, _clock) = DeskEngine::build_test(start()).unwrap();
    store.upsert_staff(&field_staff("S-RAVI", Department::Roads)).unwrap();

    engine.submit_complaint(submission("CIT-A", ComplaintType::RoadDamage)).unwrap();
    engine.submit_complaint(submission("CIT-A", ComplaintType::Other)).unwrap();
    engine.submit_complaint(submission("CIT-B", ComplaintType::RoadDamage)).unwrap();

    let mine = engine.complaints_for_citizen("CIT-A").unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|c| c.citizen_id == "CIT-A"));

    let queue = engine.complaints_for_staff("S-RAVI").unwrap();
    assert_eq!(queue.len(), 2, "both RoadDamage complaints went to the one Roads worker");
    assert!(queue.iter().all(|c| c.assigned_to.as_deref() == Some("S-RAVI")));
}
