//! The engine facade: complaint intake, manual operations, and the sweep.
//!
//! INTAKE ORDER (fixed, documented, never reordered):
//!   1. Validate the submission.
//!   2. Allocate the complaint number.
//!   3. Triage: priority from type, then SLA deadline from priority.
//!   4. Persist the OPEN record and notify admins.
//!   5. Auto-assign (may flip OPEN to IN_PROGRESS).
//!
//! SWEEP ORDER: breach detection, then escalation, then metrics on its
//! cadence. Escalation only ever sees complaints already flagged overdue.

use crate::{
    assignment::{self, AssignmentOutcome},
    breach,
    clock::{Clock, FixedClock},
    complaint::{hours_between, ComplaintRecord, ComplaintStatus, NewComplaint, NoteRecord},
    config::EngineConfig,
    error::{DeskError, DeskResult},
    escalation,
    metrics::{self, DashboardStats, MetricsSnapshot, SweepRecord},
    notifier::{deliver_or_log, NewNotification, Notifier, NotificationRecord, StoreNotifier},
    store::DeskStore,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// What one sweep did. `metrics` is present on the metrics cadence
/// (every `metrics_every_sweeps`-th sweep).
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub sweep_id: String,
    pub breaches_found: i64,
    pub escalated: i64,
    pub metrics: Option<MetricsSnapshot>,
}

pub struct DeskEngine {
    store:    DeskStore,
    clock:    Arc<dyn Clock>,
    notifier: Box<dyn Notifier>,
    config:   EngineConfig,
}

impl DeskEngine {
    pub fn new(
        store: DeskStore,
        clock: Arc<dyn Clock>,
        notifier: Box<dyn Notifier>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            clock,
            notifier,
            config,
        }
    }

    /// Fully wired in-memory engine for tests and demos: migrated store,
    /// `FixedClock` starting at `start`, store-backed notifier. Returns the
    /// engine, a second store handle for assertions, and the clock.
    pub fn build_test(start: DateTime<Utc>) -> DeskResult<(Self, DeskStore, Arc<FixedClock>)> {
        let store = DeskStore::in_memory()?;
        store.migrate()?;
        let clock = Arc::new(FixedClock::new(start));
        let notifier = Box::new(StoreNotifier::new(store.reopen()?, clock.clone()));
        let assertions = store.reopen()?;
        let engine = Self::new(store, clock.clone(), notifier, EngineConfig::default());
        Ok((engine, assertions, clock))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Intake ─────────────────────────────────────────────────

    /// Create a complaint from a citizen submission: triage, persist,
    /// notify admins, then try to auto-assign. Returns the record as it
    /// stands after the whole pipeline.
    pub fn submit_complaint(&self, submission: NewComplaint) -> DeskResult<ComplaintRecord> {
        submission.validate().map_err(DeskError::Validation)?;

        let now = self.clock.now();
        let complaint_id = self.store.allocate_complaint_id()?;
        let priority = crate::triage::priority_for(submission.kind);
        let sla_deadline = crate::triage::sla_deadline(priority, now);

        let record = ComplaintRecord {
            complaint_id: complaint_id.clone(),
            citizen_id: submission.citizen_id,
            kind: submission.kind,
            description: submission.description,
            address: submission.address,
            locality: submission.locality,
            ward: submission.ward,
            status: ComplaintStatus::Open,
            priority,
            assigned_to: None,
            sla_deadline,
            is_overdue: false,
            escalation_level: 0,
            time_to_assign: None,
            time_to_resolve: None,
            created_at: now,
            updated_at: now,
            resolved_at: None,
        };
        self.store.insert_complaint(&record)?;
        log::info!(
            "complaint {complaint_id} submitted: {} in {} ({priority}, due {})",
            record.kind,
            record.locality,
            sla_deadline.format("%Y-%m-%d %H:%M")
        );

        for admin in self.store.admins()? {
            deliver_or_log(
                &*self.notifier,
                NewNotification::submission(&admin.staff_id, &record),
            );
        }

        match assignment::auto_assign(&self.store, &*self.notifier, &*self.clock, &record)? {
            AssignmentOutcome::Assigned(_) => {}
            AssignmentOutcome::NoneAvailable => match self.store.locality_admin(&record.locality)? {
                Some(admin) => deliver_or_log(
                    &*self.notifier,
                    NewNotification::unassigned(&admin.staff_id, &record),
                ),
                None => log::warn!(
                    "no admin for locality {}; complaint {complaint_id} awaits manual assignment",
                    record.locality
                ),
            },
        }

        self.complaint(&complaint_id)
    }

    // ── Manual operations ──────────────────────────────────────

    /// Move a complaint forward through its lifecycle. Resolving stamps
    /// `resolved_at` and the resolution-time metric; the citizen is
    /// notified of every change.
    pub fn transition_status(
        &self,
        complaint_id: &str,
        to: ComplaintStatus,
    ) -> DeskResult<ComplaintRecord> {
        let current = self.complaint(complaint_id)?;
        if !current.status.can_transition_to(to) {
            return Err(DeskError::InvalidTransition {
                from: current.status.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }

        let now = self.clock.now();
        let changed = match to {
            ComplaintStatus::Resolved => self.store.resolve_complaint(
                complaint_id,
                current.status,
                hours_between(current.created_at, now),
                now,
            )?,
            _ => self
                .store
                .update_status(complaint_id, current.status, to, now)?,
        };
        if !changed {
            // The status moved underneath us between read and write.
            return Err(DeskError::InvalidTransition {
                from: current.status.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }

        let updated = self.complaint(complaint_id)?;
        log::info!(
            "complaint {complaint_id}: {} -> {}",
            current.status,
            updated.status
        );
        deliver_or_log(&*self.notifier, NewNotification::status_change(&updated));
        Ok(updated)
    }

    /// Admin hands a complaint to a specific staff member. Flips OPEN to
    /// IN_PROGRESS, stamps `time_to_assign` if this is the first
    /// assignment, and notifies both the staff member and the citizen.
    pub fn assign_manual(
        &self,
        complaint_id: &str,
        staff_id: &str,
    ) -> DeskResult<ComplaintRecord> {
        let current = self.complaint(complaint_id)?;
        let staff = self
            .store
            .get_staff(staff_id)?
            .ok_or_else(|| DeskError::StaffNotFound(staff_id.to_string()))?;
        if !staff.is_assignable() {
            return Err(DeskError::Validation(format!(
                "staff member '{staff_id}' is not an approved, active staff member"
            )));
        }
        if current.status.is_terminal() {
            return Err(DeskError::InvalidTransition {
                from: current.status.as_str().to_string(),
                to: ComplaintStatus::InProgress.as_str().to_string(),
            });
        }

        let now = self.clock.now();
        let time_to_assign = hours_between(current.created_at, now);
        let changed = self
            .store
            .reassign_complaint(complaint_id, staff_id, time_to_assign, now)?;
        if !changed {
            return Err(DeskError::InvalidTransition {
                from: current.status.as_str().to_string(),
                to: ComplaintStatus::InProgress.as_str().to_string(),
            });
        }

        let updated = self.complaint(complaint_id)?;
        log::info!("complaint {complaint_id} manually assigned to {staff_id}");
        deliver_or_log(
            &*self.notifier,
            NewNotification::manual_assignment_staff(staff_id, &updated),
        );
        deliver_or_log(
            &*self.notifier,
            NewNotification::manual_assignment_citizen(&updated),
        );
        Ok(updated)
    }

    /// Append a staff note to a complaint's trail.
    pub fn add_note(
        &self,
        complaint_id: &str,
        author_id: &str,
        body: &str,
    ) -> DeskResult<NoteRecord> {
        if body.trim().is_empty() {
            return Err(DeskError::Validation("note text is required".to_string()));
        }
        let complaint = self.complaint(complaint_id)?;
        if self.store.get_staff(author_id)?.is_none() {
            return Err(DeskError::StaffNotFound(author_id.to_string()));
        }

        let now = self.clock.now();
        let id = self
            .store
            .insert_note(&complaint.complaint_id, author_id, body, now)?;
        log::debug!("note {id} added to {complaint_id} by {author_id}");
        Ok(NoteRecord {
            id,
            complaint_id: complaint.complaint_id,
            author_id: author_id.to_string(),
            body: body.to_string(),
            created_at: now,
        })
    }

    // ── The sweep ──────────────────────────────────────────────

    /// One breach-detection/escalation pass, recorded in the sweep ledger.
    /// Metrics ride along on every `metrics_every_sweeps`-th sweep.
    pub fn run_sweep(&self) -> DeskResult<SweepReport> {
        let started_at = self.clock.now();
        let sweep_id = Uuid::new_v4().to_string();
        log::debug!("sweep {sweep_id} started");

        let breaches_found = breach::detect(&self.store, &*self.notifier, &*self.clock)?;
        let escalated = escalation::run(&self.store, &*self.notifier, &*self.clock)?;

        let sweep_no = self.store.sweep_count()? + 1;
        let on_cadence = self.config.metrics_every_sweeps > 0
            && sweep_no as u64 % self.config.metrics_every_sweeps == 0;
        let metrics = if on_cadence {
            Some(metrics::snapshot(&self.store, &*self.clock)?)
        } else {
            None
        };

        let report = SweepReport {
            sweep_id: sweep_id.clone(),
            breaches_found,
            escalated,
            metrics,
        };
        self.store.insert_sweep(&SweepRecord {
            sweep_id,
            started_at,
            finished_at: self.clock.now(),
            breaches_found,
            escalated,
        })?;
        log::info!(
            "sweep #{sweep_no} done: {breaches_found} breaches, {escalated} escalated"
        );
        Ok(report)
    }

    // ── Reads ──────────────────────────────────────────────────

    pub fn complaint(&self, complaint_id: &str) -> DeskResult<ComplaintRecord> {
        self.store
            .get_complaint(complaint_id)?
            .ok_or_else(|| DeskError::ComplaintNotFound(complaint_id.to_string()))
    }

    pub fn complaints_for_citizen(&self, citizen_id: &str) -> DeskResult<Vec<ComplaintRecord>> {
        self.store.complaints_for_citizen(citizen_id)
    }

    pub fn complaints_for_staff(&self, staff_id: &str) -> DeskResult<Vec<ComplaintRecord>> {
        self.store.complaints_for_staff(staff_id)
    }

    pub fn recent_complaints(&self, limit: i64) -> DeskResult<Vec<ComplaintRecord>> {
        self.store.recent_complaints(limit)
    }

    pub fn notes_for_complaint(&self, complaint_id: &str) -> DeskResult<Vec<NoteRecord>> {
        self.store.notes_for_complaint(complaint_id)
    }

    pub fn notifications_for(&self, recipient_id: &str) -> DeskResult<Vec<NotificationRecord>> {
        self.store.notifications_for(recipient_id)
    }

    pub fn metrics_snapshot(&self) -> DeskResult<MetricsSnapshot> {
        metrics::snapshot(&self.store, &*self.clock)
    }

    pub fn dashboard(&self) -> DeskResult<DashboardStats> {
        metrics::dashboard(&self.store)
    }

    pub fn sweep_history(&self, limit: usize) -> DeskResult<Vec<SweepRecord>> {
        self.store.sweep_history(limit)
    }
}
