//! Notification fan-out. The engine emits a `NewNotification` at every
//! lifecycle event; the `Notifier` implementation decides where it lands.
//!
//! `StoreNotifier` is the production sink: one row per notification in the
//! `notification` table, which doubles as the assertion surface in tests.

use crate::clock::Clock;
use crate::complaint::ComplaintRecord;
use crate::error::DeskResult;
use crate::store::DeskStore;
use crate::types::{ComplaintId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Submission,
    Assignment,
    StatusChange,
    SlaBreach,
    Escalation,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submission => "SUBMISSION",
            Self::Assignment => "ASSIGNMENT",
            Self::StatusChange => "STATUS_CHANGE",
            Self::SlaBreach => "SLA_BREACH",
            Self::Escalation => "ESCALATION",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SUBMISSION" => Some(Self::Submission),
            "ASSIGNMENT" => Some(Self::Assignment),
            "STATUS_CHANGE" => Some(Self::StatusChange),
            "SLA_BREACH" => Some(Self::SlaBreach),
            "ESCALATION" => Some(Self::Escalation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub recipient_id: UserId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub complaint_id: Option<ComplaintId>,
}

impl NewNotification {
    /// Admin heads-up that a citizen filed a new complaint.
    pub fn submission(admin_id: &str, complaint: &ComplaintRecord) -> Self {
        Self {
            recipient_id: admin_id.to_string(),
            title: "New complaint submitted".into(),
            message: format!(
                "A new {} complaint {} has been submitted in {}.",
                complaint.kind, complaint.complaint_id, complaint.locality
            ),
            kind: NotificationKind::Submission,
            complaint_id: Some(complaint.complaint_id.clone()),
        }
    }

    pub fn auto_assignment(staff_id: &str, complaint: &ComplaintRecord) -> Self {
        Self {
            recipient_id: staff_id.to_string(),
            title: "New complaint auto-assigned".into(),
            message: format!(
                "You have been automatically assigned a {} complaint in {}. Due: {}.",
                complaint.kind,
                complaint.locality,
                complaint.sla_deadline.format("%Y-%m-%d %H:%M UTC")
            ),
            kind: NotificationKind::Assignment,
            complaint_id: Some(complaint.complaint_id.clone()),
        }
    }

    pub fn manual_assignment_staff(staff_id: &str, complaint: &ComplaintRecord) -> Self {
        Self {
            recipient_id: staff_id.to_string(),
            title: "New complaint assigned".into(),
            message: format!(
                "You have been assigned a {} complaint in {}. Due: {}.",
                complaint.kind,
                complaint.locality,
                complaint.sla_deadline.format("%Y-%m-%d %H:%M UTC")
            ),
            kind: NotificationKind::Assignment,
            complaint_id: Some(complaint.complaint_id.clone()),
        }
    }

    pub fn manual_assignment_citizen(complaint: &ComplaintRecord) -> Self {
        Self {
            recipient_id: complaint.citizen_id.clone(),
            title: "Complaint assigned".into(),
            message: format!(
                "Your complaint {} has been assigned to staff and is now in progress.",
                complaint.complaint_id
            ),
            kind: NotificationKind::Assignment,
            complaint_id: Some(complaint.complaint_id.clone()),
        }
    }

    /// Admin heads-up when no eligible staff could be found at intake.
    pub fn unassigned(admin_id: &str, complaint: &ComplaintRecord) -> Self {
        Self {
            recipient_id: admin_id.to_string(),
            title: "Complaint needs assignment".into(),
            message: format!(
                "Complaint {} ({}) in {} could not be auto-assigned and is waiting for manual assignment.",
                complaint.complaint_id, complaint.kind, complaint.locality
            ),
            kind: NotificationKind::Assignment,
            complaint_id: Some(complaint.complaint_id.clone()),
        }
    }

    pub fn status_change(complaint: &ComplaintRecord) -> Self {
        Self {
            recipient_id: complaint.citizen_id.clone(),
            title: "Complaint status updated".into(),
            message: format!(
                "Your complaint {} status has been changed to {}.",
                complaint.complaint_id, complaint.status
            ),
            kind: NotificationKind::StatusChange,
            complaint_id: Some(complaint.complaint_id.clone()),
        }
    }

    pub fn sla_breach_assignee(staff_id: &str, complaint: &ComplaintRecord) -> Self {
        Self {
            recipient_id: staff_id.to_string(),
            title: "SLA deadline breached".into(),
            message: format!(
                "Complaint {} is now overdue. Please resolve immediately.",
                complaint.complaint_id
            ),
            kind: NotificationKind::SlaBreach,
            complaint_id: Some(complaint.complaint_id.clone()),
        }
    }

    pub fn sla_breach_admin(admin_id: &str, complaint: &ComplaintRecord) -> Self {
        Self {
            recipient_id: admin_id.to_string(),
            title: "SLA breach in your locality".into(),
            message: format!(
                "Complaint {} in {} is overdue.",
                complaint.complaint_id, complaint.locality
            ),
            kind: NotificationKind::SlaBreach,
            complaint_id: Some(complaint.complaint_id.clone()),
        }
    }

    /// Sent to the supervisor an overdue complaint was re-routed to.
    pub fn escalation(admin_id: &str, complaint: &ComplaintRecord, new_level: i64) -> Self {
        Self {
            recipient_id: admin_id.to_string(),
            title: "Overdue complaint escalated".into(),
            message: format!(
                "Complaint {} is overdue and has been escalated to you (level {new_level}).",
                complaint.complaint_id
            ),
            kind: NotificationKind::Escalation,
            complaint_id: Some(complaint.complaint_id.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: i64,
    pub recipient_id: UserId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub complaint_id: Option<ComplaintId>,
    pub created_at: DateTime<Utc>,
}

/// Delivery seam. A failed notification must never abort the lifecycle
/// operation that produced it; callers log and continue.
pub trait Notifier: Send {
    fn notify(&self, note: NewNotification) -> DeskResult<()>;
}

/// Fire-and-forget delivery: a failure is logged and swallowed, never rolled
/// back into the mutation that triggered the notification.
pub fn deliver_or_log(notifier: &dyn Notifier, note: NewNotification) {
    if let Err(e) = notifier.notify(note) {
        log::warn!("notification delivery failed: {e}");
    }
}

/// Default sink: persists every notification through its own store handle,
/// timestamped by the engine's clock.
pub struct StoreNotifier {
    store: DeskStore,
    clock: Arc<dyn Clock>,
}

impl StoreNotifier {
    pub fn new(store: DeskStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl Notifier for StoreNotifier {
    fn notify(&self, note: NewNotification) -> DeskResult<()> {
        log::debug!(
            "notify {} -> {}: {}",
            note.kind.as_str(),
            note.recipient_id,
            note.title
        );
        self.store.insert_notification(&note, self.clock.now())?;
        Ok(())
    }
}
