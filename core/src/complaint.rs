//! Complaint record, enumerations, and the status state machine.
//!
//! RULE: `status` only moves forward (OPEN → IN_PROGRESS → RESOLVED →
//! CLOSED, with forward skips allowed). Nothing in the engine transitions a
//! complaint backward, and nothing auto-transitions into CLOSED.

use crate::types::{ComplaintId, Locality, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest accepted complaint description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplaintType {
    RoadDamage,
    WaterLeakage,
    Garbage,
    Electricity,
    Sewage,
    Other,
}

impl ComplaintType {
    pub const ALL: [ComplaintType; 6] = [
        Self::RoadDamage,
        Self::WaterLeakage,
        Self::Garbage,
        Self::Electricity,
        Self::Sewage,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoadDamage => "RoadDamage",
            Self::WaterLeakage => "WaterLeakage",
            Self::Garbage => "Garbage",
            Self::Electricity => "Electricity",
            Self::Sewage => "Sewage",
            Self::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RoadDamage" => Some(Self::RoadDamage),
            "WaterLeakage" => Some(Self::WaterLeakage),
            "Garbage" => Some(Self::Garbage),
            "Electricity" => Some(Self::Electricity),
            "Sewage" => Some(Self::Sewage),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for ComplaintType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Urgent => "URGENT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            "URGENT" => Some(Self::Urgent),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(Self::Open),
            "IN_PROGRESS" => Some(Self::InProgress),
            "RESOLVED" => Some(Self::Resolved),
            "CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Overdue-eligible: still subject to breach detection and escalation.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }

    /// RESOLVED and CLOSED complaints are frozen for the engine.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Open => 0,
            Self::InProgress => 1,
            Self::Resolved => 2,
            Self::Closed => 3,
        }
    }

    /// Forward moves only. CLOSED is reachable directly from any earlier
    /// state (administrative terminal); nothing moves backward.
    pub fn can_transition_to(&self, next: ComplaintStatus) -> bool {
        next.rank() > self.rank()
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A citizen submission before the engine has stamped identity, priority,
/// and deadline onto it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComplaint {
    pub citizen_id: UserId,
    pub kind: ComplaintType,
    pub description: String,
    pub address: String,
    pub locality: Locality,
    pub ward: Option<String>,
}

impl NewComplaint {
    pub fn validate(&self) -> Result<(), String> {
        if self.description.trim().is_empty() {
            return Err("description is required".into());
        }
        // Character count, not byte length: multibyte text must get the
        // full 500 characters.
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(format!(
                "description cannot be more than {MAX_DESCRIPTION_LEN} characters"
            ));
        }
        if self.address.trim().is_empty() {
            return Err("location address is required".into());
        }
        if self.locality.trim().is_empty() {
            return Err("locality is required".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub complaint_id: ComplaintId,
    pub citizen_id: UserId,
    pub kind: ComplaintType,
    pub description: String,
    pub address: String,
    pub locality: Locality,
    pub ward: Option<String>,
    pub status: ComplaintStatus,
    pub priority: Priority,
    pub assigned_to: Option<UserId>,
    pub sla_deadline: DateTime<Utc>,
    pub is_overdue: bool,
    pub escalation_level: i64,
    pub time_to_assign: Option<f64>,
    pub time_to_resolve: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Staff note appended to a complaint (author, text, timestamp).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: i64,
    pub complaint_id: ComplaintId,
    pub author_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Elapsed hours between two instants, rounded to 2 decimals. This is the
/// unit `time_to_assign` and `time_to_resolve` are recorded in.
pub fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let hours = (end - start).num_seconds() as f64 / 3600.0;
    (hours * 100.0).round() / 100.0
}
