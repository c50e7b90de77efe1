//! Staff directory records: municipal workers and locality admins.
//!
//! Only approved, active staff in the right department are eligible for
//! auto-assignment. Admins are approved on registration; staff wait for an
//! admin to approve them.

use crate::types::{Locality, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    Roads,
    Water,
    Garbage,
    Electricity,
    General,
}

impl Department {
    pub const ALL: [Department; 5] = [
        Self::Roads,
        Self::Water,
        Self::Garbage,
        Self::Electricity,
        Self::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Roads => "Roads",
            Self::Water => "Water",
            Self::Garbage => "Garbage",
            Self::Electricity => "Electricity",
            Self::General => "General",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Roads" => Some(Self::Roads),
            "Water" => Some(Self::Water),
            "Garbage" => Some(Self::Garbage),
            "Electricity" => Some(Self::Electricity),
            "General" => Some(Self::General),
            _ => None,
        }
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaffRole {
    Staff,
    Admin,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => "Staff",
            Self::Admin => "Admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Staff" => Some(Self::Staff),
            "Admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Registration payload for the staff directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStaff {
    pub staff_id: UserId,
    pub name: String,
    pub role: StaffRole,
    pub department: Option<Department>,
    pub locality: Locality,
}

impl NewStaff {
    pub fn validate(&self) -> Result<(), String> {
        if self.staff_id.trim().is_empty() {
            return Err("staff id is required".into());
        }
        if self.name.trim().is_empty() {
            return Err("name is required".into());
        }
        if self.locality.trim().is_empty() {
            return Err("locality is required".into());
        }
        if self.role == StaffRole::Staff && self.department.is_none() {
            return Err("department is required for staff".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffRecord {
    pub staff_id: UserId,
    pub name: String,
    pub role: StaffRole,
    pub department: Option<Department>,
    pub locality: Locality,
    pub is_approved: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl StaffRecord {
    /// Whether auto-assignment may hand this member new work.
    pub fn is_assignable(&self) -> bool {
        self.role == StaffRole::Staff && self.is_approved && self.is_active
    }
}
