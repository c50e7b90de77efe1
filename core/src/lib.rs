//! Complaint lifecycle & SLA enforcement engine.
//!
//! Citizens file complaints; the engine triages them (priority and SLA
//! deadline from the complaint type), routes each one to the least-busy
//! eligible staff member, and a periodic sweep flags deadline breaches,
//! escalates overdue work to locality admins, and derives performance
//! metrics from the complaint history.
//!
//! Layering:
//!   - `store` owns all SQL; nothing else touches the database.
//!   - `triage`, `assignment`, `breach`, `escalation`, `metrics` hold the
//!     decision logic, one step per module.
//!   - `engine` is the facade callers use; `scheduler` drives the sweep.

pub mod assignment;
pub mod breach;
pub mod clock;
pub mod complaint;
pub mod config;
pub mod engine;
pub mod error;
pub mod escalation;
pub mod metrics;
pub mod notifier;
pub mod scheduler;
pub mod staff;
pub mod store;
pub mod triage;
pub mod types;
