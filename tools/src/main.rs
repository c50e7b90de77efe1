//! desk-runner: headless replay driver for the complaint desk.
//!
//! Seeds a synthetic town (staff roster plus a pool of citizens), replays a
//! few weeks of complaint traffic against a manually warped clock, and runs
//! the SLA sweep at its configured cadence. Prints a run summary, or the
//! full metrics as JSON with `--json`.
//!
//! Usage:
//!   desk-runner --seed 42 --days 14
//!   desk-runner --seed 7 --days 30 --db desk.db --config engine.json --json

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use civicdesk_core::clock::FixedClock;
use civicdesk_core::complaint::{ComplaintStatus, ComplaintType, NewComplaint};
use civicdesk_core::config::EngineConfig;
use civicdesk_core::engine::DeskEngine;
use civicdesk_core::notifier::StoreNotifier;
use civicdesk_core::staff::{Department, StaffRecord, StaffRole};
use civicdesk_core::store::DeskStore;
use rand::prelude::*;
use rand_pcg::Pcg64;
use std::env;
use std::sync::Arc;

const LOCALITIES: [&str; 3] = ["Riverside", "Hillview", "Milltown"];

const STREETS: [&str; 6] = [
    "Market Road",
    "Canal Street",
    "Temple Street",
    "Station Road",
    "Mill Lane",
    "Harbour Way",
];

const STAFF_NAMES: [&str; 12] = [
    "Anita Rao",
    "Bharat Iyer",
    "Chitra Nair",
    "Deven Shah",
    "Esha Kulkarni",
    "Farid Khan",
    "Gita Menon",
    "Harish Pillai",
    "Indira Joshi",
    "Kiran Reddy",
    "Lata Verma",
    "Mohan Das",
];

const ADMIN_NAMES: [&str; 3] = ["Meera Srinivasan", "Nikhil Bose", "Priya Chandran"];

const NOTE_PHRASES: [&str; 5] = [
    "crew dispatched",
    "parts on order",
    "site inspected, work scheduled",
    "waiting on contractor availability",
    "work done, pending confirmation",
];

/// Chance a new complaint arrives in any simulated hour.
const ARRIVAL_PROB: f64 = 0.3;
/// Chance an assigned, active complaint gets resolved in any simulated hour.
const RESOLVE_PROB: f64 = 0.012;
/// Chance per hour that an admin hand-assigns a stuck OPEN complaint.
const MANUAL_ASSIGN_PROB: f64 = 0.05;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let days = parse_arg(&args, "--days", 14u64);
    let json_out = args.iter().any(|a| a == "--json");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());

    let config = match config_path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    if !json_out {
        println!("CivicDesk desk-runner v{}", env!("CARGO_PKG_VERSION"));
        println!("  seed:    {seed}");
        println!("  days:    {days}");
        println!("  db:      {db}");
        println!("  config:  {}", config_path.unwrap_or("(defaults)"));
        println!();
    }

    let store = if db == ":memory:" {
        DeskStore::in_memory()?
    } else {
        DeskStore::open(db)?
    };
    store.migrate()?;

    let start = Utc
        .with_ymd_and_hms(2025, 1, 6, 8, 0, 0)
        .single()
        .ok_or_else(|| anyhow::anyhow!("invalid replay start timestamp"))?;
    let mut rng = Pcg64::seed_from_u64(seed);

    let roster = build_roster(&mut rng, start);
    for member in &roster {
        store.upsert_staff(member)?;
    }
    log::info!(
        "seeded {} staff across {} localities",
        roster.len(),
        LOCALITIES.len()
    );

    let clock = Arc::new(FixedClock::new(start));
    let notifier = Box::new(StoreNotifier::new(store.reopen()?, clock.clone()));
    let engine = DeskEngine::new(store, clock.clone(), notifier, config.clone());

    let field_staff: Vec<&StaffRecord> = roster
        .iter()
        .filter(|s| s.role == StaffRole::Staff)
        .collect();
    let sweep_every_hours = (config.sweep_interval_secs / 3600).max(1);

    let mut breaches_total = 0i64;
    let mut escalations_total = 0i64;
    let mut sweeps_run = 0u64;

    for hour in 0..days * 24 {
        clock.advance(Duration::hours(1));

        if rng.gen_bool(ARRIVAL_PROB) {
            engine.submit_complaint(random_submission(&mut rng))?;
        }

        // Staff work their queues; stuck OPEN complaints occasionally get
        // hand-assigned by an admin.
        for c in engine.recent_complaints(500)? {
            if !c.status.is_active() {
                continue;
            }
            match c.assigned_to.as_deref() {
                Some(author) if rng.gen_bool(RESOLVE_PROB) => {
                    if rng.gen_bool(0.4) {
                        engine.add_note(&c.complaint_id, author, pick(&NOTE_PHRASES, &mut rng))?;
                    }
                    engine.transition_status(&c.complaint_id, ComplaintStatus::Resolved)?;
                }
                None if !field_staff.is_empty() && rng.gen_bool(MANUAL_ASSIGN_PROB) => {
                    let target = field_staff[rng.gen_range(0..field_staff.len())];
                    engine.assign_manual(&c.complaint_id, &target.staff_id)?;
                }
                _ => {}
            }
        }

        if hour % sweep_every_hours == sweep_every_hours - 1 {
            let report = engine.run_sweep()?;
            breaches_total += report.breaches_found;
            escalations_total += report.escalated;
            sweeps_run += 1;
        }
    }

    if json_out {
        let payload = serde_json::json!({
            "dashboard": engine.dashboard()?,
            "metrics": engine.metrics_snapshot()?,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    print_summary(
        &engine,
        days,
        sweeps_run,
        breaches_total,
        escalations_total,
        roster.len(),
    )
}

/// One admin per locality, and field staff with deliberate department gaps
/// so the fallback and manual-assignment paths see real traffic.
fn build_roster(rng: &mut Pcg64, start: DateTime<Utc>) -> Vec<StaffRecord> {
    let mut roster = Vec::new();
    let mut n = 0usize;

    for (i, locality) in LOCALITIES.iter().enumerate() {
        roster.push(StaffRecord {
            staff_id: format!("A-{:03}", 100 + i),
            name: ADMIN_NAMES[i].to_string(),
            role: StaffRole::Admin,
            department: None,
            locality: locality.to_string(),
            is_approved: true,
            is_active: true,
            created_at: start,
        });

        for department in Department::ALL {
            if !rng.gen_bool(0.6) {
                continue;
            }
            roster.push(StaffRecord {
                staff_id: format!("S-{:03}", 200 + n),
                name: STAFF_NAMES[n % STAFF_NAMES.len()].to_string(),
                role: StaffRole::Staff,
                department: Some(department),
                locality: locality.to_string(),
                is_approved: true,
                is_active: true,
                created_at: start,
            });
            n += 1;
        }
    }
    roster
}

fn random_submission(rng: &mut Pcg64) -> NewComplaint {
    let kind = ComplaintType::ALL[rng.gen_range(0..ComplaintType::ALL.len())];
    NewComplaint {
        citizen_id: format!("CIT-{:03}", rng.gen_range(1..=60)),
        kind,
        description: describe(kind, rng).to_string(),
        address: format!("{} {}", rng.gen_range(1..180), pick(&STREETS, rng)),
        locality: pick(&LOCALITIES, rng).to_string(),
        ward: if rng.gen_bool(0.5) {
            Some(format!("Ward {}", rng.gen_range(1..=5)))
        } else {
            None
        },
    }
}

fn describe(kind: ComplaintType, rng: &mut Pcg64) -> &'static str {
    let options: &[&'static str] = match kind {
        ComplaintType::RoadDamage => &[
            "deep pothole near the junction",
            "road surface collapsed after the rain",
            "broken kerb, debris on the carriageway",
        ],
        ComplaintType::WaterLeakage => &[
            "main leaking under the footpath",
            "burst pipe flooding the lane",
            "continuous leak at the meter",
        ],
        ComplaintType::Garbage => &[
            "collection missed two days running",
            "overflowing bins at the corner",
            "illegal dumping behind the market",
        ],
        ComplaintType::Electricity => &[
            "street light out for a week",
            "exposed wiring on the pole",
            "repeated outages every evening",
        ],
        ComplaintType::Sewage => &[
            "drain backing up into the street",
            "manhole cover displaced",
            "foul smell from the culvert",
        ],
        ComplaintType::Other => &[
            "stray cattle blocking the lane",
            "park gate broken",
            "encroachment on the footpath",
        ],
    };
    pick(options, rng)
}

fn pick<'a>(options: &'a [&'static str], rng: &mut Pcg64) -> &'static str {
    options[rng.gen_range(0..options.len())]
}

fn print_summary(
    engine: &DeskEngine,
    days: u64,
    sweeps_run: u64,
    breaches_total: i64,
    escalations_total: i64,
    roster_size: usize,
) -> Result<()> {
    let dash = engine.dashboard()?;
    let snap = engine.metrics_snapshot()?;

    println!("=== RUN SUMMARY ===");
    println!("  days simulated:  {days}");
    println!("  sweeps run:      {sweeps_run}");
    println!("  staff roster:    {roster_size} ({} field staff)", dash.total_staff);
    println!("  complaints:      {}", dash.total_complaints);
    println!("  resolved:        {}", dash.resolved_complaints);
    println!("  pending:         {}", dash.pending_complaints);
    println!("  breaches found:  {breaches_total}");
    println!("  escalations:     {escalations_total}");

    println!();
    println!("=== BY TYPE ===");
    for g in &snap.by_type {
        println!(
            "  {:<14} total {:>3} | resolved {:>3} | overdue {:>3} | avg {}",
            g.key,
            g.total,
            g.resolved,
            g.overdue,
            fmt_hours(g.avg_resolution_hours)
        );
    }

    println!();
    println!("=== BY LOCALITY ===");
    for g in &snap.by_locality {
        println!(
            "  {:<14} total {:>3} | resolved {:>3} | overdue {:>3} | avg {}",
            g.key,
            g.total,
            g.resolved,
            g.overdue,
            fmt_hours(g.avg_resolution_hours)
        );
    }

    println!();
    println!("=== MONTHLY TREND ===");
    for m in &dash.monthly_trend {
        println!("  {}  {}", m.month, m.count);
    }
    Ok(())
}

fn fmt_hours(hours: Option<f64>) -> String {
    match hours {
        Some(h) => format!("{h:.1}h"),
        None => "-".to_string(),
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
