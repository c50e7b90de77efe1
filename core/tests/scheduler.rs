//! Scheduler and configuration tests: the background sweep thread and the
//! JSON config file it takes its cadence from.

use chrono::{TimeZone, Utc};
use civicdesk_core::clock::FixedClock;
use civicdesk_core::config::EngineConfig;
use civicdesk_core::engine::DeskEngine;
use civicdesk_core::notifier::StoreNotifier;
use civicdesk_core::scheduler::SweepScheduler;
use civicdesk_core::store::DeskStore;
use std::sync::Arc;

fn engine_with_interval(secs: u64) -> (DeskEngine, DeskStore) {
    let store = DeskStore::in_memory().unwrap();
    store.migrate().unwrap();
    let assertions = store.reopen().unwrap();
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
    ));
    let notifier = Box::new(StoreNotifier::new(store.reopen().unwrap(), clock.clone()));
    let config = EngineConfig {
        sweep_interval_secs: secs,
        metrics_every_sweeps: 0,
    };
    (DeskEngine::new(store, clock, notifier, config), assertions)
}

/// On a one-second interval the background thread gets at least one sweep
/// into the ledger within 2.5 seconds, and sweeps stop once told to.
#[test]
fn scheduler_sweeps_on_its_interval() {
    let (engine, assertions) = engine_with_interval(1);
    let scheduler = SweepScheduler::start(engine);
    std::thread::sleep(std::time::Duration::from_millis(2500));
    scheduler.stop();

    let swept = assertions.sweep_count().unwrap();
    assert!(swept >= 1, "expected at least one sweep after 2.5s, got {swept}");

    std::thread::sleep(std::time::Duration::from_millis(1200));
    assert_eq!(assertions.sweep_count().unwrap(), swept, "no sweeps after stop");
}

/// Stopping before the first interval elapses runs no sweep at all and
/// does not block on the full hour.
#[test]
fn stop_before_first_interval_runs_no_sweep() {
    let (engine, assertions) = engine_with_interval(3600);
    let scheduler = SweepScheduler::start(engine);
    scheduler.stop();

    assert_eq!(assertions.sweep_count().unwrap(), 0);
}

/// Missing config fields fall back to the defaults: hourly sweeps, metrics
/// every sixth sweep.
#[test]
fn config_defaults_fill_missing_fields() {
    let path = std::env::temp_dir().join("civicdesk_config_partial.json");
    std::fs::write(&path, r#"{ "sweep_interval_secs": 120 }"#).unwrap();

    let config = EngineConfig::load(path.to_str().unwrap()).unwrap();
    assert_eq!(config.sweep_interval_secs, 120);
    assert_eq!(config.metrics_every_sweeps, 6);
    assert_eq!(config.sweep_interval(), std::time::Duration::from_secs(120));

    let empty = std::env::temp_dir().join("civicdesk_config_empty.json");
    std::fs::write(&empty, "{}").unwrap();
    let config = EngineConfig::load(empty.to_str().unwrap()).unwrap();
    assert_eq!(config.sweep_interval_secs, 3600);
}

/// A missing config file is a readable error, not a silent default.
#[test]
fn config_load_reports_missing_file() {
    let err = EngineConfig::load("/no/such/path/config.json").unwrap_err();
    assert!(err.to_string().contains("Cannot read"), "got: {err}");
}
