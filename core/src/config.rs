//! Engine configuration: the scheduler's cadence knobs.
//!
//! RULE: Business rules stay out of here. The priority table, SLA day
//! table, department routing, fallback pool cap, and escalation ceiling
//! are consts in their own modules.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seconds between sweeps. The reference policy is hourly.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// A metrics snapshot rides along on every n-th sweep; 0 disables the
    /// cadence (snapshots stay available on demand).
    #[serde(default = "default_metrics_every_sweeps")]
    pub metrics_every_sweeps: u64,
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

fn default_metrics_every_sweeps() -> u64 {
    6
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            metrics_every_sweeps: default_metrics_every_sweeps(),
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file; missing fields fall back to the defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}
