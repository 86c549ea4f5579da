use serde::{Deserialize, Serialize};

/// Tunables for reconciliation, shipped inside the definitions file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Observations closer together than this are ignored.
    pub min_update_seconds: f64,
    /// Remaining time below this ends the reconciliation loop.
    pub min_step_seconds: f64,
    /// Energy recovered per second before upgrades.
    pub base_recovery_rate: f64,
    /// Maximum energy granted per level of the energy skill.
    pub energy_per_level: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_update_seconds: 1.0,
            min_step_seconds: 1e-5,
            base_recovery_rate: 0.2,
            energy_per_level: 1.0,
        }
    }
}
