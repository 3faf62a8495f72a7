//! Engine configuration with documented constants
//!
//! All tunable knobs are collected here with explanations of their purpose
//! and how they interact with each other. The engine never reads a global;
//! a `SimConfig` is passed explicitly into every operation that needs one.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{Result, SimError};

/// Configuration for the simulation engine
///
/// These values shape the economics and the operational limits of a run.
/// They are part of a run's identity: changing them between runs changes
/// results even under the same seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === CALENDAR ===
    /// Days per accounting month
    ///
    /// Month-end payroll settlement (tier bonus, profit share, commission
    /// threshold check) and the month-to-date tracker reset happen on the
    /// last day of each month. Rent is amortized over this many days.
    pub month_len_days: u32,

    // === LABOR ===
    /// Productive hours one staff member contributes per day
    ///
    /// Caps service-line throughput where a labor role is linked:
    /// derived capacity = headcount * hours / hours_per_order. Hours
    /// demanded beyond this capacity are paid at the role's overtime rate.
    pub hours_per_staff_per_day: f64,

    // === COMMAND LIMITS ===
    /// Maximum days a single simulate call may advance
    ///
    /// Simulate is all-or-nothing across the requested range, so this also
    /// bounds the size of the working copy a call may build up.
    pub max_simulate_days: u32,

    /// Maximum days a single rollback call may rewind
    pub max_rollback_days: u32,

    // === EVENTS ===
    /// Upper bound on retained event history records
    ///
    /// The active set is unbounded (it is naturally small); history is
    /// trimmed oldest-first beyond this count.
    pub event_history_cap: usize,

    // === CLOSURE SETTLEMENT ===
    /// Fraction of inventory book value recovered when a store closes
    pub inventory_salvage_rate: f64,

    /// Fraction of asset capex recovered when a store closes
    pub asset_salvage_rate: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            month_len_days: 30,
            hours_per_staff_per_day: 8.0,
            max_simulate_days: 3650,
            max_rollback_days: 3650,
            event_history_cap: 5000,
            inventory_salvage_rate: 0.30,
            asset_salvage_rate: 0.10,
        }
    }
}

impl SimConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SimConfig = toml::from_str(&content)
            .map_err(|e| SimError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate().map_err(SimError::Config)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.month_len_days == 0 {
            return Err("month_len_days must be at least 1".into());
        }
        if self.hours_per_staff_per_day <= 0.0 {
            return Err(format!(
                "hours_per_staff_per_day ({}) must be positive",
                self.hours_per_staff_per_day
            ));
        }
        if self.max_simulate_days == 0 || self.max_rollback_days == 0 {
            return Err("simulate/rollback limits must be at least 1 day".into());
        }
        if !(0.0..=1.0).contains(&self.inventory_salvage_rate)
            || !(0.0..=1.0).contains(&self.asset_salvage_rate)
        {
            return Err(format!(
                "salvage rates must be within 0..=1 (inventory {}, asset {})",
                self.inventory_salvage_rate, self.asset_salvage_rate
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_month() {
        let config = SimConfig {
            month_len_days: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_salvage_above_one() {
        let config = SimConfig {
            asset_salvage_rate: 1.2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SimConfig = toml::from_str("month_len_days = 28").unwrap();
        assert_eq!(config.month_len_days, 28);
        assert_eq!(config.max_simulate_days, 3650);
        assert!((config.hours_per_staff_per_day - 8.0).abs() < 1e-9);
    }
}
