//! What-if scenario comparison.
//!
//! A [`Scenario`] is a named bundle of field-level patches applied to copies
//! of a baseline state. [`compare_scenarios`] runs the baseline and every
//! scenario over the same horizon from the same RNG position, reduces each
//! run to [`ScenarioMetrics`], and reports per-scenario deltas against the
//! baseline. The input state is never mutated; every branch owns a deep
//! copy, so metric differences are attributable to the patches alone.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::config::SimConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{Day, Money, StationId, StoreId};
use crate::engine::simulate_day;
use crate::sim::ledger::DayResult;
use crate::sim::state::SimState;

/// Field overrides for one station. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationPatch {
    pub fuel_vehicles_per_day: Option<u32>,
    pub visitor_vehicles_per_day: Option<u32>,
    pub traffic_volatility: Option<f64>,
}

/// Field overrides for one store. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorePatch {
    pub traffic_conversion_rate: Option<f64>,
    pub local_competition_intensity: Option<f64>,
    pub attractiveness_index: Option<f64>,
    pub fixed_overhead_per_day: Option<Money>,
}

/// A named what-if branch: patches keyed by the station/store they target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: String,
    pub stations: BTreeMap<StationId, StationPatch>,
    pub stores: BTreeMap<StoreId, StorePatch>,
}

/// Aggregate outcome of one branch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    pub days: u32,
    pub end_day: Day,
    pub end_cash: Money,
    pub total_revenue: Money,
    pub total_operating_profit: Money,
    pub total_net_cashflow: Money,
    pub avg_daily_orders: f64,
    pub open_store_count: usize,
}

impl ScenarioMetrics {
    fn from_run(state: &SimState, results: &[DayResult]) -> Self {
        let days = results.len() as u32;
        let total_orders: u64 = results
            .iter()
            .flat_map(|r| r.store_results.iter())
            .map(|s| u64::from(s.total_orders()))
            .sum();
        let avg_daily_orders = if days == 0 {
            0.0
        } else {
            total_orders as f64 / f64::from(days)
        };
        ScenarioMetrics {
            days,
            end_day: state.day.saturating_sub(1),
            end_cash: state.cash,
            total_revenue: results.iter().map(|r| r.total_revenue).sum(),
            total_operating_profit: results.iter().map(|r| r.total_operating_profit).sum(),
            total_net_cashflow: results.iter().map(|r| r.total_net_cashflow).sum(),
            avg_daily_orders,
            open_store_count: state.open_store_count(),
        }
    }

    /// Headline figures of this run minus the baseline's.
    pub fn delta_from(&self, baseline: &ScenarioMetrics) -> MetricsDelta {
        MetricsDelta {
            end_cash: self.end_cash - baseline.end_cash,
            total_revenue: self.total_revenue - baseline.total_revenue,
            total_operating_profit: self.total_operating_profit - baseline.total_operating_profit,
            total_net_cashflow: self.total_net_cashflow - baseline.total_net_cashflow,
        }
    }
}

/// Scenario-minus-baseline differences for the headline figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsDelta {
    pub end_cash: Money,
    pub total_revenue: Money,
    pub total_operating_profit: Money,
    pub total_net_cashflow: Money,
}

/// One scenario's result. A failed branch carries its error here instead of
/// aborting the siblings or the baseline.
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub name: String,
    pub result: Result<(ScenarioMetrics, MetricsDelta)>,
}

/// Baseline metrics plus every scenario's outcome, in input order.
#[derive(Debug)]
pub struct ScenarioComparison {
    pub baseline: ScenarioMetrics,
    pub outcomes: Vec<ScenarioOutcome>,
}

/// Run the baseline and each scenario for `days` days and compare.
///
/// Every branch starts from a clone of `state`. With `seed` unset, branches
/// resume the state's captured RNG position; with `seed` set, every branch
/// is re-seeded identically. Scenario branches run in parallel under rayon;
/// each is fallible on its own.
pub fn compare_scenarios(
    state: &SimState,
    config: &SimConfig,
    days: u32,
    seed: Option<u64>,
    scenarios: &[Scenario],
) -> Result<ScenarioComparison> {
    if days == 0 || days > config.max_simulate_days {
        return Err(SimError::DaysOutOfRange {
            days,
            max: config.max_simulate_days,
        });
    }
    let baseline = run_branch(state, config, days, seed, None)?;
    let outcomes: Vec<ScenarioOutcome> = scenarios
        .par_iter()
        .map(|scenario| {
            let result = run_branch(state, config, days, seed, Some(scenario)).map(|metrics| {
                let delta = metrics.delta_from(&baseline);
                (metrics, delta)
            });
            ScenarioOutcome {
                name: scenario.name.clone(),
                result,
            }
        })
        .collect();
    Ok(ScenarioComparison { baseline, outcomes })
}

fn run_branch(
    base: &SimState,
    config: &SimConfig,
    days: u32,
    seed: Option<u64>,
    scenario: Option<&Scenario>,
) -> Result<ScenarioMetrics> {
    let mut branch = base.clone();
    if let Some(seed) = seed {
        branch.set_seed(seed);
    }
    if let Some(scenario) = scenario {
        apply_patches(&mut branch, scenario)?;
    }
    let mut results = Vec::with_capacity(days as usize);
    for _ in 0..days {
        results.push(simulate_day(&mut branch, config)?);
    }
    Ok(ScenarioMetrics::from_run(&branch, &results))
}

fn apply_patches(state: &mut SimState, scenario: &Scenario) -> Result<()> {
    for (id, patch) in &scenario.stations {
        let station = state
            .stations
            .get_mut(id)
            .ok_or_else(|| SimError::UnknownStation(id.0.clone()))?;
        if let Some(v) = patch.fuel_vehicles_per_day {
            station.fuel_vehicles_per_day = v;
        }
        if let Some(v) = patch.visitor_vehicles_per_day {
            station.visitor_vehicles_per_day = v;
        }
        if let Some(v) = patch.traffic_volatility {
            station.traffic_volatility = v;
        }
    }
    for (id, patch) in &scenario.stores {
        let store = state
            .stores
            .get_mut(id)
            .ok_or_else(|| SimError::UnknownStore(id.0.clone()))?;
        if let Some(v) = patch.traffic_conversion_rate {
            store.traffic_conversion_rate = v;
        }
        if let Some(v) = patch.local_competition_intensity {
            store.local_competition_intensity = v;
        }
        if let Some(v) = patch.attractiveness_index {
            store.attractiveness_index = v;
        }
        if let Some(v) = patch.fixed_overhead_per_day {
            store.fixed_overhead_per_day = v;
        }
    }
    Ok(())
}
