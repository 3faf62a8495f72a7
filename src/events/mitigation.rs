//! Standing mitigation posture
//!
//! Mitigations are not reactions to specific events; they are standing
//! store-level switches evaluated every day after event combination, in a
//! fixed order: emergency power, then promo boost, then overtime
//! capacity. Each application costs its daily fee and leaves a structured
//! action record on the ledger.

use serde::{Deserialize, Serialize};

use crate::core::types::Money;
use crate::events::engine::EventEffects;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MitigationKind {
    EmergencyPower,
    PromoBoost,
    OvertimeCapacity,
}

impl MitigationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MitigationKind::EmergencyPower => "emergency_power",
            MitigationKind::PromoBoost => "promo_boost",
            MitigationKind::OvertimeCapacity => "overtime_capacity",
        }
    }
}

/// Ledger record for one mitigation applied on one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MitigationAction {
    pub action: MitigationKind,
    pub cost: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MitigationConfig {
    /// Lifts a closure and floors the capacity multiplier, at a premium
    /// on variable cost.
    pub use_emergency_power: bool,
    pub emergency_capacity_multiplier: f64,
    pub emergency_variable_cost_multiplier: f64,
    pub emergency_daily_cost: Money,

    /// Counteracts depressed traffic or conversion.
    pub use_promo_boost: bool,
    pub promo_traffic_boost: f64,
    pub promo_conversion_boost: f64,
    pub promo_daily_cost: Money,

    /// Counteracts depressed capacity.
    pub use_overtime_capacity: bool,
    pub overtime_capacity_boost: f64,
    pub overtime_daily_cost: Money,
}

impl Default for MitigationConfig {
    fn default() -> Self {
        Self {
            use_emergency_power: false,
            emergency_capacity_multiplier: 0.60,
            emergency_variable_cost_multiplier: 1.15,
            emergency_daily_cost: 120.0,
            use_promo_boost: false,
            promo_traffic_boost: 1.05,
            promo_conversion_boost: 1.08,
            promo_daily_cost: 80.0,
            use_overtime_capacity: false,
            overtime_capacity_boost: 1.20,
            overtime_daily_cost: 100.0,
        }
    }
}

impl MitigationConfig {
    /// Apply enabled mitigations to the day's combined effects. Returns
    /// the total daily cost and the action records. The caller applies
    /// the final clamps afterwards.
    pub fn apply(&self, effects: &mut EventEffects) -> (Money, Vec<MitigationAction>) {
        let mut cost_total = 0.0;
        let mut actions = Vec::new();

        if effects.closed && self.use_emergency_power {
            effects.closed = false;
            effects.capacity = effects.capacity.max(self.emergency_capacity_multiplier);
            effects.variable_cost *= self.emergency_variable_cost_multiplier.max(0.0);
            let cost = self.emergency_daily_cost.max(0.0);
            cost_total += cost;
            actions.push(MitigationAction {
                action: MitigationKind::EmergencyPower,
                cost,
            });
        }

        if (effects.traffic < 1.0 || effects.conversion < 1.0) && self.use_promo_boost {
            effects.traffic *= self.promo_traffic_boost.max(0.0);
            effects.conversion *= self.promo_conversion_boost.max(0.0);
            let cost = self.promo_daily_cost.max(0.0);
            cost_total += cost;
            actions.push(MitigationAction {
                action: MitigationKind::PromoBoost,
                cost,
            });
        }

        if effects.capacity < 1.0 && self.use_overtime_capacity {
            effects.capacity *= self.overtime_capacity_boost.max(0.0);
            let cost = self.overtime_daily_cost.max(0.0);
            cost_total += cost;
            actions.push(MitigationAction {
                action: MitigationKind::OvertimeCapacity,
                cost,
            });
        }

        (cost_total, actions)
    }
}
