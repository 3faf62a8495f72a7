//! Break-even order quantity.
//!
//! Rough daily BEQ per store: the order count at which blended unit
//! contribution covers the day's fixed bill. Fixed cost counts payroll
//! base plus employer burden, that day's depreciation, and the fixed
//! overhead; rent and utilities scale with activity and stay out of this
//! cut. Per-line figures assume that line alone carries the fixed cost.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::chain::store::Store;
use crate::core::types::{Day, Money, ServiceId, StoreId};

/// Break-even figures for one store on a given day.
#[derive(Debug, Clone, Serialize)]
pub struct BreakevenReport {
    pub store_id: StoreId,
    pub store_name: String,
    pub day: Day,
    pub fixed_cost_per_day: Money,
    /// Orders per day at the blended contribution, `None` when no line
    /// contributes positively.
    pub store_beq: Option<f64>,
    /// BEQ per line with positive contribution.
    pub per_service_beq: BTreeMap<ServiceId, f64>,
}

pub fn breakeven_for_store(store: &Store, day: Day) -> BreakevenReport {
    let day_depreciation: Money = store.assets.iter().map(|a| a.depreciation_on(day)).sum();
    let fixed = fixed_cost_per_day(store, day_depreciation);

    let mut per_service_beq = BTreeMap::new();
    let mut contributions = Vec::new();
    for (id, line) in &store.service_lines {
        let contribution = line.unit_contribution();
        if contribution > 0.0 {
            per_service_beq.insert(id.clone(), fixed / contribution);
            contributions.push(contribution);
        }
    }

    let store_beq = if contributions.is_empty() {
        None
    } else {
        let blended = contributions.iter().sum::<Money>() / contributions.len() as Money;
        (blended > 0.0).then(|| fixed / blended)
    };

    BreakevenReport {
        store_id: store.id.clone(),
        store_name: store.name.clone(),
        day,
        fixed_cost_per_day: fixed,
        store_beq,
        per_service_beq,
    }
}

fn fixed_cost_per_day(store: &Store, day_depreciation: Money) -> Money {
    let payroll: Money = store
        .payroll
        .values()
        .map(|plan| plan.fixed_pay_per_day() + plan.employer_burden_per_day())
        .sum();
    payroll + day_depreciation + store.fixed_overhead_per_day
}
