//! Demand allocation and order fulfillment
//!
//! Demand flows from station traffic through per-line conversion rates,
//! the store-wide conversion rate, and the competitive capture factor.
//! Each vehicle buys at most one service, so when summed raw demand
//! exceeds total traffic every line scales down proportionally. Realized
//! orders are then bounded by effective capacity and, where a line draws
//! on a consumable, by stock on hand (partial fulfillment, never a full
//! rejection). Lines with a project mix resolve each order into a
//! catalog project with one weighted pick per order.

use std::collections::BTreeMap;

use crate::chain::service::{ServiceLine, ServiceProject};
use crate::chain::store::Store;
use crate::core::config::SimConfig;
use crate::core::rng::RngStream;
use crate::core::types::{Money, ProjectId, ServiceId};
use crate::engine::traffic::{competition_factor, DayTraffic};

/// Orders realized per line, with the consumable cost already charged
/// against stock.
#[derive(Debug, Clone, Default)]
pub struct OrderAllocation {
    pub orders_by_service: BTreeMap<ServiceId, u32>,
    pub consumable_cogs_by_service: BTreeMap<ServiceId, Money>,
}

impl OrderAllocation {
    pub fn consumable_cogs_total(&self) -> Money {
        self.consumable_cogs_by_service.values().sum()
    }
}

/// Capacity after labor limits and the day's capacity multiplier. A line
/// with a linked labor role is limited by that role's staffed hours; a
/// role with no headcount serves nothing.
pub fn effective_capacity(
    store: &Store,
    line: &ServiceLine,
    config: &SimConfig,
    capacity_multiplier: f64,
) -> u32 {
    let cap = line.capacity_per_day;
    let bound = match &line.labor_role {
        Some(role) if line.labor_hours_per_order > 0.0 => {
            let headcount = store.payroll.get(role).map(|p| p.headcount).unwrap_or(0);
            if headcount == 0 {
                return 0;
            }
            let hours = headcount as f64 * config.hours_per_staff_per_day;
            let derived = (hours / line.labor_hours_per_order).floor() as u32;
            cap.min(derived)
        }
        _ => cap,
    };
    (bound as f64 * capacity_multiplier.max(0.0)).round().max(0.0) as u32
}

fn consume_consumable(store: &mut Store, service: &ServiceId, desired: u32) -> (u32, Money) {
    if desired == 0 {
        return (0, 0.0);
    }
    let line = &store.service_lines[service];
    let (sku, units) = match (&line.consumable_sku, line.consumable_units_per_order) {
        (Some(sku), units) if units > 0.0 => (sku.clone(), units),
        _ => return (desired, 0.0),
    };
    let Some(item) = store.inventory.get_mut(&sku) else {
        return (0, 0.0);
    };
    if item.qty <= 0.0 {
        return (0, 0.0);
    }
    let need = desired as f64 * units;
    if need <= item.qty {
        item.qty -= need;
        return (desired, need * item.unit_cost);
    }
    let feasible = (item.qty / units).floor() as u32;
    let used = feasible as f64 * units;
    item.qty -= used;
    (feasible, used * item.unit_cost)
}

/// Allocate the day's demand across service lines and charge consumable
/// stock. Every line appears in the result, possibly with zero orders.
pub fn allocate_orders(
    store: &mut Store,
    traffic: DayTraffic,
    config: &SimConfig,
    conversion_multiplier: f64,
    capacity_multiplier: f64,
) -> OrderAllocation {
    let mut allocation = OrderAllocation::default();
    if store.service_lines.is_empty() || traffic.total() == 0 {
        return allocation;
    }

    let capture = competition_factor(store);
    let conv = (store.traffic_conversion_rate * conversion_multiplier.max(0.0)).max(0.0);

    let mut raw: BTreeMap<ServiceId, f64> = BTreeMap::new();
    for (sid, line) in &store.service_lines {
        let demand = (traffic.fuel as f64 * line.conversion_from_fuel
            + traffic.visitor as f64 * line.conversion_from_visitor)
            * conv
            * capture;
        raw.insert(sid.clone(), demand.max(0.0));
    }

    let raw_total: f64 = raw.values().sum();
    if raw_total <= 0.0 {
        return allocation;
    }
    // Each vehicle buys at most one service.
    let scale = if raw_total > traffic.total() as f64 {
        traffic.total() as f64 / raw_total
    } else {
        1.0
    };

    let mut desired: BTreeMap<ServiceId, u32> = BTreeMap::new();
    for (sid, line) in &store.service_lines {
        let wanted = (raw[sid] * scale).round() as u32;
        let cap = effective_capacity(store, line, config, capacity_multiplier);
        desired.insert(sid.clone(), wanted.min(cap));
    }

    let service_ids: Vec<ServiceId> = store.service_lines.keys().cloned().collect();
    for sid in service_ids {
        let (orders, cogs) = consume_consumable(store, &sid, desired[&sid]);
        allocation.orders_by_service.insert(sid.clone(), orders);
        allocation.consumable_cogs_by_service.insert(sid, cogs);
    }

    allocation
}

/// Result of resolving one line's orders into projects.
#[derive(Debug, Clone, Default)]
pub struct ProjectOutcome {
    pub counts: BTreeMap<ProjectId, u32>,
    pub revenue: Money,
    pub parts_cogs: Money,
    pub variable_cost: Money,
    pub parts_cogs_by_project: BTreeMap<ProjectId, Money>,
}

impl ProjectOutcome {
    pub fn fulfilled(&self) -> u32 {
        self.counts.values().sum()
    }
}

fn weighted_pick(pairs: &[(ProjectId, f64)], rng: &mut RngStream) -> ProjectId {
    let total: f64 = pairs.iter().map(|(_, w)| w.max(0.0)).sum();
    if total <= 0.0 {
        return pairs[0].0.clone();
    }
    let r = rng.unit_f64() * total;
    let mut upto = 0.0;
    for (id, w) in pairs {
        upto += w.max(0.0);
        if upto >= r {
            return id.clone();
        }
    }
    pairs[pairs.len() - 1].0.clone()
}

/// Parts feasibility for one project under strict parts: the realized
/// count is capped by the scarcest required part, and stock for the
/// feasible count is consumed at weighted-average cost.
fn consume_parts(store: &mut Store, project: &ServiceProject, desired: u32) -> (u32, Money) {
    if desired == 0 {
        return (0, 0.0);
    }
    if project.parts.is_empty() {
        return (desired, 0.0);
    }

    let mut feasible = desired;
    for (sku, per_order) in &project.parts {
        if *per_order <= 0.0 {
            continue;
        }
        let qty = match store.inventory.get(sku) {
            Some(item) if item.qty > 0.0 => item.qty,
            _ => return (0, 0.0),
        };
        feasible = feasible.min((qty / per_order).floor() as u32);
        if feasible == 0 {
            return (0, 0.0);
        }
    }

    let mut parts_cogs = 0.0;
    for (sku, per_order) in &project.parts {
        if *per_order <= 0.0 {
            continue;
        }
        if let Some(item) = store.inventory.get_mut(sku) {
            let used = feasible as f64 * per_order;
            item.qty -= used;
            parts_cogs += used * item.unit_cost;
        }
    }
    (feasible, parts_cogs)
}

/// Resolve a project-mix line's orders: one weighted pick per order, then
/// per-project fulfillment. Under strict parts, unfulfillable picks lose
/// their revenue and variable cost; otherwise parts cost is approximated
/// from the line's parts cost ratio.
pub fn generate_projects(
    store: &mut Store,
    service: &ServiceId,
    orders: u32,
    rng: &mut RngStream,
) -> ProjectOutcome {
    let mut outcome = ProjectOutcome::default();
    if orders == 0 {
        return outcome;
    }
    let line = store.service_lines[service].clone();
    if line.project_mix.is_empty() {
        outcome.revenue = orders as Money * line.price;
        outcome.parts_cogs = outcome.revenue * line.parts_cost_ratio;
        return outcome;
    }

    for _ in 0..orders {
        let pid = weighted_pick(&line.project_mix, rng);
        *outcome.counts.entry(pid).or_insert(0) += 1;
    }

    let picked: Vec<(ProjectId, u32)> = outcome
        .counts
        .iter()
        .map(|(k, v)| (k.clone(), *v))
        .collect();
    for (pid, count) in picked {
        let Some(project) = store.projects.get(&pid).cloned() else {
            // Not in the catalog: bill at the line price.
            outcome.revenue += count as Money * line.price;
            outcome.parts_cogs += count as Money * line.price * line.parts_cost_ratio;
            continue;
        };

        outcome.revenue += count as Money * project.price;
        outcome.variable_cost += count as Money * project.variable_cost;

        if store.strict_parts {
            let (feasible, cogs) = consume_parts(store, &project, count);
            if feasible < count {
                let missed = (count - feasible) as Money;
                outcome.revenue -= missed * project.price;
                outcome.variable_cost -= missed * project.variable_cost;
                outcome.counts.insert(pid.clone(), feasible);
            }
            outcome.parts_cogs += cogs;
            *outcome.parts_cogs_by_project.entry(pid).or_insert(0.0) += cogs;
        } else {
            let cogs = count as Money * project.price * line.parts_cost_ratio;
            outcome.parts_cogs += cogs;
            *outcome.parts_cogs_by_project.entry(pid).or_insert(0.0) += cogs;
        }
    }

    outcome.counts.retain(|_, v| *v > 0);
    outcome
}
