//! Inventory ledger: per-store stock keyed by SKU, in-transit inbounds,
//! and automatic replenishment rules.
//!
//! Quantities are fractional (chemicals are drawn per order in sub-unit
//! amounts) and never go negative. Unit costs are weighted averages over
//! every receipt. Within one simulated day the order is fixed: pending
//! inbounds land at tick start, order processing consumes stock, and
//! replenishment rules are evaluated against what is left afterwards.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chain::store::Store;
use crate::core::types::{Day, Money, Sku};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InventoryItem {
    pub sku: Sku,
    pub name: String,
    /// Weighted-average cost over all receipts.
    pub unit_cost: Money,
    pub qty: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplenishmentRule {
    pub sku: Sku,
    pub name: String,
    pub enabled: bool,
    /// Fires when on-hand plus on-order falls to this level or below.
    pub reorder_point: f64,
    pub safety_stock: f64,
    pub target_stock: f64,
    pub lead_time_days: u32,
    /// Purchase price; falls back to the item's current average when zero.
    pub unit_cost: Money,
}

impl Default for ReplenishmentRule {
    fn default() -> Self {
        Self {
            sku: Sku::new(""),
            name: String::new(),
            enabled: true,
            reorder_point: 50.0,
            safety_stock: 80.0,
            target_stock: 150.0,
            lead_time_days: 2,
            unit_cost: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PendingInbound {
    pub sku: Sku,
    pub name: String,
    pub qty: f64,
    pub unit_cost: Money,
    pub order_day: Day,
    pub arrive_day: Day,
}

/// Ledger record for stock that landed this day.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InboundArrival {
    pub sku: Sku,
    pub name: String,
    pub qty: f64,
    pub unit_cost: Money,
    pub arrive_day: Day,
}

/// Ledger record for a replenishment purchase placed this day.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReplenishmentOrder {
    pub sku: Sku,
    pub qty: f64,
    pub unit_cost: Money,
    pub order_day: Day,
    pub arrive_day: Day,
    pub cash_out: Money,
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Merge a receipt into stock with a weighted-average unit cost.
pub fn merge_receipt(store: &mut Store, sku: &Sku, name: &str, unit_cost: Money, qty: f64) {
    if qty <= 0.0 {
        return;
    }
    match store.inventory.get_mut(sku) {
        None => {
            store.inventory.insert(
                sku.clone(),
                InventoryItem {
                    sku: sku.clone(),
                    name: name.to_string(),
                    unit_cost,
                    qty,
                },
            );
        }
        Some(item) => {
            let total = item.qty + qty;
            if total > 0.0 {
                item.unit_cost = (item.unit_cost * item.qty + unit_cost * qty) / total;
            }
            item.qty += qty;
            if !name.is_empty() {
                item.name = name.to_string();
            }
        }
    }
}

/// Land every pending inbound whose arrival day has come, merging into
/// stock and returning arrival records for the ledger.
pub fn process_pending_inbounds(store: &mut Store, day: Day) -> Vec<InboundArrival> {
    let mut arrivals = Vec::new();
    let pending = std::mem::take(&mut store.pending_inbounds);
    for inbound in pending {
        if inbound.arrive_day > day {
            store.pending_inbounds.push(inbound);
            continue;
        }
        let qty = inbound.qty.max(0.0);
        if inbound.sku.as_str().is_empty() || qty <= 0.0 {
            continue;
        }
        let unit_cost = inbound.unit_cost.max(0.0);
        merge_receipt(store, &inbound.sku, &inbound.name, unit_cost, qty);
        arrivals.push(InboundArrival {
            sku: inbound.sku,
            name: inbound.name,
            qty: round4(qty),
            unit_cost: round4(unit_cost),
            arrive_day: day,
        });
    }
    arrivals
}

/// Evaluate replenishment rules against on-hand plus on-order stock.
/// Each triggered rule orders up to `max(target, safety)` minus the
/// effective level, spending at most the available cash (quantity scales
/// down with the spend). Returns the total spend and order records.
pub fn auto_replenish(
    store: &mut Store,
    day: Day,
    cash_available: Money,
) -> (Money, Vec<ReplenishmentOrder>) {
    if !store.auto_replenishment_enabled || store.replenishment_rules.is_empty() {
        return (0.0, Vec::new());
    }

    let mut total_cost = 0.0;
    let mut orders = Vec::new();

    let rules: Vec<ReplenishmentRule> = store.replenishment_rules.values().cloned().collect();
    for rule in rules {
        if !rule.enabled {
            continue;
        }
        let item = store.inventory.get(&rule.sku);
        let qty_now = item.map(|i| i.qty).unwrap_or(0.0);
        let on_order: f64 = store
            .pending_inbounds
            .iter()
            .filter(|p| p.sku == rule.sku)
            .map(|p| p.qty.max(0.0))
            .sum();

        let reorder_point = rule.reorder_point.max(0.0);
        let safety = rule.safety_stock.max(0.0);
        let target = rule.target_stock.max(safety);
        let effective = qty_now + on_order;

        if effective > reorder_point {
            continue;
        }
        let need_qty = (target - effective).max(0.0);
        if need_qty <= 0.0 {
            continue;
        }

        let mut unit_cost = rule.unit_cost.max(0.0);
        if unit_cost <= 0.0 {
            if let Some(item) = item {
                unit_cost = item.unit_cost.max(0.0);
            }
        }
        if unit_cost <= 0.0 {
            continue;
        }

        let est_cost = need_qty * unit_cost;
        let actual_cost = est_cost.min(cash_available.max(0.0));
        if actual_cost <= 0.0 {
            debug!(sku = rule.sku.as_str(), "replenishment skipped, no cash");
            continue;
        }
        let buy_qty = actual_cost / unit_cost;
        if buy_qty <= 0.0 {
            continue;
        }

        let arrive_day = day + rule.lead_time_days;
        let name = if rule.name.is_empty() {
            item.map(|i| i.name.clone())
                .unwrap_or_else(|| rule.sku.as_str().to_string())
        } else {
            rule.name.clone()
        };
        store.pending_inbounds.push(PendingInbound {
            sku: rule.sku.clone(),
            name,
            qty: buy_qty,
            unit_cost,
            order_day: day,
            arrive_day,
        });
        total_cost += actual_cost;
        orders.push(ReplenishmentOrder {
            sku: rule.sku.clone(),
            qty: round4(buy_qty),
            unit_cost: round4(unit_cost),
            order_day: day,
            arrive_day,
            cash_out: round4(actual_cost),
        });
    }

    (total_cost, orders)
}

/// Immediate cash purchase into stock. Spends at most `cash_available`
/// and returns the actual spend; the caller moves the cash.
pub fn apply_purchase(
    store: &mut Store,
    sku: &Sku,
    name: &str,
    unit_cost: Money,
    qty: f64,
    cash_available: Money,
) -> Money {
    if qty <= 0.0 || unit_cost < 0.0 {
        return 0.0;
    }
    let total = qty * unit_cost;
    let actual = total.min(cash_available);
    if actual <= 0.0 {
        return 0.0;
    }
    let bought_qty = if unit_cost > 0.0 { actual / unit_cost } else { 0.0 };
    merge_receipt(store, sku, name, unit_cost, bought_qty);
    store.mtd.cash_out += actual;
    actual
}
