//! Sellable service lines and the projects behind them
//!
//! A service line converts station traffic into orders at a price. Lines in
//! the maintenance business usually carry a `project_mix`: each realized
//! order becomes one concrete project (oil change, tire repair, ...) with
//! its own price, labor hours and parts bill.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::types::{Money, ProjectId, RoleId, ServiceId, Sku};

/// Business category of a service line. Categories drive commission terms,
/// utility costs and reporting rollups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Wash,
    Maintenance,
    Detailing,
    Other,
}

impl ServiceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Wash => "wash",
            ServiceCategory::Maintenance => "maintenance",
            ServiceCategory::Detailing => "detailing",
            ServiceCategory::Other => "other",
        }
    }

    pub const ALL: [ServiceCategory; 4] = [
        ServiceCategory::Wash,
        ServiceCategory::Maintenance,
        ServiceCategory::Detailing,
        ServiceCategory::Other,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceLine {
    pub id: ServiceId,
    pub name: String,
    pub category: ServiceCategory,

    pub price: Money,
    /// Fraction of fuel vehicles that demand this service
    pub conversion_from_fuel: f64,
    /// Fraction of visitor vehicles that demand this service
    pub conversion_from_visitor: f64,
    /// Hard throughput ceiling per day before capacity multipliers
    pub capacity_per_day: u32,

    /// Non-inventory variable cost per realized order
    pub variable_cost_per_order: Money,
    /// Parts cost as a fraction of price, used when no strict parts
    /// accounting applies
    pub parts_cost_ratio: f64,
    /// Direct labor cost per order, used by break-even analysis
    pub variable_labor_per_order: Money,

    /// Linked labor role; when set, staffing hours cap throughput
    pub labor_role: Option<RoleId>,
    pub labor_hours_per_order: f64,

    /// Linked consumable; stock limits realized orders
    pub consumable_sku: Option<Sku>,
    pub consumable_units_per_order: f64,

    /// Weighted project template mix; one pick per realized order
    pub project_mix: Vec<(ProjectId, f64)>,
}

impl Default for ServiceLine {
    fn default() -> Self {
        Self {
            id: ServiceId::new(""),
            name: String::new(),
            category: ServiceCategory::Other,
            price: 0.0,
            conversion_from_fuel: 0.0,
            conversion_from_visitor: 0.0,
            capacity_per_day: 0,
            variable_cost_per_order: 0.0,
            parts_cost_ratio: 0.0,
            variable_labor_per_order: 0.0,
            labor_role: None,
            labor_hours_per_order: 0.0,
            consumable_sku: None,
            consumable_units_per_order: 0.0,
            project_mix: Vec::new(),
        }
    }
}

impl ServiceLine {
    /// Contribution margin of one order: price minus per-order variable
    /// cost, direct labor and the ratio-estimated parts bill.
    pub fn unit_contribution(&self) -> Money {
        self.price
            - self.variable_cost_per_order
            - self.variable_labor_per_order
            - self.price * self.parts_cost_ratio
    }
}

/// One concrete maintenance job generated from a service line's mix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceProject {
    pub id: ProjectId,
    pub name: String,
    pub price: Money,
    pub labor_hours: f64,
    pub variable_cost: Money,
    /// Required parts per order: sku -> units
    pub parts: BTreeMap<Sku, f64>,
}

impl Default for ServiceProject {
    fn default() -> Self {
        Self {
            id: ProjectId::new(""),
            name: String::new(),
            price: 0.0,
            labor_hours: 0.0,
            variable_cost: 0.0,
            parts: BTreeMap::new(),
        }
    }
}

impl ServiceProject {
    /// Share of the project price attributable to labor at the store's
    /// hourly rate, clamped to 0..=1. The remainder is parts revenue.
    pub fn labor_revenue_ratio(&self, labor_hour_price: Money) -> f64 {
        if self.price <= 0.0 {
            return 0.0;
        }
        ((self.labor_hours * labor_hour_price.max(0.0)) / self.price).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_contribution() {
        let line = ServiceLine {
            price: 30.0,
            variable_cost_per_order: 3.0,
            variable_labor_per_order: 0.3,
            parts_cost_ratio: 0.0,
            ..Default::default()
        };
        assert!((line.unit_contribution() - 26.7).abs() < 1e-9);
    }

    #[test]
    fn test_unit_contribution_with_parts_ratio() {
        let line = ServiceLine {
            price: 200.0,
            variable_cost_per_order: 1.0,
            parts_cost_ratio: 0.55,
            ..Default::default()
        };
        // 200 - 1 - 110 = 89
        assert!((line.unit_contribution() - 89.0).abs() < 1e-9);
    }

    #[test]
    fn test_labor_revenue_ratio_clamps() {
        let project = ServiceProject {
            price: 80.0,
            labor_hours: 2.0,
            ..Default::default()
        };
        // 2h * 120 = 240 > price -> ratio capped at 1
        assert!((project.labor_revenue_ratio(120.0) - 1.0).abs() < 1e-9);

        let cheap_labor = ServiceProject {
            price: 299.0,
            labor_hours: 0.8,
            ..Default::default()
        };
        let ratio = cheap_labor.labor_revenue_ratio(120.0);
        assert!((ratio - 96.0 / 299.0).abs() < 1e-9);
    }

    #[test]
    fn test_category_serializes_snake_case() {
        let json = serde_json::to_string(&ServiceCategory::Maintenance).unwrap();
        assert_eq!(json, "\"maintenance\"");
    }
}
