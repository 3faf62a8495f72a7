//! Payroll roles and workforce planning
//!
//! A `RolePlan` describes one staffing position: headcount, fixed monthly
//! pay, statutory employer contributions, and the variable compensation
//! terms (commissions, piece rates, tier bonuses, profit share). The
//! payroll calculator consumes these every day; month-end settlement items
//! are evaluated on the last day of each accounting month.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::chain::service::ServiceCategory;
use crate::core::types::{Day, Money, ProjectId, RoleId, ServiceId};

/// What a commission rate is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommissionBasis {
    #[default]
    Revenue,
    GrossProfit,
}

/// Pure basis selector. Negative bases pay nothing rather than clawing back.
pub fn basis_amount(basis: CommissionBasis, revenue: Money, gross_profit: Money) -> Money {
    match basis {
        CommissionBasis::Revenue => revenue.max(0.0),
        CommissionBasis::GrossProfit => gross_profit.max(0.0),
    }
}

/// A commission rate together with its basis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CommissionTerm {
    pub rate: f64,
    pub basis: CommissionBasis,
}

impl CommissionTerm {
    pub fn revenue(rate: f64) -> Self {
        Self {
            rate,
            basis: CommissionBasis::Revenue,
        }
    }

    pub fn gross_profit(rate: f64) -> Self {
        Self {
            rate,
            basis: CommissionBasis::GrossProfit,
        }
    }

    pub fn amount(&self, revenue: Money, gross_profit: Money) -> Money {
        basis_amount(self.basis, revenue, gross_profit) * self.rate.max(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RolePlan {
    pub role: RoleId,
    pub headcount: u32,

    // Fixed pay
    pub base_monthly: Money,
    pub position_allowance: Money,
    pub social_security_rate: f64,
    pub housing_fund_rate: f64,
    pub workdays_per_month: u32,

    // Variable pay
    /// Broad commission on the store's total revenue
    pub sales_commission_rate: f64,
    /// Commission per service category on that category's revenue or margin
    pub category_commissions: BTreeMap<ServiceCategory, CommissionTerm>,
    /// Commission on project parts revenue or parts margin
    pub parts_commission: Option<CommissionTerm>,
    /// Commission on project labor-hour revenue, apportioned by the role's
    /// share of labor hours worked
    pub labor_commission_rate: f64,
    pub piece_rate_by_service: BTreeMap<ServiceId, Money>,
    pub piece_rate_by_project: BTreeMap<ProjectId, Money>,
    pub sales_commission_by_service: BTreeMap<ServiceId, f64>,
    pub gross_profit_commission_by_service: BTreeMap<ServiceId, f64>,
    pub gross_profit_commission_by_project: BTreeMap<ProjectId, f64>,

    // Month-end settlement
    /// Tiers of (monthly order threshold, bonus per head); best match pays
    pub monthly_tier_bonus: Vec<(u32, Money)>,
    /// Share of positive month-to-date operating profit
    pub profit_share_rate: f64,
    /// Below this monthly order count the role forfeits its commissions
    pub min_monthly_orders_threshold: u32,

    /// Pay per labor hour demanded beyond the role's staffed daily hours
    pub overtime_pay_rate: Money,
}

impl Default for RolePlan {
    fn default() -> Self {
        Self {
            role: RoleId::new(""),
            headcount: 0,
            base_monthly: 0.0,
            position_allowance: 0.0,
            social_security_rate: 0.0,
            housing_fund_rate: 0.0,
            workdays_per_month: 26,
            sales_commission_rate: 0.0,
            category_commissions: BTreeMap::new(),
            parts_commission: None,
            labor_commission_rate: 0.0,
            piece_rate_by_service: BTreeMap::new(),
            piece_rate_by_project: BTreeMap::new(),
            sales_commission_by_service: BTreeMap::new(),
            gross_profit_commission_by_service: BTreeMap::new(),
            gross_profit_commission_by_project: BTreeMap::new(),
            monthly_tier_bonus: Vec::new(),
            profit_share_rate: 0.0,
            min_monthly_orders_threshold: 0,
            overtime_pay_rate: 0.0,
        }
    }
}

impl RolePlan {
    pub fn new(role: impl Into<String>, headcount: u32, base_monthly: Money) -> Self {
        Self {
            role: RoleId::new(role),
            headcount,
            base_monthly,
            ..Default::default()
        }
    }

    /// Daily fixed pay across the whole headcount, before employer burden.
    pub fn fixed_pay_per_day(&self) -> Money {
        if self.headcount == 0 {
            return 0.0;
        }
        let workdays = self.workdays_per_month.max(1) as Money;
        (self.base_monthly + self.position_allowance) * self.headcount as Money / workdays
    }

    /// Daily employer statutory contributions on the fixed pay.
    pub fn employer_burden_per_day(&self) -> Money {
        self.fixed_pay_per_day() * (self.social_security_rate + self.housing_fund_rate).max(0.0)
    }

    /// Best tier bonus per head for a month order total, zero when no tier
    /// is reached.
    pub fn tier_bonus_for(&self, month_orders: u32) -> Money {
        self.monthly_tier_bonus
            .iter()
            .filter(|(threshold, _)| month_orders >= *threshold)
            .map(|(_, bonus)| *bonus)
            .fold(0.0, Money::max)
    }
}

/// Optional per-store staffing dynamics: daily turnover, recruiting
/// pipeline, and the capacity factor understaffing imposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkforcePlan {
    pub planned_headcount: u32,
    pub current_headcount: u32,
    /// Per-head daily probability of leaving
    pub daily_turnover_rate: f64,
    /// 0..1; training raises output per head
    pub training_level: f64,
    pub recruiting_enabled: bool,
    pub recruiting_daily_budget: Money,
    /// Expected hires per 100 budget spent
    pub recruiting_hire_rate_per_100_budget: f64,
    pub recruiting_lead_days: u32,
}

impl Default for WorkforcePlan {
    fn default() -> Self {
        Self {
            planned_headcount: 1,
            current_headcount: 1,
            daily_turnover_rate: 0.0,
            training_level: 0.5,
            recruiting_enabled: false,
            recruiting_daily_budget: 0.0,
            recruiting_hire_rate_per_100_budget: 0.20,
            recruiting_lead_days: 7,
        }
    }
}

impl WorkforcePlan {
    /// Throughput factor from staffing level and training, clamped so a
    /// fully staffed, well-trained team tops out at 1.3 and a gutted one
    /// still produces at 0.4.
    pub fn capacity_factor(&self) -> f64 {
        let planned = self.planned_headcount.max(1) as f64;
        let ratio = self.current_headcount as f64 / planned;
        (ratio * (0.8 + 0.4 * self.training_level.clamp(0.0, 1.0))).clamp(0.4, 1.3)
    }
}

/// An accepted hire working out a notice period elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PendingHire {
    pub qty: u32,
    pub order_day: Day,
    pub arrive_day: Day,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_amount_selects_and_floors() {
        assert_eq!(basis_amount(CommissionBasis::Revenue, 100.0, 40.0), 100.0);
        assert_eq!(basis_amount(CommissionBasis::GrossProfit, 100.0, 40.0), 40.0);
        assert_eq!(basis_amount(CommissionBasis::GrossProfit, 100.0, -5.0), 0.0);
    }

    #[test]
    fn test_fixed_pay_and_burden() {
        let plan = RolePlan {
            headcount: 1,
            base_monthly: 6000.0,
            position_allowance: 1500.0,
            social_security_rate: 0.30,
            housing_fund_rate: 0.12,
            workdays_per_month: 26,
            ..Default::default()
        };
        assert!((plan.fixed_pay_per_day() - 7500.0 / 26.0).abs() < 1e-9);
        assert!((plan.employer_burden_per_day() - 7500.0 * 0.42 / 26.0).abs() < 1e-9);
    }

    #[test]
    fn test_tier_bonus_picks_best_reached() {
        let plan = RolePlan {
            monthly_tier_bonus: vec![(1500, 300.0), (2200, 600.0)],
            ..Default::default()
        };
        assert_eq!(plan.tier_bonus_for(1000), 0.0);
        assert_eq!(plan.tier_bonus_for(1600), 300.0);
        assert_eq!(plan.tier_bonus_for(2500), 600.0);
    }

    #[test]
    fn test_capacity_factor_clamps() {
        let full = WorkforcePlan {
            planned_headcount: 4,
            current_headcount: 4,
            training_level: 0.5,
            ..Default::default()
        };
        assert!((full.capacity_factor() - 1.0).abs() < 1e-9);

        let empty = WorkforcePlan {
            planned_headcount: 4,
            current_headcount: 0,
            ..Default::default()
        };
        assert!((empty.capacity_factor() - 0.4).abs() < 1e-9);
    }
}
