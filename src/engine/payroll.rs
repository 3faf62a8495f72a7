//! Payroll calculator
//!
//! Settlement is monthly but the engine pays cash daily, so every day
//! produces a decomposed preview per role: fixed pay, employer burden,
//! each commission stream, piece pay, and on the month's last day the
//! tier bonus, profit share, and any commission reversal for a role that
//! missed its minimum order threshold. The ledger carries these rows so
//! commission attribution can be audited per day.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::chain::service::ServiceCategory;
use crate::chain::store::Store;
use crate::core::config::SimConfig;
use crate::core::types::{Money, ProjectId, RoleId, ServiceId};

/// Realized bases the commission streams are computed from.
#[derive(Debug, Clone, Default)]
pub struct PayrollInputs {
    pub orders_by_service: BTreeMap<ServiceId, u32>,
    pub orders_by_project: BTreeMap<ProjectId, u32>,
    pub revenue_by_service: BTreeMap<ServiceId, Money>,
    pub gross_profit_by_service: BTreeMap<ServiceId, Money>,
    pub gross_profit_by_project: BTreeMap<ProjectId, Money>,
    pub revenue_by_category: BTreeMap<ServiceCategory, Money>,
    pub gross_profit_by_category: BTreeMap<ServiceCategory, Money>,
    pub labor_revenue: Money,
    pub parts_revenue: Money,
    pub parts_gross_profit: Money,
    /// Realized labor hours per role, for labor-commission apportionment
    /// and overtime.
    pub labor_hours_by_role: BTreeMap<RoleId, f64>,
    pub is_month_end: bool,
}

/// One role's decomposed pay for one day.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RolePayrollDay {
    pub role: RoleId,
    pub headcount: u32,
    pub fixed_pay: Money,
    pub employer_burden: Money,
    pub sales_commission: Money,
    pub category_commission: Money,
    pub parts_commission: Money,
    pub labor_commission: Money,
    pub service_commission: Money,
    pub project_commission: Money,
    pub piece_pay: Money,
    /// Variable compensation subject to the order threshold.
    pub commission_total: Money,
    pub tier_bonus: Money,
    pub profit_share: Money,
    pub overtime_pay: Money,
    /// Negative at month end when the role missed its minimum order
    /// threshold; reverses the month's accrued commission.
    pub commission_reversal: Money,
    pub total: Money,
}

#[derive(Debug, Clone, Default)]
pub struct PayrollDay {
    pub rows: Vec<RolePayrollDay>,
    pub total: Money,
}

/// Compute every role's pay for the day. Month-end items read the
/// store's month-to-date trackers.
pub fn compute_payroll(store: &Store, inputs: &PayrollInputs, config: &SimConfig) -> PayrollDay {
    let mut day = PayrollDay::default();

    let revenue_total: Money = inputs.revenue_by_category.values().sum();
    let total_labor_hours: f64 = inputs.labor_hours_by_role.values().sum();
    let today_orders: u32 = inputs.orders_by_service.values().sum();

    for (role, plan) in &store.payroll {
        if plan.headcount == 0 {
            continue;
        }

        let mut row = RolePayrollDay {
            role: role.clone(),
            headcount: plan.headcount,
            fixed_pay: plan.fixed_pay_per_day(),
            employer_burden: plan.employer_burden_per_day(),
            ..Default::default()
        };

        if plan.sales_commission_rate > 0.0 {
            row.sales_commission = revenue_total.max(0.0) * plan.sales_commission_rate;
        }

        for (category, term) in &plan.category_commissions {
            let revenue = inputs
                .revenue_by_category
                .get(category)
                .copied()
                .unwrap_or(0.0);
            let gross_profit = inputs
                .gross_profit_by_category
                .get(category)
                .copied()
                .unwrap_or(0.0);
            row.category_commission += term.amount(revenue, gross_profit);
        }

        if let Some(term) = &plan.parts_commission {
            row.parts_commission = term.amount(inputs.parts_revenue, inputs.parts_gross_profit);
        }

        if plan.labor_commission_rate > 0.0 && total_labor_hours > 0.0 {
            let role_hours = inputs
                .labor_hours_by_role
                .get(role)
                .copied()
                .unwrap_or(0.0);
            let share = role_hours / total_labor_hours;
            row.labor_commission =
                inputs.labor_revenue.max(0.0) * share * plan.labor_commission_rate;
        }

        for (sid, orders) in &inputs.orders_by_service {
            if let Some(rate) = plan.piece_rate_by_service.get(sid) {
                row.piece_pay += *orders as Money * rate * plan.headcount as Money;
            }
        }
        for (pid, orders) in &inputs.orders_by_project {
            if let Some(rate) = plan.piece_rate_by_project.get(pid) {
                row.piece_pay += *orders as Money * rate * plan.headcount as Money;
            }
        }

        for (sid, revenue) in &inputs.revenue_by_service {
            if let Some(rate) = plan.sales_commission_by_service.get(sid) {
                row.service_commission += revenue * rate;
            }
        }
        for (sid, gross_profit) in &inputs.gross_profit_by_service {
            if let Some(rate) = plan.gross_profit_commission_by_service.get(sid) {
                row.service_commission += gross_profit.max(0.0) * rate;
            }
        }
        for (pid, gross_profit) in &inputs.gross_profit_by_project {
            if let Some(rate) = plan.gross_profit_commission_by_project.get(pid) {
                row.project_commission += gross_profit.max(0.0) * rate;
            }
        }

        row.commission_total = row.sales_commission
            + row.category_commission
            + row.parts_commission
            + row.labor_commission
            + row.service_commission
            + row.project_commission
            + row.piece_pay;

        let role_hours = inputs
            .labor_hours_by_role
            .get(role)
            .copied()
            .unwrap_or(0.0);
        let staffed_hours = plan.headcount as f64 * config.hours_per_staff_per_day;
        if plan.overtime_pay_rate > 0.0 && role_hours > staffed_hours {
            row.overtime_pay = (role_hours - staffed_hours) * plan.overtime_pay_rate;
        }

        if inputs.is_month_end {
            if !plan.monthly_tier_bonus.is_empty() {
                row.tier_bonus =
                    plan.tier_bonus_for(store.total_mtd_orders()) * plan.headcount as Money;
            }
            if plan.profit_share_rate > 0.0 {
                row.profit_share = store.mtd.operating_profit.max(0.0) * plan.profit_share_rate;
            }
            if plan.min_monthly_orders_threshold > 0 {
                let month_orders = store.total_mtd_orders() + today_orders;
                if month_orders < plan.min_monthly_orders_threshold {
                    let accrued = store
                        .mtd
                        .commission_by_role
                        .get(role)
                        .copied()
                        .unwrap_or(0.0);
                    row.commission_reversal = -(accrued + row.commission_total);
                }
            }
        }

        row.total = row.fixed_pay
            + row.employer_burden
            + row.commission_total
            + row.tier_bonus
            + row.profit_share
            + row.overtime_pay
            + row.commission_reversal;

        day.total += row.total;
        day.rows.push(row);
    }

    day
}
