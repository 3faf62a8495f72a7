//! HQ credit line
//!
//! Runs after the day's store results have settled into HQ cash. Interest
//! accrues on whatever credit is outstanding. When auto finance is on the
//! treasury draws against the credit line to cover a negative cash
//! position and repays from positive cash, up to 30% of it per day.
//! Draws and repays move cash but are not operating cashflow; only the
//! interest reduces the day's net.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::Money;
use crate::sim::state::SimState;

/// Treasury motions for one day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct FinanceDay {
    pub interest: Money,
    pub credit_draw: Money,
    pub credit_repay: Money,
}

pub fn apply_hq_finance(state: &mut SimState) -> FinanceDay {
    let mut day = FinanceDay::default();

    if state.hq_credit_used > 0.0 && state.hq_daily_interest_rate > 0.0 {
        day.interest = state.hq_credit_used * state.hq_daily_interest_rate;
        state.cash -= day.interest;
    }

    if state.hq_auto_finance {
        if state.cash < 0.0 {
            let room = (state.hq_credit_limit - state.hq_credit_used).max(0.0);
            let draw = room.min(-state.cash);
            if draw > 0.0 {
                state.cash += draw;
                state.hq_credit_used += draw;
                day.credit_draw = draw;
                debug!(draw, used = state.hq_credit_used, "credit drawn");
            }
        }
        if state.cash > 0.0 && state.hq_credit_used > 0.0 {
            let repay = state.hq_credit_used.min(state.cash * 0.30);
            if repay > 0.0 {
                state.cash -= repay;
                state.hq_credit_used -= repay;
                day.credit_repay = repay;
                debug!(repay, used = state.hq_credit_used, "credit repaid");
            }
        }
    }

    day
}
