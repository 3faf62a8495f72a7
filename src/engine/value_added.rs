//! Value-added revenue streams
//!
//! Beyond forecourt services a store can run three side businesses:
//! online retail fulfilled from the counter, an insurance agency desk,
//! and used-car brokerage. Each contributes revenue and gross profit but
//! no orders, inventory movement, or labor. Draw order is fixed: online
//! order count, then insurance revenue, then brokerage deal count.

use serde::{Deserialize, Serialize};

use crate::core::config::SimConfig;
use crate::core::rng::RngStream;
use crate::core::types::Money;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OnlineConfig {
    pub enabled: bool,
    pub daily_orders_mean: f64,
    pub daily_orders_std: f64,
    pub avg_ticket: Money,
    pub margin_rate: f64,
}

impl Default for OnlineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            daily_orders_mean: 2.0,
            daily_orders_std: 0.5,
            avg_ticket: 200.0,
            margin_rate: 0.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsuranceConfig {
    pub enabled: bool,
    pub daily_revenue_target: Money,
    pub volatility: f64,
    pub margin_rate: f64,
}

impl Default for InsuranceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            daily_revenue_target: 128.4,
            volatility: 0.10,
            margin_rate: 0.20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UsedCarConfig {
    pub enabled: bool,
    pub monthly_deal_target: f64,
    pub revenue_per_deal: Money,
    pub profit_per_deal: Money,
}

impl Default for UsedCarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            monthly_deal_target: 1.56,
            revenue_per_deal: 1200.0,
            profit_per_deal: 600.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ValueAddedConfig {
    pub online: OnlineConfig,
    pub insurance: InsuranceConfig,
    pub used_car: UsedCarConfig,
}

/// One day's value-added outcome across the three streams.
#[derive(Debug, Clone, Default)]
pub struct ValueAddedDay {
    pub online_revenue: Money,
    pub online_gross_profit: Money,
    pub insurance_revenue: Money,
    pub insurance_gross_profit: Money,
    pub used_car_revenue: Money,
    pub used_car_gross_profit: Money,
    pub used_car_deals: u32,
}

impl ValueAddedDay {
    pub fn revenue(&self) -> Money {
        self.online_revenue + self.insurance_revenue + self.used_car_revenue
    }

    pub fn gross_profit(&self) -> Money {
        self.online_gross_profit + self.insurance_gross_profit + self.used_car_gross_profit
    }
}

/// Sample the enabled streams for one day.
pub fn simulate_value_added(
    config: &ValueAddedConfig,
    sim: &SimConfig,
    rng: &mut RngStream,
) -> ValueAddedDay {
    let mut day = ValueAddedDay::default();

    if config.online.enabled {
        let orders = rng
            .normal(config.online.daily_orders_mean, config.online.daily_orders_std.max(0.0))
            .max(0.0)
            .round();
        day.online_revenue = orders * config.online.avg_ticket.max(0.0);
        day.online_gross_profit = day.online_revenue * config.online.margin_rate.clamp(0.0, 1.0);
    }

    if config.insurance.enabled {
        let target = config.insurance.daily_revenue_target.max(0.0);
        let sigma = target * config.insurance.volatility.max(0.0);
        day.insurance_revenue = rng.normal(target, sigma).max(0.0);
        day.insurance_gross_profit =
            day.insurance_revenue * config.insurance.margin_rate.clamp(0.0, 1.0);
    }

    if config.used_car.enabled {
        let lambda =
            config.used_car.monthly_deal_target.max(0.0) / sim.month_len_days.max(1) as f64;
        day.used_car_deals = rng.poisson(lambda);
        if day.used_car_deals > 0 {
            day.used_car_revenue =
                day.used_car_deals as Money * config.used_car.revenue_per_deal.max(0.0);
            day.used_car_gross_profit =
                day.used_car_deals as Money * config.used_car.profit_per_deal;
        }
    }

    day
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_online_when_std_zero() {
        let config = ValueAddedConfig {
            online: OnlineConfig {
                daily_orders_std: 0.0,
                ..Default::default()
            },
            insurance: InsuranceConfig {
                enabled: false,
                ..Default::default()
            },
            used_car: UsedCarConfig {
                enabled: false,
                ..Default::default()
            },
        };
        let sim = SimConfig::new();
        let mut rng = RngStream::new(42);
        let day = simulate_value_added(&config, &sim, &mut rng);
        // 2 orders at 200 average ticket, 15% margin
        assert!((day.online_revenue - 400.0).abs() < 1e-9);
        assert!((day.online_gross_profit - 60.0).abs() < 1e-9);
        assert_eq!(day.used_car_deals, 0);
    }

    #[test]
    fn test_disabled_streams_consume_no_draws() {
        let config = ValueAddedConfig {
            online: OnlineConfig {
                enabled: false,
                ..Default::default()
            },
            insurance: InsuranceConfig {
                enabled: false,
                ..Default::default()
            },
            used_car: UsedCarConfig {
                enabled: false,
                ..Default::default()
            },
        };
        let sim = SimConfig::new();
        let mut rng = RngStream::new(42);
        let before = rng.word_pos();
        let day = simulate_value_added(&config, &sim, &mut rng);
        assert_eq!(rng.word_pos(), before);
        assert_eq!(day.revenue(), 0.0);
        assert_eq!(day.gross_profit(), 0.0);
    }

    #[test]
    fn test_insurance_revenue_floors_at_zero() {
        let config = ValueAddedConfig {
            online: OnlineConfig {
                enabled: false,
                ..Default::default()
            },
            insurance: InsuranceConfig {
                daily_revenue_target: 100.0,
                volatility: 5.0,
                margin_rate: 0.20,
                ..Default::default()
            },
            used_car: UsedCarConfig {
                enabled: false,
                ..Default::default()
            },
        };
        let sim = SimConfig::new();
        let mut rng = RngStream::new(42);
        for _ in 0..100 {
            let day = simulate_value_added(&config, &sim, &mut rng);
            assert!(day.insurance_revenue >= 0.0);
        }
    }
}
