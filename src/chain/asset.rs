//! Capitalized fixed assets with straight-line depreciation

use serde::{Deserialize, Serialize};

use crate::core::types::{Day, Money};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Asset {
    pub name: String,
    pub capex: Money,
    pub useful_life_days: u32,
    pub in_service_day: Day,
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            name: String::new(),
            capex: 0.0,
            useful_life_days: 5 * 365,
            in_service_day: 1,
        }
    }
}

impl Asset {
    /// Daily straight-line charge on `day`. Zero outside the service window
    /// `[in_service_day, in_service_day + useful_life_days)`.
    pub fn depreciation_on(&self, day: Day) -> Money {
        if self.capex <= 0.0 || self.useful_life_days == 0 {
            return 0.0;
        }
        if day < self.in_service_day {
            return 0.0;
        }
        if day >= self.in_service_day + self.useful_life_days {
            return 0.0;
        }
        self.capex / self.useful_life_days as Money
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depreciation_inside_window() {
        let asset = Asset {
            name: "lift".into(),
            capex: 365_000.0,
            useful_life_days: 365,
            in_service_day: 10,
        };
        assert_eq!(asset.depreciation_on(9), 0.0);
        assert!((asset.depreciation_on(10) - 1000.0).abs() < 1e-9);
        assert!((asset.depreciation_on(374) - 1000.0).abs() < 1e-9);
        assert_eq!(asset.depreciation_on(375), 0.0);
    }

    #[test]
    fn test_zero_life_never_depreciates() {
        let asset = Asset {
            capex: 1000.0,
            useful_life_days: 0,
            ..Default::default()
        };
        assert_eq!(asset.depreciation_on(1), 0.0);
    }
}
