//! Traffic-generating stations
//!
//! A station is a fuel forecourt that produces two vehicle flows per day:
//! refuelling vehicles and visitors (shop, rest area). Stores bound to the
//! station convert a share of that flow into service orders.

use serde::{Deserialize, Serialize};

use crate::core::types::StationId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Station {
    pub id: StationId,
    pub name: String,

    /// Mean refuelling vehicles per day before jitter
    pub fuel_vehicles_per_day: u32,
    /// Mean visitor vehicles per day before jitter
    pub visitor_vehicles_per_day: u32,
    /// Symmetric daily jitter amplitude as a fraction of the mean
    pub traffic_volatility: f64,

    /// Map coordinates, used only by external planning collaborators
    pub map_x: f64,
    pub map_y: f64,
}

impl Default for Station {
    fn default() -> Self {
        Self {
            id: StationId::new(""),
            name: String::new(),
            fuel_vehicles_per_day: 600,
            visitor_vehicles_per_day: 10,
            traffic_volatility: 0.10,
            map_x: 0.0,
            map_y: 0.0,
        }
    }
}

impl Station {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: StationId::new(id),
            name: name.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_defaults() {
        let station = Station::new("ST01", "North Ring");
        assert_eq!(station.fuel_vehicles_per_day, 600);
        assert_eq!(station.visitor_vehicles_per_day, 10);
        assert!((station.traffic_volatility - 0.10).abs() < 1e-9);
    }
}
