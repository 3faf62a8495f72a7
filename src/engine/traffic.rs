//! Station traffic sampling and the store's competitive capture factor.

use crate::chain::station::Station;
use crate::chain::store::Store;
use crate::core::rng::RngStream;

/// One day's vehicle counts for a store, after volatility jitter and the
/// day's traffic multiplier.
#[derive(Debug, Clone, Copy, Default)]
pub struct DayTraffic {
    pub fuel: u32,
    pub visitor: u32,
}

impl DayTraffic {
    pub fn total(&self) -> u32 {
        self.fuel + self.visitor
    }
}

/// Jitter the station's base rates and scale by the traffic multiplier.
/// Fuel is drawn before visitor.
pub fn sample_traffic(station: &Station, traffic_multiplier: f64, rng: &mut RngStream) -> DayTraffic {
    let fuel = rng.jitter_count(station.fuel_vehicles_per_day, station.traffic_volatility);
    let visitor = rng.jitter_count(station.visitor_vehicles_per_day, station.traffic_volatility);
    let mult = traffic_multiplier.max(0.0);
    DayTraffic {
        fuel: (fuel as f64 * mult).round() as u32,
        visitor: (visitor as f64 * mult).round() as u32,
    }
}

/// How much of the station's traffic the store captures against local
/// competitors. Stronger competition diverts traffic; attractiveness
/// partially offsets it.
pub fn competition_factor(store: &Store) -> f64 {
    let comp = store.local_competition_intensity.clamp(0.0, 1.0);
    let attract = store.attractiveness_index.clamp(0.5, 1.5);
    ((1.0 - 0.7 * comp) * attract).clamp(0.2, 1.5)
}
