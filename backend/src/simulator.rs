use crate::{
    error::EngineError,
    geo::haversine_km,
    models::{Coordinate, Station, TripPlan},
    stations::nearest_within,
};

/// Remaining charge at or below which the simulator looks for a charger.
pub const LOW_BATTERY_PERCENT: f64 = 20.0;
/// Search radius around a low-battery point.
pub const STOP_SEARCH_RADIUS_KM: f64 = 5.0;
pub const FULL_BATTERY_PERCENT: f64 = 100.0;

/// Battery bookkeeping since the last accepted charging stop.
#[derive(Debug, Clone, Copy)]
struct SimulationState {
    /// Charge level at the last checkpoint; not decremented between stops.
    checkpoint_percent: f64,
    distance_since_checkpoint_km: f64,
}

impl SimulationState {
    fn new(start_percent: f64) -> Self {
        Self {
            checkpoint_percent: start_percent,
            distance_since_checkpoint_km: 0.0,
        }
    }

    fn advance(&mut self, segment_km: f64) {
        self.distance_since_checkpoint_km += segment_km;
    }

    fn remaining_percent(&self, efficiency_km_per_kwh: f64) -> f64 {
        let used = self.distance_since_checkpoint_km / efficiency_km_per_kwh;
        self.checkpoint_percent - used
    }

    fn recharge(&mut self) {
        *self = Self::new(FULL_BATTERY_PERCENT);
    }
}

/// Simulate battery depletion along `path` and insert charging stops.
///
/// # Algorithm
///
/// Walk consecutive point pairs, adding each segment to the distance covered
/// since the last checkpoint. After every segment the remaining charge is
/// recomputed from the checkpoint:
///
/// ```text
/// remaining = checkpoint_percent - distance_since_checkpoint / efficiency
/// ```
///
/// When `remaining <= LOW_BATTERY_PERCENT` the segment end is recorded as a
/// low-battery point and the nearest station within `STOP_SEARCH_RADIUS_KM`
/// (raw distance, no renewable bonus) becomes a stop. Accepting a stop resets
/// the checkpoint to a full battery; finding none leaves it untouched, so
/// every following point is tested against the same checkpoint.
///
/// The plan is greedy and deterministic, not globally optimal.
pub fn plan(
    path: &[Coordinate],
    start_battery_percent: f64,
    efficiency_km_per_kwh: f64,
    stations: &[Station],
) -> Result<TripPlan, EngineError> {
    validate_vehicle(start_battery_percent, efficiency_km_per_kwh)?;
    if path.len() < 2 {
        return Err(EngineError::InvalidInput(format!(
            "a route needs at least two points, got {}",
            path.len()
        )));
    }

    let mut state = SimulationState::new(start_battery_percent);
    let mut charging_stops = Vec::new();
    let mut low_battery_points = Vec::new();

    for segment in path.windows(2) {
        let point = segment[1];
        state.advance(haversine_km(segment[0], point));

        let remaining = state.remaining_percent(efficiency_km_per_kwh);
        if remaining > LOW_BATTERY_PERCENT {
            continue;
        }

        low_battery_points.push(point);
        match nearest_within(point, STOP_SEARCH_RADIUS_KM, stations) {
            Some(station) => {
                tracing::debug!(
                    "charging stop at {} ({}) with {:.1}% remaining",
                    station.name,
                    station.id,
                    remaining
                );
                charging_stops.push(station.clone());
                state.recharge();
            }
            None => {
                tracing::debug!(
                    "no station within {STOP_SEARCH_RADIUS_KM} km of {point} ({remaining:.1}% remaining)"
                );
            }
        }
    }

    Ok(TripPlan {
        path: path.to_vec(),
        charging_stops,
        low_battery_points,
    })
}

pub(crate) fn validate_vehicle(
    battery_percent: f64,
    efficiency_km_per_kwh: f64,
) -> Result<(), EngineError> {
    if !battery_percent.is_finite() || battery_percent <= 0.0 || battery_percent > 100.0 {
        return Err(EngineError::InvalidInput(format!(
            "starting battery must be in (0, 100], got {battery_percent}"
        )));
    }
    if !efficiency_km_per_kwh.is_finite() || efficiency_km_per_kwh <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "efficiency must be a positive km/kWh value, got {efficiency_km_per_kwh}"
        )));
    }
    Ok(())
}
