use std::cmp::Ordering;

use crate::{
    error::EngineError,
    geo::haversine_km,
    models::{Coordinate, RankedStation, Station},
};

/// Distance bonus granted to renewable-sourced stations when ranking.
pub const RENEWABLE_BONUS_KM: f64 = 5.0;
/// At or below this charge level, ranking ignores the renewable bonus.
pub const CRITICAL_BATTERY_PERCENT: f64 = 20.0;

/// Nearest station within `radius_km` of `point`, by raw great-circle distance.
///
/// Ties go to the station that appears first in `stations`.
pub fn nearest_within(point: Coordinate, radius_km: f64, stations: &[Station]) -> Option<&Station> {
    let mut best: Option<(&Station, f64)> = None;

    for station in stations {
        let distance = haversine_km(point, station.coordinate());
        if distance > radius_km {
            continue;
        }
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((station, distance)),
        }
    }

    best.map(|(station, _)| station)
}

/// Rank the whole catalog for a driver at `origin`.
///
/// Above [`CRITICAL_BATTERY_PERCENT`] stations are ordered by adjusted
/// distance, where renewable stations get [`RENEWABLE_BONUS_KM`] knocked off
/// (floored at zero). At or below it, raw distance decides. The sort is
/// stable, so equal keys keep catalog order.
pub fn rank_by_preference(
    origin: Coordinate,
    stations: &[Station],
    battery_percent: f64,
) -> Result<Vec<RankedStation>, EngineError> {
    if !battery_percent.is_finite() || !(0.0..=100.0).contains(&battery_percent) {
        return Err(EngineError::InvalidInput(format!(
            "battery percentage must be between 0 and 100, got {battery_percent}"
        )));
    }

    let mut ranked: Vec<RankedStation> = stations
        .iter()
        .map(|station| {
            let actual = haversine_km(origin, station.coordinate());
            let adjusted = if station.source_type.is_renewable() {
                (actual - RENEWABLE_BONUS_KM).max(0.0)
            } else {
                actual
            };
            RankedStation {
                station: station.clone(),
                actual_distance_km: actual,
                adjusted_distance_km: adjusted,
            }
        })
        .collect();

    if battery_percent > CRITICAL_BATTERY_PERCENT {
        ranked.sort_by(|a, b| by_distance(a.adjusted_distance_km, b.adjusted_distance_km));
    } else {
        ranked.sort_by(|a, b| by_distance(a.actual_distance_km, b.actual_distance_km));
    }

    Ok(ranked)
}

fn by_distance(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
