//! Charging-time model and charger availability.
//!
//! Charging follows a two-phase curve: full effective power up to
//! [`FAST_PHASE_LIMIT_PERCENT`], half of it beyond, approximating the taper
//! real batteries show near full charge.

use chrono::{DateTime, Duration, Utc};

use crate::{
    error::EngineError,
    models::{
        ChargerRef, ChargerStatus, ChargerStatusCounts, ChargingSession, ChargingSessionParams,
        NextAvailable, StationAvailability,
    },
};

pub const FAST_PHASE_LIMIT_PERCENT: f64 = 80.0;
/// Share of the charger's rated power that reaches the battery when losses are modelled.
pub const LOSS_FACTOR: f64 = 0.9;
pub const SLOW_PHASE_POWER_FACTOR: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    /// Rounded to one decimal place.
    Minutes,
    /// Rounded to two decimal places.
    Hours,
}

/// Time to charge from the current to the target level, in minutes.
pub fn session_duration(params: &ChargingSessionParams) -> Result<f64, EngineError> {
    session_duration_in(params, DurationUnit::Minutes)
}

pub fn session_duration_in(
    params: &ChargingSessionParams,
    unit: DurationUnit,
) -> Result<f64, EngineError> {
    let hours = charging_hours(params)?;
    let duration = match unit {
        DurationUnit::Minutes => round_to(hours * 60.0, 1),
        DurationUnit::Hours => round_to(hours, 2),
    };
    if !duration.is_finite() {
        return Err(EngineError::InvalidInput(format!(
            "charging {} kWh at {} kW does not finish in a representable time",
            params.battery_capacity_kwh, params.charging_power_kw
        )));
    }
    Ok(duration)
}

/// Earliest ETA among plugged-in chargers that report one.
pub fn soonest_available(chargers: &[ChargerRef]) -> Option<DateTime<Utc>> {
    chargers.iter().filter_map(ChargerRef::known_eta).min()
}

/// Session record for a vehicle plugging in at `now`.
pub fn start_session(
    params: &ChargingSessionParams,
    now: DateTime<Utc>,
) -> Result<ChargingSession, EngineError> {
    let minutes = session_duration(params)?;
    let millis = (minutes * 60_000.0).round();
    let eta = (millis < i64::MAX as f64)
        .then(|| Duration::try_milliseconds(millis as i64))
        .flatten()
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| {
            EngineError::InvalidInput(format!(
                "a {minutes} minute session has no representable end time"
            ))
        })?;

    Ok(ChargingSession {
        start_time: now,
        eta: Some(eta),
        charging_minutes: Some(minutes),
    })
}

/// Status counts for a station's chargers, plus the next charger to free up
/// when every working charger is busy.
pub fn station_availability(chargers: &[ChargerRef], now: DateTime<Utc>) -> StationAvailability {
    let counts = chargers
        .iter()
        .fold(ChargerStatusCounts::default(), |mut counts, charger| {
            match charger.status {
                ChargerStatus::Available => counts.available += 1,
                ChargerStatus::PluggedIn => counts.plugged_in += 1,
                ChargerStatus::Faulty => counts.faulty += 1,
            }
            counts
        });

    let next_available = if counts.available == 0 && counts.plugged_in > 0 {
        chargers
            .iter()
            .filter_map(|charger| charger.known_eta().map(|eta| (charger, eta)))
            .min_by_key(|(_, eta)| *eta)
            .map(|(charger, eta)| NextAvailable {
                charger_id: charger.id.clone(),
                charger_name: charger.name.clone(),
                eta,
                minutes_left: minutes_until(now, eta),
            })
    } else {
        None
    };

    let message = next_available.as_ref().map(|next| {
        format!(
            "{} will be available after {} minutes",
            next.charger_name, next.minutes_left
        )
    });

    StationAvailability {
        counts,
        next_available,
        message,
    }
}

fn validate(params: &ChargingSessionParams) -> Result<(), EngineError> {
    let ChargingSessionParams {
        battery_capacity_kwh: capacity,
        current_charge_percent: current,
        target_charge_percent: target,
        charging_power_kw: power,
        ..
    } = *params;

    if [capacity, current, target, power].iter().any(|v| !v.is_finite()) {
        return Err(EngineError::InvalidInput(
            "charging parameters must be finite numbers".into(),
        ));
    }
    if capacity <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "battery capacity must be positive, got {capacity} kWh"
        )));
    }
    if !(0.0..=100.0).contains(&current) || !(0.0..=100.0).contains(&target) {
        return Err(EngineError::InvalidInput(format!(
            "charge levels must be between 0 and 100, got {current}% -> {target}%"
        )));
    }
    if power <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "charging power must be positive, got {power} kW"
        )));
    }
    if current >= target {
        return Err(EngineError::InvalidInput(format!(
            "target charge {target}% must exceed current charge {current}%"
        )));
    }
    Ok(())
}

fn charging_hours(params: &ChargingSessionParams) -> Result<f64, EngineError> {
    validate(params)?;

    let capacity = params.battery_capacity_kwh;
    let current = params.current_charge_percent;
    let target = params.target_charge_percent;
    let effective_power = if params.include_loss {
        params.charging_power_kw * LOSS_FACTOR
    } else {
        params.charging_power_kw
    };

    let mut hours = 0.0;

    let fast_end = target.min(FAST_PHASE_LIMIT_PERCENT);
    if current < fast_end {
        let energy = capacity * (fast_end - current) / 100.0;
        hours += energy / effective_power;
    }

    if target > FAST_PHASE_LIMIT_PERCENT {
        let energy = capacity * (target - current.max(FAST_PHASE_LIMIT_PERCENT)) / 100.0;
        hours += energy / (effective_power * SLOW_PHASE_POWER_FACTOR);
    }

    if !hours.is_finite() {
        return Err(EngineError::InvalidInput(format!(
            "charging {capacity} kWh at {effective_power} kW has no finite duration"
        )));
    }
    Ok(hours)
}

/// Whole minutes until `eta`, rounded up; zero once the ETA has passed.
fn minutes_until(now: DateTime<Utc>, eta: DateTime<Utc>) -> i64 {
    let millis = (eta - now).num_milliseconds();
    ((millis as f64) / 60_000.0).ceil().max(0.0) as i64
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round() / scale
}
