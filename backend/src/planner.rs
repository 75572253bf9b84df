use std::time::Duration;

use crate::{
    directions::{navigation_url, DirectionsError, DirectionsProvider},
    error::{EngineError, ExportError},
    geo::path_distance_km,
    gpx_export::encode_trip_as_gpx,
    models::{Station, TripPlan, TripRequest, TripResponse},
    polyline,
    simulator::{self, validate_vehicle},
};

pub const DEFAULT_DIRECTIONS_TIMEOUT: Duration = Duration::from_secs(10);
pub const RANGE_RISK_WARNING: &str =
    "No charging stations found within 5 km of route at low battery points.";

/// Plan a trip end to end: one directions call, decode, simulate.
///
/// Inputs are validated before the provider is contacted. The provider call
/// is bounded by `timeout` and never retried; any failure, an undecodable
/// polyline or a route with fewer than two points fails the whole plan with
/// `RouteUnavailable`.
pub async fn plan_trip<D: DirectionsProvider>(
    directions: &D,
    request: &TripRequest,
    stations: &[Station],
    timeout: Duration,
) -> Result<TripPlan, EngineError> {
    validate_vehicle(request.battery_percent, request.efficiency_km_per_kwh)?;

    let encoded = tokio::time::timeout(
        timeout,
        directions.get_route(request.origin, request.destination, &[]),
    )
    .await
    .map_err(|_| DirectionsError::Timeout(timeout))??;

    let path = polyline::decode(&encoded)?;
    if path.len() < 2 {
        return Err(EngineError::RouteUnavailable(format!(
            "route decoded to {} point(s)",
            path.len()
        )));
    }

    let plan = simulator::plan(
        &path,
        request.battery_percent,
        request.efficiency_km_per_kwh,
        stations,
    )?;

    if plan.range_at_risk() {
        tracing::warn!(
            "range risk: {} low-battery point(s) and no charger within reach",
            plan.low_battery_points.len()
        );
    }

    Ok(plan)
}

/// Wrap a plan with the totals and hand-off links the API returns.
pub fn trip_response(request: &TripRequest, plan: TripPlan) -> Result<TripResponse, ExportError> {
    let distance_km = path_distance_km(&plan.path);
    let warning = plan.range_at_risk().then(|| RANGE_RISK_WARNING.to_string());
    let stops: Vec<_> = plan.charging_stops.iter().map(Station::coordinate).collect();
    let navigation_url = navigation_url(request.origin, request.destination, &stops);
    let gpx_base64 = encode_trip_as_gpx(&plan)?;

    Ok(TripResponse {
        plan,
        distance_km,
        warning,
        navigation_url,
        gpx_base64,
    })
}
