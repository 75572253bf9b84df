pub mod catalog;
pub mod charging;
pub mod config;
pub mod directions;
pub mod error;
pub mod geo;
pub mod gpx_export;
pub mod models;
pub mod planner;
pub mod polyline;
pub mod simulator;
pub mod stations;

use std::{sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};

use crate::catalog::StationCatalog;
use crate::charging::{DurationUnit, session_duration_in, soonest_available, start_session};
use crate::directions::DirectionsProvider;
use crate::error::{EngineError, ExportError};
use crate::models::{
    ApiError, AvailabilityRequest, AvailabilityResponse, ChargingEstimate, ChargingSessionParams,
    NearestStationsRequest, RankedStation, TripRequest, TripResponse,
};
use crate::planner::{plan_trip, trip_response};
use crate::stations::rank_by_preference;

pub struct AppState<D> {
    pub catalog: Arc<StationCatalog>,
    pub directions: Arc<D>,
    pub directions_timeout: Duration,
}

// Derived Clone would require `D: Clone`.
impl<D> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            directions: Arc::clone(&self.directions),
            directions_timeout: self.directions_timeout,
        }
    }
}

pub fn create_router<D: DirectionsProvider + 'static>(state: AppState<D>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/trip", post(trip_handler::<D>))
        .route("/api/stations", get(stations_handler::<D>))
        .route("/api/stations/nearest", post(nearest_handler::<D>))
        .route("/api/charging/estimate", post(estimate_handler))
        .route("/api/chargers/availability", post(availability_handler))
        .layer(cors)
        .with_state(state)
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

async fn trip_handler<D: DirectionsProvider>(
    State(state): State<AppState<D>>,
    Json(req): Json<TripRequest>,
) -> ApiResult<TripResponse> {
    let plan = plan_trip(
        state.directions.as_ref(),
        &req,
        state.catalog.stations(),
        state.directions_timeout,
    )
    .await
    .map_err(engine_error)?;
    tracing::info!(
        "planned trip {} -> {}: {} stop(s), {} low-battery point(s)",
        req.origin,
        req.destination,
        plan.charging_stops.len(),
        plan.low_battery_points.len()
    );

    let response = trip_response(&req, plan).map_err(export_error)?;
    Ok(Json(response))
}

async fn stations_handler<D>(State(state): State<AppState<D>>) -> impl IntoResponse {
    Json(state.catalog.summaries(Utc::now()))
}

async fn nearest_handler<D>(
    State(state): State<AppState<D>>,
    Json(req): Json<NearestStationsRequest>,
) -> ApiResult<Vec<RankedStation>> {
    let ranked = rank_by_preference(req.user_location, state.catalog.stations(), req.battery_percent)
        .map_err(engine_error)?;
    Ok(Json(ranked))
}

async fn estimate_handler(Json(params): Json<ChargingSessionParams>) -> ApiResult<ChargingEstimate> {
    let minutes = session_duration_in(&params, DurationUnit::Minutes).map_err(engine_error)?;
    let hours = session_duration_in(&params, DurationUnit::Hours).map_err(engine_error)?;
    let session = start_session(&params, Utc::now()).map_err(engine_error)?;

    Ok(Json(ChargingEstimate {
        minutes,
        hours,
        session,
    }))
}

async fn availability_handler(Json(req): Json<AvailabilityRequest>) -> Json<AvailabilityResponse> {
    Json(AvailabilityResponse {
        soonest_eta: soonest_available(&req.chargers),
    })
}

fn engine_error(err: EngineError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        EngineError::RouteUnavailable(_) => StatusCode::BAD_GATEWAY,
    };
    tracing::warn!("request failed with {status}: {err}");
    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}

fn export_error(err: ExportError) -> (StatusCode, Json<ApiError>) {
    tracing::error!("failed to export trip: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}
