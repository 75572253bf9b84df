use std::{sync::Arc, time::Duration};

use axum::{
    body::{Body, to_bytes},
    http::Request,
};
use evroute::{
    AppState,
    catalog::StationCatalog,
    create_router,
    directions::{DirectionsError, DirectionsProvider},
    models::{
        AvailabilityResponse, ChargingEstimate, Coordinate, RankedStation, StationSummary,
        TripResponse,
    },
    planner::RANGE_RISK_WARNING,
    polyline,
};
use hyper::StatusCode;
use serde_json::{Value, json};
use tower::ServiceExt;

const SAMPLE_STATIONS: &str = include_str!("../data/sample_stations.json");

/// Returns the same route for every request, or fails when none is set.
struct FixedRoute(Option<String>);

impl DirectionsProvider for FixedRoute {
    async fn get_route(
        &self,
        _origin: Coordinate,
        _destination: Coordinate,
        _waypoints: &[Coordinate],
    ) -> Result<String, DirectionsError> {
        self.0
            .clone()
            .ok_or_else(|| DirectionsError::NoRoute("ZERO_RESULTS".into()))
    }
}

/// Grenoble to Lyon, passing right by Voiron and Bourgoin-Jallieu.
fn grenoble_to_lyon() -> Vec<Coordinate> {
    vec![
        Coordinate::new(45.1885, 5.7245),
        Coordinate::new(45.2800, 5.6500),
        Coordinate::new(45.3640, 5.5894),
        Coordinate::new(45.4700, 5.4300),
        Coordinate::new(45.5867, 5.2736),
        Coordinate::new(45.6800, 5.0500),
        Coordinate::new(45.7606, 4.8596),
    ]
}

fn test_app(route: Option<String>) -> axum::Router {
    let catalog = StationCatalog::from_reader(SAMPLE_STATIONS.as_bytes()).expect("catalog");
    let state = AppState {
        catalog: Arc::new(catalog),
        directions: Arc::new(FixedRoute(route)),
        directions_timeout: Duration::from_secs(2),
    };
    create_router(state)
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn body_of<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn trip_payload(battery_percent: f64) -> Value {
    json!({
        "origin": {"lat": 45.1885, "lng": 5.7245},
        "destination": {"lat": 45.7606, "lng": 4.8596},
        "battery_percent": battery_percent,
        "efficiency_km_per_kwh": 1.0
    })
}

#[tokio::test]
async fn trip_endpoint_plans_charging_stops() {
    let app = test_app(Some(polyline::encode(&grenoble_to_lyon())));

    let response = app
        .oneshot(post_json("/api/trip", trip_payload(40.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: TripResponse = body_of(response).await;
    assert_eq!(body.plan.path.len(), 7);
    assert!(body.distance_km > 90.0);
    assert!(!body.plan.charging_stops.is_empty());
    assert_eq!(body.plan.charging_stops[0].id, "voiron-centre");
    assert!(body.warning.is_none());
    assert!(body.navigation_url.contains("waypoints="));
    assert!(!body.gpx_base64.is_empty());
}

#[tokio::test]
async fn trip_without_reachable_station_carries_warning() {
    let far_route = vec![
        Coordinate::new(44.0, 3.0),
        Coordinate::new(44.2, 3.0),
        Coordinate::new(44.4, 3.0),
    ];
    let app = test_app(Some(polyline::encode(&far_route)));

    let response = app
        .oneshot(post_json("/api/trip", trip_payload(25.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: TripResponse = body_of(response).await;
    assert!(body.plan.charging_stops.is_empty());
    assert!(!body.plan.low_battery_points.is_empty());
    assert_eq!(body.warning.as_deref(), Some(RANGE_RISK_WARNING));
}

#[tokio::test]
async fn trip_rejects_invalid_battery() {
    let app = test_app(Some(polyline::encode(&grenoble_to_lyon())));

    let response = app
        .oneshot(post_json("/api/trip", trip_payload(0.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = body_of(response).await;
    assert!(body["message"].as_str().unwrap().contains("battery"));
}

#[tokio::test]
async fn trip_reports_unavailable_route() {
    let app = test_app(None);

    let response = app
        .oneshot(post_json("/api/trip", trip_payload(60.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn stations_endpoint_lists_availability() {
    let app = test_app(None);

    let request = Request::builder()
        .uri("/api/stations")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Vec<StationSummary> = body_of(response).await;
    assert_eq!(body.len(), 5);

    let voiron = body
        .iter()
        .find(|s| s.station.id == "voiron-centre")
        .expect("voiron listed");
    assert_eq!(voiron.availability.counts.plugged_in, 2);
    assert_eq!(voiron.availability.counts.faulty, 1);
    assert_eq!(
        voiron.availability.next_available.as_ref().map(|n| n.charger_id.as_str()),
        Some("vc-2")
    );

    let grenoble = body
        .iter()
        .find(|s| s.station.id == "grenoble-gare")
        .expect("grenoble listed");
    assert!(grenoble.availability.next_available.is_none());
    assert!(grenoble.availability.message.is_none());
}

#[tokio::test]
async fn nearest_prefers_renewable_with_comfortable_battery() {
    let app = test_app(None);
    // Between Voiron (non-renewable) and Grenoble (renewable), slightly closer to Voiron
    let payload = json!({
        "user_location": {"lat": 45.2900, "lng": 5.6400},
        "battery_percent": 70.0
    });

    let response = app
        .clone()
        .oneshot(post_json("/api/stations/nearest", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ranked: Vec<RankedStation> = body_of(response).await;
    assert_eq!(ranked.len(), 5);
    assert_eq!(ranked[0].station.id, "grenoble-gare");

    let critical = json!({
        "user_location": {"lat": 45.2900, "lng": 5.6400},
        "battery_percent": 15.0
    });
    let response = app
        .oneshot(post_json("/api/stations/nearest", critical))
        .await
        .unwrap();
    let ranked: Vec<RankedStation> = body_of(response).await;
    assert_eq!(ranked[0].station.id, "voiron-centre");
}

#[tokio::test]
async fn nearest_rejects_out_of_range_battery() {
    let app = test_app(None);
    let payload = json!({
        "user_location": {"lat": 45.0, "lng": 5.0},
        "battery_percent": 140.0
    });

    let response = app
        .oneshot(post_json("/api/stations/nearest", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn charging_estimate_reports_both_units() {
    let app = test_app(None);
    let payload = json!({
        "battery_capacity_kwh": 60.0,
        "current_charge_percent": 20.0,
        "target_charge_percent": 80.0,
        "charging_power_kw": 50.0
    });

    let response = app
        .oneshot(post_json("/api/charging/estimate", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let estimate: ChargingEstimate = body_of(response).await;
    // 36 kWh at 45 kW effective
    assert_eq!(estimate.minutes, 48.0);
    assert_eq!(estimate.hours, 0.8);
    assert_eq!(estimate.session.charging_minutes, Some(48.0));
    let eta = estimate.session.eta.expect("eta");
    assert_eq!((eta - estimate.session.start_time).num_minutes(), 48);
}

#[tokio::test]
async fn charging_estimate_rejects_zero_power() {
    let app = test_app(None);
    let payload = json!({
        "battery_capacity_kwh": 60.0,
        "current_charge_percent": 20.0,
        "target_charge_percent": 80.0,
        "charging_power_kw": 0.0
    });

    let response = app
        .oneshot(post_json("/api/charging/estimate", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn availability_returns_soonest_eta() {
    let app = test_app(None);
    let payload = json!({
        "chargers": [
            {"id": "a", "status": "plugged-in", "session": {"start_time": "2025-06-01T10:00:00Z", "eta": "2025-06-01T11:00:00Z"}},
            {"id": "b", "status": "plugged-in", "session": {"start_time": "2025-06-01T10:00:00Z", "eta": "2025-06-01T10:30:00Z"}},
            {"id": "c", "status": "available", "session": {"start_time": "2025-06-01T09:00:00Z", "eta": "2025-06-01T09:10:00Z"}},
            {"id": "d", "status": "faulty"}
        ]
    });

    let response = app
        .clone()
        .oneshot(post_json("/api/chargers/availability", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: AvailabilityResponse = body_of(response).await;
    assert_eq!(
        body.soonest_eta.map(|eta| eta.to_rfc3339()),
        Some("2025-06-01T10:30:00+00:00".to_string())
    );

    let response = app
        .oneshot(post_json("/api/chargers/availability", json!({"chargers": []})))
        .await
        .unwrap();
    let body: AvailabilityResponse = body_of(response).await;
    assert!(body.soonest_eta.is_none());
}

#[tokio::test]
async fn charging_estimate_rejects_unrepresentable_session() {
    let app = test_app(None);
    let payload = json!({
        "battery_capacity_kwh": 1e9,
        "current_charge_percent": 0.0,
        "target_charge_percent": 100.0,
        "charging_power_kw": 1e-9
    });

    let response = app
        .oneshot(post_json("/api/charging/estimate", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
