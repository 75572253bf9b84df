use std::{future::Future, time::Duration};

use reqwest::Url;
use serde::Deserialize;

use crate::{models::Coordinate, polyline::format_waypoints};

pub const DEFAULT_DIRECTIONS_BASE_URL: &str = "https://maps.googleapis.com";
const DIRECTIONS_PATH: &str = "/maps/api/directions/json";
const NAVIGATION_URL: &str = "https://www.google.com/maps/dir/";

/// Source of driving routes (Dependency Inversion Principle)
///
/// The planner only needs an encoded polyline for a single origin,
/// destination and waypoint list. Abstracting the provider allows:
/// - **Testing**: canned polylines or failures without network access
/// - **Providers**: Google Directions in production, anything else that
///   speaks the encoded polyline format
///
/// # Contract
/// - Return the encoded overview polyline of the first route
/// - Return `DirectionsError::NoRoute` when the provider has no route
/// - Never retry internally; one call per request
pub trait DirectionsProvider: Send + Sync {
    fn get_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        waypoints: &[Coordinate],
    ) -> impl Future<Output = Result<String, DirectionsError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectionsError {
    #[error("directions request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("directions provider answered with HTTP {0}")]
    Status(u16),
    #[error("no route found: {0}")]
    NoRoute(String),
    #[error("directions request timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid directions endpoint: {0}")]
    Endpoint(String),
}

#[derive(Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Deserialize)]
struct DirectionsRoute {
    overview_polyline: OverviewPolyline,
}

#[derive(Deserialize)]
struct OverviewPolyline {
    points: String,
}

/// Google Directions API client.
#[derive(Clone)]
pub struct GoogleDirections {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl GoogleDirections {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, DirectionsError> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join(DIRECTIONS_PATH))
            .map_err(|err| DirectionsError::Endpoint(format!("{base_url}: {err}")))?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
        })
    }

    fn request_url(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        waypoints: &[Coordinate],
    ) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("origin", &origin.to_string())
                .append_pair("destination", &destination.to_string());
            if !waypoints.is_empty() {
                query.append_pair("waypoints", &format_waypoints(waypoints));
            }
            if let Some(key) = &self.api_key {
                query.append_pair("key", key);
            }
        }
        url
    }
}

impl DirectionsProvider for GoogleDirections {
    async fn get_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        waypoints: &[Coordinate],
    ) -> Result<String, DirectionsError> {
        let url = self.request_url(origin, destination, waypoints);
        tracing::debug!(
            "requesting directions {origin} -> {destination} via {} waypoint(s)",
            waypoints.len()
        );

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DirectionsError::Status(status.as_u16()));
        }

        let body: DirectionsResponse = response.json().await?;
        let provider_status = body.status.unwrap_or_else(|| "UNKNOWN".to_string());
        let encoded = body
            .routes
            .into_iter()
            .next()
            .map(|route| route.overview_polyline.points)
            .filter(|points| !points.is_empty())
            .ok_or(DirectionsError::NoRoute(provider_status))?;

        Ok(encoded)
    }
}

/// Google Maps deep link that drives from `origin` to `destination` through
/// the given charging stops.
pub fn navigation_url(origin: Coordinate, destination: Coordinate, stops: &[Coordinate]) -> String {
    let mut params = vec![
        ("api", "1".to_string()),
        ("origin", origin.to_string()),
        ("destination", destination.to_string()),
        ("travelmode", "driving".to_string()),
    ];
    if !stops.is_empty() {
        params.push(("waypoints", format_waypoints(stops)));
    }

    match Url::parse_with_params(NAVIGATION_URL, &params) {
        Ok(url) => url.into(),
        // NAVIGATION_URL is a valid constant
        Err(_) => NAVIGATION_URL.to_string(),
    }
}
