use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Renders as `lat,lng`, the form directions providers take in query strings.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    Renewable,
    #[default]
    NonRenewable,
}

impl SourceType {
    pub fn is_renewable(self) -> bool {
        matches!(self, SourceType::Renewable)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChargerStatus {
    #[default]
    Available,
    #[serde(alias = "plugged in")]
    PluggedIn,
    Faulty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargingSession {
    pub start_time: DateTime<Utc>,
    /// Expected plug-out time; `None` when the session length is unknown.
    #[serde(default)]
    pub eta: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charging_minutes: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargerRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: ChargerStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<ChargingSession>,
}

impl ChargerRef {
    /// ETA of the running session, only for plugged-in chargers that report one.
    pub fn known_eta(&self) -> Option<DateTime<Utc>> {
        match self.status {
            ChargerStatus::PluggedIn => self.session.as_ref().and_then(|s| s.eta),
            ChargerStatus::Available | ChargerStatus::Faulty => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub chargers: Vec<ChargerRef>,
}

impl Station {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPlan {
    pub path: Vec<Coordinate>,
    pub charging_stops: Vec<Station>,
    pub low_battery_points: Vec<Coordinate>,
}

impl TripPlan {
    /// The battery ran low somewhere along the route and no charger was in reach.
    pub fn range_at_risk(&self) -> bool {
        self.charging_stops.is_empty() && !self.low_battery_points.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChargingSessionParams {
    pub battery_capacity_kwh: f64,
    pub current_charge_percent: f64,
    pub target_charge_percent: f64,
    pub charging_power_kw: f64,
    #[serde(default = "default_include_loss")]
    pub include_loss: bool,
}

pub fn default_include_loss() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub battery_percent: f64,
    pub efficiency_km_per_kwh: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripResponse {
    #[serde(flatten)]
    pub plan: TripPlan,
    pub distance_km: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub navigation_url: String,
    pub gpx_base64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearestStationsRequest {
    pub user_location: Coordinate,
    pub battery_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedStation {
    #[serde(flatten)]
    pub station: Station,
    pub actual_distance_km: f64,
    pub adjusted_distance_km: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargerStatusCounts {
    pub available: usize,
    pub plugged_in: usize,
    pub faulty: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextAvailable {
    pub charger_id: String,
    pub charger_name: String,
    pub eta: DateTime<Utc>,
    pub minutes_left: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationAvailability {
    pub counts: ChargerStatusCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_available: Option<NextAvailable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationSummary {
    #[serde(flatten)]
    pub station: Station,
    pub availability: StationAvailability,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargingEstimate {
    pub minutes: f64,
    pub hours: f64,
    pub session: ChargingSession,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub chargers: Vec<ChargerRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub soonest_eta: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
