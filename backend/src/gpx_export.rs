use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};

use crate::error::ExportError;
use crate::models::{Coordinate, TripPlan};

const CREATOR: &str = "evroute";
const LOW_BATTERY_LABEL: &str = "Low battery";

/// GPX document for a planned trip, base64 encoded.
///
/// The route is written as a single track; charging stops and low-battery
/// points become named waypoints so navigation apps can show them.
pub fn encode_trip_as_gpx(plan: &TripPlan) -> Result<String, ExportError> {
    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(CREATOR.into()),
        ..Default::default()
    };
    let mut track = Track {
        name: Some("EV trip".into()),
        ..Default::default()
    };

    let mut segment = TrackSegment::new();
    segment.points.extend(plan.path.iter().map(to_waypoint));
    track.segments.push(segment);
    gpx.tracks.push(track);

    for stop in &plan.charging_stops {
        let mut waypoint = to_waypoint(&stop.coordinate());
        waypoint.name = Some(stop.name.clone());
        waypoint.description = Some(format!("Charging stop ({})", stop.id));
        gpx.waypoints.push(waypoint);
    }
    for point in &plan.low_battery_points {
        let mut waypoint = to_waypoint(point);
        waypoint.name = Some(LOW_BATTERY_LABEL.into());
        gpx.waypoints.push(waypoint);
    }

    let mut buffer = Vec::new();
    gpx::write(&gpx, &mut buffer)?;
    Ok(BASE64.encode(buffer))
}

fn to_waypoint(coord: &Coordinate) -> Waypoint {
    Waypoint::new(Point::new(coord.lng, coord.lat))
}
