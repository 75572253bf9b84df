pub use shared::{
    ApiError, AvailabilityRequest, AvailabilityResponse, ChargerRef, ChargerStatus,
    ChargerStatusCounts, ChargingEstimate, ChargingSession, ChargingSessionParams, Coordinate,
    NearestStationsRequest, NextAvailable, RankedStation, SourceType, Station,
    StationAvailability, StationSummary, TripPlan, TripRequest, TripResponse,
};
