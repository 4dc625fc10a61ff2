//! Plain records exchanged with a schedule source.
//!
//! Field names follow the GTFS vocabulary. Times of day are kept as the
//! source's raw strings; the builder parses them so that a malformed value
//! is reported against the trip it belongs to.

use serde::{Deserialize, Serialize};

use crate::domain::{RouteId, StationId, StopId, TripId};

/// A scheduled line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub route_id: RouteId,
    pub route_long_name: String,
}

/// A single boarding point as listed under its station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopRecord {
    pub stop_id: StopId,
    pub stop_name: String,
}

/// An interchange complex with its member stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationRecord {
    pub station_id: StationId,
    pub station_name: String,

    /// Routes serving this station (display only).
    #[serde(default)]
    pub route_ids: Vec<RouteId>,

    pub stops: Vec<StopRecord>,
}

/// A walking connection between two stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub from_stop_id: StopId,
    pub to_stop_id: StopId,
    pub min_transfer_seconds: u32,
}

/// One stop-time of one trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEventRecord {
    pub trip_id: TripId,
    pub route_id: RouteId,

    /// Terminus label distinguishing branches of the same route.
    pub direction_label: String,

    pub stop_id: StopId,
    pub stop_sequence: u32,

    /// "HH:MM:SS", hours may be 24 or more.
    pub arrival_time_of_day: String,

    /// "HH:MM:SS", hours may be 24 or more.
    pub departure_time_of_day: String,
}
