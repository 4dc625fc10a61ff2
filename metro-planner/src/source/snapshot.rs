//! In-memory schedule source loaded from a JSON feed snapshot.
//!
//! A snapshot holds the cleaned records of a feed: routes, stations with
//! their stops, transfers, service calendars and trips with their stop
//! times. It answers [`ScheduleSource`] queries by filtering trips on their
//! service calendar and stop times on the requested window.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{RouteId, ServiceCalendar, StopId, TimeOfDay, TripId};

use super::error::SourceError;
use super::records::{RouteRecord, ScheduleEventRecord, StationRecord, TransferRecord};
use super::ScheduleSource;

/// One stop-time of a trip in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopTimeRecord {
    pub stop_id: StopId,
    pub stop_sequence: u32,
    pub arrival_time: String,
    pub departure_time: String,
}

/// A trip in a snapshot with its stop times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRecord {
    pub trip_id: TripId,
    pub route_id: RouteId,

    /// Key into [`FeedSnapshot::services`].
    pub service_id: String,

    /// Headsign of the trip, used as its direction label.
    pub direction_label: String,

    pub stop_times: Vec<StopTimeRecord>,
}

/// Schedule source serving records from memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedSnapshot {
    #[serde(default)]
    pub routes: Vec<RouteRecord>,

    #[serde(default)]
    pub stations: Vec<StationRecord>,

    #[serde(default)]
    pub transfers: Vec<TransferRecord>,

    /// Service calendars keyed by service id.
    #[serde(default)]
    pub services: BTreeMap<String, ServiceCalendar>,

    #[serde(default)]
    pub trips: Vec<TripRecord>,
}

impl FeedSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, SourceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a snapshot from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let snapshot = Self::from_json_str(&json)?;
        debug!(
            path = %path.display(),
            routes = snapshot.routes.len(),
            stations = snapshot.stations.len(),
            trips = snapshot.trips.len(),
            "Loaded feed snapshot"
        );
        Ok(snapshot)
    }

    /// Returns true if the trip's service runs on the date.
    fn trip_runs(&self, trip: &TripRecord, date: NaiveDate) -> bool {
        match self.services.get(&trip.service_id) {
            Some(calendar) => calendar.is_active(date),
            None => {
                warn!(
                    trip = %trip.trip_id,
                    service = %trip.service_id,
                    "Trip references unknown service, treating as inactive"
                );
                false
            }
        }
    }
}

/// Fixture builders, panicking on invalid identifiers.
#[cfg(test)]
impl FeedSnapshot {
    /// Add a route.
    pub(crate) fn with_route(mut self, route_id: &str, long_name: &str) -> Self {
        self.routes.push(RouteRecord {
            route_id: fixture_id(route_id),
            route_long_name: long_name.to_string(),
        });
        self
    }

    /// Add a station with its `(stop_id, stop_name)` stops.
    pub(crate) fn with_station(
        mut self,
        station_id: &str,
        name: &str,
        route_ids: &[&str],
        stops: &[(&str, &str)],
    ) -> Self {
        let stops = stops
            .iter()
            .map(|(id, stop_name)| super::records::StopRecord {
                stop_id: fixture_id(id),
                stop_name: (*stop_name).to_string(),
            })
            .collect();

        self.stations.push(StationRecord {
            station_id: fixture_id(station_id),
            station_name: name.to_string(),
            route_ids: route_ids.iter().map(|id| fixture_id(id)).collect(),
            stops,
        });
        self
    }

    /// Add a transfer between two stops.
    pub(crate) fn with_transfer(mut self, from: &str, to: &str, seconds: u32) -> Self {
        self.transfers.push(TransferRecord {
            from_stop_id: fixture_id(from),
            to_stop_id: fixture_id(to),
            min_transfer_seconds: seconds,
        });
        self
    }

    /// Add a service calendar.
    pub(crate) fn with_service(mut self, service_id: &str, calendar: ServiceCalendar) -> Self {
        self.services.insert(service_id.to_string(), calendar);
        self
    }

    /// Add a trip with `(stop_id, arrival, departure)` stop times, numbered
    /// from sequence 1 in the given order.
    pub(crate) fn with_trip(
        mut self,
        trip_id: &str,
        route_id: &str,
        service_id: &str,
        direction_label: &str,
        stop_times: &[(&str, &str, &str)],
    ) -> Self {
        let stop_times = stop_times
            .iter()
            .zip(1u32..)
            .map(|((stop_id, arr, dep), seq)| StopTimeRecord {
                stop_id: fixture_id(stop_id),
                stop_sequence: seq,
                arrival_time: (*arr).to_string(),
                departure_time: (*dep).to_string(),
            })
            .collect();

        self.trips.push(TripRecord {
            trip_id: fixture_id(trip_id),
            route_id: fixture_id(route_id),
            service_id: service_id.to_string(),
            direction_label: direction_label.to_string(),
            stop_times,
        });
        self
    }
}

#[cfg(test)]
fn fixture_id<T>(s: &str) -> T
where
    T: std::str::FromStr<Err = crate::domain::InvalidId>,
{
    s.parse().unwrap_or_else(|e| panic!("{s:?}: {e}"))
}

/// Returns true if the stop time belongs in the window.
///
/// Unparseable times are kept so that the builder can report them.
fn in_window(stop_time: &StopTimeRecord, date: NaiveDate, from: NaiveDateTime, to: NaiveDateTime) -> bool {
    let instant = |s: &str| TimeOfDay::parse(s).map(|t| t.on(date));

    match (
        instant(&stop_time.arrival_time),
        instant(&stop_time.departure_time),
    ) {
        (Ok(arr), Ok(dep)) => (from <= arr && arr <= to) || (from <= dep && dep <= to),
        _ => true,
    }
}

impl ScheduleSource for FeedSnapshot {
    async fn fetch_routes(&self) -> Result<Vec<RouteRecord>, SourceError> {
        Ok(self.routes.clone())
    }

    async fn fetch_stations_with_stops(&self) -> Result<Vec<StationRecord>, SourceError> {
        Ok(self.stations.clone())
    }

    async fn fetch_transfers(&self) -> Result<Vec<TransferRecord>, SourceError> {
        Ok(self.transfers.clone())
    }

    async fn fetch_schedule_events(
        &self,
        date: NaiveDate,
        window_start: TimeOfDay,
        window_end: TimeOfDay,
    ) -> Result<Vec<ScheduleEventRecord>, SourceError> {
        let from = window_start.on(date);
        let to = window_end.on(date);

        let events: Vec<ScheduleEventRecord> = self
            .trips
            .iter()
            .filter(|trip| self.trip_runs(trip, date))
            .flat_map(|trip| {
                trip.stop_times
                    .iter()
                    .filter(move |st| in_window(st, date, from, to))
                    .map(move |st| ScheduleEventRecord {
                        trip_id: trip.trip_id.clone(),
                        route_id: trip.route_id.clone(),
                        direction_label: trip.direction_label.clone(),
                        stop_id: st.stop_id.clone(),
                        stop_sequence: st.stop_sequence,
                        arrival_time_of_day: st.arrival_time.clone(),
                        departure_time_of_day: st.departure_time.clone(),
                    })
            })
            .collect();

        debug!(
            %date,
            %window_start,
            %window_end,
            events = events.len(),
            "Filtered schedule events"
        );
        Ok(events)
    }
}
