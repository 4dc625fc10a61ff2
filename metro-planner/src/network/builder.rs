//! Network construction from schedule records.
//!
//! Building runs in two phases. The four record sets are fetched
//! concurrently since none depends on another. Once all of them are in,
//! stations, transfers and events are indexed and each trip's events are
//! sorted by stop sequence and linked to their neighbors.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::domain::{RouteId, StationId, StopId, TimeOfDay, TripId};
use crate::source::{
    RouteRecord, ScheduleEventRecord, ScheduleSource, StationRecord, TransferRecord,
};

use super::error::{BuildError, DataDefect};
use super::transfers::{self, TransferMap};
use super::{
    EventId, Network, Route, RouteIdx, ScheduleEvent, Station, StationIdx, Stop, StopIdx, Trip,
    TripIdx,
};

/// Build the time-expanded network for a service date and window.
///
/// # Errors
///
/// - [`BuildError::InvalidWindow`] if `window_start` is after `window_end`
/// - [`BuildError::NotFound`] if there are no routes, or no trip calls
///   within the window on that date
/// - [`BuildError::Inconsistent`] if a stop-time references an unknown
///   route or stop, carries an unparseable time, or a stop is listed under
///   two stations
/// - [`BuildError::Source`] if any fetch fails
pub async fn build_network<S: ScheduleSource>(
    source: &S,
    date: NaiveDate,
    window_start: TimeOfDay,
    window_end: TimeOfDay,
) -> Result<Network, BuildError> {
    if window_start > window_end {
        return Err(BuildError::InvalidWindow {
            start: window_start,
            end: window_end,
        });
    }

    let (routes, stations, transfers, events) = futures::try_join!(
        source.fetch_routes(),
        source.fetch_stations_with_stops(),
        source.fetch_transfers(),
        source.fetch_schedule_events(date, window_start, window_end),
    )?;

    debug!(
        routes = routes.len(),
        stations = stations.len(),
        transfers = transfers.len(),
        events = events.len(),
        "Fetched schedule records"
    );

    if routes.is_empty() {
        return Err(BuildError::NotFound {
            date,
            reason: "no routes",
        });
    }
    if events.is_empty() {
        return Err(BuildError::NotFound {
            date,
            reason: "no trip calls within the window",
        });
    }

    let mut builder = NetworkBuilder::new(date, window_start, window_end);
    builder.add_routes(routes)?;
    builder.add_stations(stations)?;
    builder.add_transfers(transfers);
    let pending = builder.group_events(events)?;
    builder.link_trips(pending);

    let network = builder.finish();
    info!(
        %date,
        stations = network.station_count(),
        stops = network.stop_count(),
        trips = network.trip_count(),
        events = network.event_count(),
        defects = network.defects().len(),
        "Built network"
    );
    Ok(network)
}

/// A parsed stop-time not yet placed in the arena.
#[derive(Debug)]
struct PendingEvent {
    stop: StopIdx,
    sequence: u32,
    arrival: NaiveDateTime,
    departure: NaiveDateTime,
}

/// A trip's parsed stop-times, in fetch order.
#[derive(Debug)]
struct PendingTrip {
    route: RouteIdx,
    direction: String,
    events: Vec<PendingEvent>,
}

struct NetworkBuilder {
    date: NaiveDate,
    window_start: TimeOfDay,
    window_end: TimeOfDay,
    stations: Vec<Station>,
    stops: Vec<Stop>,
    transfer_maps: Vec<TransferMap>,
    routes: Vec<Route>,
    trips: Vec<Trip>,
    events: Vec<ScheduleEvent>,
    station_index: HashMap<StationId, StationIdx>,
    stop_index: HashMap<StopId, StopIdx>,
    route_index: HashMap<RouteId, RouteIdx>,
    defects: Vec<DataDefect>,
}

impl NetworkBuilder {
    fn new(date: NaiveDate, window_start: TimeOfDay, window_end: TimeOfDay) -> Self {
        Self {
            date,
            window_start,
            window_end,
            stations: Vec::new(),
            stops: Vec::new(),
            transfer_maps: Vec::new(),
            routes: Vec::new(),
            trips: Vec::new(),
            events: Vec::new(),
            station_index: HashMap::new(),
            stop_index: HashMap::new(),
            route_index: HashMap::new(),
            defects: Vec::new(),
        }
    }

    fn defect(&mut self, defect: DataDefect) {
        warn!(%defect, "Schedule data defect");
        self.defects.push(defect);
    }

    fn add_routes(&mut self, routes: Vec<RouteRecord>) -> Result<(), BuildError> {
        for record in routes {
            if self.route_index.contains_key(&record.route_id) {
                return Err(BuildError::Inconsistent(format!(
                    "route {} is listed twice",
                    record.route_id
                )));
            }

            let idx = RouteIdx(self.routes.len());
            self.route_index.insert(record.route_id.clone(), idx);
            self.routes.push(Route {
                id: record.route_id,
                long_name: record.route_long_name,
                trips: BTreeMap::new(),
            });
        }
        Ok(())
    }

    fn add_stations(&mut self, stations: Vec<StationRecord>) -> Result<(), BuildError> {
        for record in stations {
            if self.station_index.contains_key(&record.station_id) {
                return Err(BuildError::Inconsistent(format!(
                    "station {} is listed twice",
                    record.station_id
                )));
            }

            let station_idx = StationIdx(self.stations.len());
            let mut stops = Vec::with_capacity(record.stops.len());

            for stop in record.stops {
                if let Some(existing) = self.stop_index.get(&stop.stop_id) {
                    let owner = &self.stations[self.stops[existing.0].station.0].id;
                    return Err(BuildError::Inconsistent(format!(
                        "stop {} belongs to both {} and {}",
                        stop.stop_id, owner, record.station_id
                    )));
                }

                let stop_idx = StopIdx(self.stops.len());
                self.stop_index.insert(stop.stop_id.clone(), stop_idx);
                self.stops.push(Stop {
                    id: stop.stop_id,
                    name: stop.stop_name,
                    station: station_idx,
                    events: Vec::new(),
                    transfers: TransferMap::new(),
                });
                self.transfer_maps.push(TransferMap::new());
                stops.push(stop_idx);
            }

            let mut routes = BTreeMap::new();
            for route_id in record.route_ids {
                match self.route_index.get(&route_id).copied() {
                    Some(idx) => {
                        routes.insert(route_id, self.routes[idx.0].long_name.clone());
                    }
                    None => self.defect(DataDefect::UnknownStationRoute {
                        station: record.station_id.clone(),
                        route: route_id,
                    }),
                }
            }

            self.station_index
                .insert(record.station_id.clone(), station_idx);
            self.stations.push(Station {
                id: record.station_id,
                name: record.station_name,
                stops,
                routes,
            });
        }
        Ok(())
    }

    fn add_transfers(&mut self, transfers: Vec<TransferRecord>) {
        for record in transfers {
            let from = self.stop_index.get(&record.from_stop_id).copied();
            let to = self.stop_index.get(&record.to_stop_id).copied();

            let (Some(from), Some(to)) = (from, to) else {
                self.defect(DataDefect::DanglingTransfer {
                    from: record.from_stop_id,
                    to: record.to_stop_id,
                });
                continue;
            };

            if from == to {
                debug!(stop = %record.from_stop_id, "Ignoring transfer from a stop to itself");
                continue;
            }

            if let Some(conflict) = transfers::link(
                &mut self.transfer_maps,
                from,
                to,
                record.min_transfer_seconds,
            ) {
                self.defect(DataDefect::ConflictingTransfer {
                    from: record.from_stop_id,
                    to: record.to_stop_id,
                    kept_secs: conflict.kept_secs,
                    dropped_secs: conflict.dropped_secs,
                });
            }
        }
    }

    /// Parse and validate stop-times, grouping them by trip.
    fn group_events(
        &self,
        events: Vec<ScheduleEventRecord>,
    ) -> Result<BTreeMap<TripId, PendingTrip>, BuildError> {
        let mut trips: BTreeMap<TripId, PendingTrip> = BTreeMap::new();

        for record in events {
            let route = *self.route_index.get(&record.route_id).ok_or_else(|| {
                BuildError::Inconsistent(format!(
                    "trip {} belongs to unknown route {}",
                    record.trip_id, record.route_id
                ))
            })?;

            let stop = *self.stop_index.get(&record.stop_id).ok_or_else(|| {
                BuildError::Inconsistent(format!(
                    "trip {} calls at unknown stop {}",
                    record.trip_id, record.stop_id
                ))
            })?;

            let parse = |raw: &str, what: &str| {
                TimeOfDay::parse(raw)
                    .map(|t| t.on(self.date))
                    .map_err(|e| {
                        BuildError::Inconsistent(format!(
                            "trip {} at stop {}: {what} {raw:?}: {e}",
                            record.trip_id, record.stop_id
                        ))
                    })
            };
            let arrival = parse(&record.arrival_time_of_day, "arrival")?;
            let departure = parse(&record.departure_time_of_day, "departure")?;

            if departure < arrival {
                return Err(BuildError::Inconsistent(format!(
                    "trip {} departs stop {} before arriving",
                    record.trip_id, record.stop_id
                )));
            }

            let trip = trips
                .entry(record.trip_id.clone())
                .or_insert_with(|| PendingTrip {
                    route,
                    direction: record.direction_label.clone(),
                    events: Vec::new(),
                });

            if trip.route != route || trip.direction != record.direction_label {
                return Err(BuildError::Inconsistent(format!(
                    "trip {} is listed under several routes or directions",
                    record.trip_id
                )));
            }

            trip.events.push(PendingEvent {
                stop,
                sequence: record.stop_sequence,
                arrival,
                departure,
            });
        }

        Ok(trips)
    }

    /// Place each trip's events in the arena in sequence order and link
    /// them to their neighbors.
    fn link_trips(&mut self, pending: BTreeMap<TripId, PendingTrip>) {
        for (trip_id, mut trip) in pending {
            // Stable: equal sequence numbers keep their fetch order
            trip.events.sort_by_key(|e| e.sequence);

            for pair in trip.events.windows(2) {
                if pair[0].sequence == pair[1].sequence {
                    self.defect(DataDefect::DuplicateSequence {
                        trip: trip_id.clone(),
                        sequence: pair[1].sequence,
                    });
                } else if pair[1].arrival < pair[0].departure {
                    self.defect(DataDefect::NonMonotonicTimes {
                        trip: trip_id.clone(),
                        sequence: pair[1].sequence,
                    });
                }
            }

            let trip_idx = TripIdx(self.trips.len());
            let first = self.events.len();
            let count = trip.events.len();
            let ids: Vec<EventId> = (first..first + count).map(EventId).collect();

            for (i, event) in trip.events.into_iter().enumerate() {
                let id = EventId(first + i);
                self.events.push(ScheduleEvent {
                    trip: trip_idx,
                    stop: event.stop,
                    arrival: event.arrival,
                    departure: event.departure,
                    sequence: event.sequence,
                    next: (i + 1 < count).then(|| EventId(first + i + 1)),
                    previous: (i > 0).then(|| EventId(first + i - 1)),
                });
                self.stops[event.stop.0].events.push(id);
            }

            self.routes[trip.route.0]
                .trips
                .insert(trip_id.clone(), trip_idx);
            self.trips.push(Trip {
                id: trip_id,
                route: trip.route,
                direction: trip.direction,
                events: ids,
            });
        }
    }

    fn finish(mut self) -> Network {
        let events = &self.events;
        for (stop, transfers) in self.stops.iter_mut().zip(self.transfer_maps) {
            stop.events.sort_by_key(|id| {
                let e = &events[id.0];
                (e.departure, e.arrival, *id)
            });
            stop.transfers = transfers;
        }

        Network {
            date: self.date,
            window_start: self.window_start,
            window_end: self.window_end,
            stations: self.stations,
            stops: self.stops,
            routes: self.routes,
            trips: self.trips,
            events: self.events,
            station_index: self.station_index,
            stop_index: self.stop_index,
            defects: self.defects,
        }
    }
}
