//! Time-expanded transit network.
//!
//! The network's nodes are schedule events (a trip calling at a stop at a
//! given time) rather than stations. Every entity lives in a flat arena
//! owned by [`Network`] and is addressed by a typed index, so trips, stops
//! and events can refer to each other without ownership cycles.
//!
//! A network is built once per (date, window) query by [`build_network`]
//! and is read-only afterwards. It is `Send + Sync` and can be shared
//! across concurrent searches.

mod builder;
mod error;
mod transfers;

pub use builder::build_network;
pub use error::{BuildError, DataDefect};
pub use transfers::TransferMap;

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::domain::{RouteId, StationId, StopId, TimeOfDay, TripId};

/// Index of a station in the network arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationIdx(pub usize);

/// Index of a stop in the network arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopIdx(pub usize);

/// Index of a route in the network arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteIdx(pub usize);

/// Index of a trip in the network arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TripIdx(pub usize);

/// Handle of a schedule event in the network arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub usize);

/// An interchange complex aggregating one or more stops.
#[derive(Debug, Clone)]
pub struct Station {
    pub id: StationId,
    pub name: String,

    /// Member stops.
    pub stops: Vec<StopIdx>,

    /// Long names of the routes serving this station, for display.
    pub routes: BTreeMap<RouteId, String>,
}

/// A single boarding point.
#[derive(Debug, Clone)]
pub struct Stop {
    pub id: StopId,
    pub name: String,

    /// The station this stop belongs to.
    pub station: StationIdx,

    /// Events at this stop, ordered by departure.
    pub events: Vec<EventId>,

    /// Minimum transfer durations to neighboring stops (symmetric).
    pub transfers: TransferMap,
}

/// A scheduled line.
#[derive(Debug, Clone)]
pub struct Route {
    pub id: RouteId,
    pub long_name: String,
    pub trips: BTreeMap<TripId, TripIdx>,
}

/// One scheduled vehicle run.
#[derive(Debug, Clone)]
pub struct Trip {
    pub id: TripId,
    pub route: RouteIdx,

    /// Terminus label; trips of one route with different labels run on
    /// different branches or in opposite directions.
    pub direction: String,

    /// Events in stop sequence order.
    pub events: Vec<EventId>,
}

/// A trip's scheduled call at one stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEvent {
    pub trip: TripIdx,
    pub stop: StopIdx,
    pub arrival: NaiveDateTime,
    pub departure: NaiveDateTime,
    pub sequence: u32,

    /// The following call of the same trip, if any.
    pub next: Option<EventId>,

    /// The preceding call of the same trip, if any.
    pub previous: Option<EventId>,
}

/// The time-expanded network for one service date and window.
#[derive(Debug, Clone)]
pub struct Network {
    date: NaiveDate,
    window_start: TimeOfDay,
    window_end: TimeOfDay,
    stations: Vec<Station>,
    stops: Vec<Stop>,
    routes: Vec<Route>,
    trips: Vec<Trip>,
    events: Vec<ScheduleEvent>,
    station_index: HashMap<StationId, StationIdx>,
    stop_index: HashMap<StopId, StopIdx>,
    defects: Vec<DataDefect>,
}

impl Network {
    /// The service date the network was built for.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The `(start, end)` time window the network was built for.
    pub fn window(&self) -> (TimeOfDay, TimeOfDay) {
        (self.window_start, self.window_end)
    }

    pub fn station(&self, idx: StationIdx) -> &Station {
        &self.stations[idx.0]
    }

    pub fn stop(&self, idx: StopIdx) -> &Stop {
        &self.stops[idx.0]
    }

    pub fn route(&self, idx: RouteIdx) -> &Route {
        &self.routes[idx.0]
    }

    pub fn trip(&self, idx: TripIdx) -> &Trip {
        &self.trips[idx.0]
    }

    pub fn event(&self, id: EventId) -> &ScheduleEvent {
        &self.events[id.0]
    }

    /// Look up a station by its feed identifier.
    pub fn station_by_id(&self, id: &StationId) -> Option<StationIdx> {
        self.station_index.get(id).copied()
    }

    /// Look up a stop by its feed identifier.
    pub fn stop_by_id(&self, id: &StopId) -> Option<StopIdx> {
        self.stop_index.get(id).copied()
    }

    /// Look up a trip by its feed identifier.
    pub fn trip_by_id(&self, id: &TripId) -> Option<TripIdx> {
        self.routes
            .iter()
            .find_map(|route| route.trips.get(id).copied())
    }

    /// The station a stop belongs to.
    pub fn station_of(&self, stop: StopIdx) -> StationIdx {
        self.stops[stop.0].station
    }

    /// All stations with their indices.
    pub fn stations(&self) -> impl Iterator<Item = (StationIdx, &Station)> {
        self.stations
            .iter()
            .enumerate()
            .map(|(i, s)| (StationIdx(i), s))
    }

    /// All trips with their indices.
    pub fn trips(&self) -> impl Iterator<Item = (TripIdx, &Trip)> {
        self.trips.iter().enumerate().map(|(i, t)| (TripIdx(i), t))
    }

    /// All events with their handles.
    pub fn events(&self) -> impl Iterator<Item = (EventId, &ScheduleEvent)> {
        self.events
            .iter()
            .enumerate()
            .map(|(i, e)| (EventId(i), e))
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Minimum transfer duration between two stops, if one is listed.
    pub fn transfer(&self, from: StopIdx, to: StopIdx) -> Option<Duration> {
        self.stops[from.0].transfers.get(to)
    }

    /// Walk a trip's events by following `next` from its first event.
    pub fn walk_forward(&self, trip: TripIdx) -> impl Iterator<Item = EventId> + '_ {
        let first = self.trips[trip.0].events.first().copied();
        std::iter::successors(first, move |id| self.events[id.0].next)
    }

    /// Walk a trip's events by following `previous` from its last event.
    pub fn walk_backward(&self, trip: TripIdx) -> impl Iterator<Item = EventId> + '_ {
        let last = self.trips[trip.0].events.last().copied();
        std::iter::successors(last, move |id| self.events[id.0].previous)
    }

    /// The direction label of the trip an event belongs to.
    pub fn direction_of(&self, event: EventId) -> &str {
        &self.trips[self.events[event.0].trip.0].direction
    }

    /// Non-fatal data-quality defects found while building.
    pub fn defects(&self) -> &[DataDefect] {
        &self.defects
    }
}
