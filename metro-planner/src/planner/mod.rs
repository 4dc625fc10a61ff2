//! Itinerary and spanning searches over a built network.
//!
//! Both searches run synchronously over a read-only [`Network`] and expand
//! a min-priority frontier: the itinerary search by time elapsed since the
//! reference instant, the spanning search by ride time. At every station
//! they consider each of its stops, paying a transfer to change stop, and
//! board at most one trip per route and direction label at each stop: the
//! one that leaves first (forward) or arrives last (backward). Lines that
//! share a trunk are told apart by where their next call is.

mod components;
mod config;
mod search;
mod spanning;

pub use components::{find_components, find_strong_components};
pub use config::{ConfigError, DEFAULT_TRANSFER_ENV, MAX_TRANSFER_SECS, SearchConfig};
pub use search::{Itinerary, StopVisit};
pub use spanning::{SpanningEdge, SpanningResult};

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::domain::StationId;
use crate::network::{EventId, Network, RouteIdx, ScheduleEvent, StationIdx, StopIdx};

/// Error from a search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The station is not in the network
    #[error("station not found: {0}")]
    StationNotFound(StationId),

    /// The frontier was exhausted without reaching the destination
    #[error("no path found from {from} to {to}")]
    NoPathFound { from: StationId, to: StationId },
}

/// Which way an itinerary search runs in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Leave no earlier than the reference; arrive as early as possible.
    #[default]
    Forward,

    /// Arrive no later than the reference; leave as late as possible.
    Backward,
}

impl Direction {
    /// The neighboring event of the same trip in this direction.
    fn follow(self, event: &ScheduleEvent) -> Option<EventId> {
        match self {
            Direction::Forward => event.next,
            Direction::Backward => event.previous,
        }
    }

    /// The instant at which the traveller boards `event`.
    fn board_time(self, event: &ScheduleEvent) -> NaiveDateTime {
        match self {
            Direction::Forward => event.departure,
            Direction::Backward => event.arrival,
        }
    }

    /// The instant at which the traveller is at the stop of a follow-on
    /// event.
    fn reach_time(self, event: &ScheduleEvent) -> NaiveDateTime {
        match self {
            Direction::Forward => event.arrival,
            Direction::Backward => event.departure,
        }
    }

    /// Move an instant further along the search by `by`.
    fn shift(self, instant: NaiveDateTime, by: Duration) -> NaiveDateTime {
        match self {
            Direction::Forward => instant + by,
            Direction::Backward => instant - by,
        }
    }

    /// Time spent between the reference and `instant`.
    fn elapsed(self, reference: NaiveDateTime, instant: NaiveDateTime) -> Duration {
        match self {
            Direction::Forward => instant - reference,
            Direction::Backward => reference - instant,
        }
    }

    /// Returns true if `a` is strictly better than `b`.
    fn is_better(self, a: NaiveDateTime, b: NaiveDateTime) -> bool {
        match self {
            Direction::Forward => a < b,
            Direction::Backward => a > b,
        }
    }

    /// Returns true if `event` can be boarded by someone ready at `ready`.
    fn can_board(self, event: &ScheduleEvent, ready: NaiveDateTime) -> bool {
        match self {
            Direction::Forward => event.departure >= ready,
            Direction::Backward => event.arrival <= ready,
        }
    }
}

/// Searches over one network with one configuration.
pub struct Planner<'a> {
    network: &'a Network,
    config: &'a SearchConfig,
}

impl<'a> Planner<'a> {
    /// Create a new planner.
    pub fn new(network: &'a Network, config: &'a SearchConfig) -> Self {
        Self { network, config }
    }

    fn resolve(&self, id: &StationId) -> Result<StationIdx, SearchError> {
        self.network
            .station_by_id(id)
            .ok_or_else(|| SearchError::StationNotFound(id.clone()))
    }

    /// Transfer time between two stops, falling back to the configured
    /// default when the feed lists none.
    fn transfer_between(&self, from: StopIdx, to: StopIdx) -> Duration {
        self.network
            .transfer(from, to)
            .unwrap_or_else(|| self.config.default_transfer())
    }

    /// The best boardable event at a stop for each route and direction
    /// label.
    ///
    /// Only events with a follow-on call in `direction` are considered.
    fn usable_events(
        &self,
        stop: StopIdx,
        ready: NaiveDateTime,
        direction: Direction,
    ) -> BTreeMap<(RouteIdx, &'a str), EventId> {
        let network = self.network;
        let events = &network.stop(stop).events;
        let mut best: BTreeMap<(RouteIdx, &'a str), EventId> = BTreeMap::new();

        // Stop events are sorted by departure
        let first = match direction {
            Direction::Forward => events.partition_point(|&id| network.event(id).departure < ready),
            Direction::Backward => 0,
        };

        for &id in &events[first..] {
            let event = network.event(id);
            if direction.follow(event).is_none() || !direction.can_board(event, ready) {
                continue;
            }

            let key = (network.trip(event.trip).route, network.direction_of(id));
            match best.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
                Entry::Occupied(mut slot) => {
                    let current = network.event(*slot.get());
                    if direction.is_better(direction.board_time(event), direction.board_time(current)) {
                        slot.insert(id);
                    }
                }
            }
        }

        best
    }
}

/// Find an itinerary with the default configuration.
///
/// See [`Planner::find_itinerary`].
pub fn find_itinerary(
    network: &Network,
    from: &StationId,
    to: &StationId,
    reference: NaiveDateTime,
    direction: Direction,
) -> Result<Itinerary, SearchError> {
    Planner::new(network, &SearchConfig::default()).find_itinerary(from, to, reference, direction)
}

/// Compute a spanning tree with the default configuration.
///
/// See [`Planner::find_spanning_tree`].
pub fn find_spanning_tree(
    network: &Network,
    start: &StationId,
    reference: NaiveDateTime,
) -> Result<SpanningResult, SearchError> {
    Planner::new(network, &SearchConfig::default()).find_spanning_tree(start, reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at, branching_network, build};

    fn event(next: Option<usize>, previous: Option<usize>) -> ScheduleEvent {
        ScheduleEvent {
            trip: crate::network::TripIdx(0),
            stop: StopIdx(0),
            arrival: at("08:00:00"),
            departure: at("08:01:00"),
            sequence: 1,
            next: next.map(EventId),
            previous: previous.map(EventId),
        }
    }

    #[test]
    fn direction_helpers() {
        let e = event(Some(2), None);
        assert_eq!(Direction::Forward.follow(&e), Some(EventId(2)));
        assert_eq!(Direction::Backward.follow(&e), None);
        assert_eq!(Direction::Forward.board_time(&e), at("08:01:00"));
        assert_eq!(Direction::Backward.board_time(&e), at("08:00:00"));

        let minute = Duration::minutes(1);
        assert_eq!(Direction::Forward.shift(at("08:00:00"), minute), at("08:01:00"));
        assert_eq!(Direction::Backward.shift(at("08:00:00"), minute), at("07:59:00"));
        assert_eq!(
            Direction::Backward.elapsed(at("09:00:00"), at("08:30:00")),
            Duration::minutes(30)
        );
        assert!(Direction::Backward.is_better(at("08:30:00"), at("08:00:00")));
        assert!(Direction::Forward.can_board(&e, at("08:01:00")));
        assert!(!Direction::Backward.can_board(&e, at("07:59:59")));
    }

    fn t1(network: &Network) -> StopIdx {
        network
            .stop_by_id(&crate::domain::StopId::parse("T1p").unwrap())
            .unwrap()
    }

    fn labels(usable: &BTreeMap<(RouteIdx, &str), EventId>) -> Vec<String> {
        usable.keys().map(|(_, label)| label.to_string()).collect()
    }

    #[test]
    fn usable_events_one_per_direction() {
        let network = build(&branching_network());
        let config = SearchConfig::default();
        let planner = Planner::new(&network, &config);
        let t1 = t1(&network);

        let usable = planner.usable_events(t1, at("07:00:00"), Direction::Forward);
        assert_eq!(labels(&usable), vec!["Alpha", "Beta"]);
        let (_, &alpha) = usable.iter().find(|((_, l), _)| *l == "Alpha").unwrap();
        assert_eq!(network.event(alpha).departure, at("08:00:00"));

        // Past both departures nothing is left
        assert!(
            planner
                .usable_events(t1, at("08:02:01"), Direction::Forward)
                .is_empty()
        );

        // First calls have no previous, so nothing boards backward there
        assert!(
            planner
                .usable_events(t1, at("09:00:00"), Direction::Backward)
                .is_empty()
        );
    }

    #[test]
    fn usable_events_skip_departed() {
        let network = build(&branching_network());
        let config = SearchConfig::default();
        let planner = Planner::new(&network, &config);
        let t1 = t1(&network);

        let usable = planner.usable_events(t1, at("08:00:01"), Direction::Forward);
        assert_eq!(labels(&usable), vec!["Beta"]);

        // Ready exactly at a departure still boards it
        let usable = planner.usable_events(t1, at("08:02:00"), Direction::Forward);
        assert_eq!(labels(&usable), vec!["Beta"]);
    }

    #[test]
    fn usable_events_keep_routes_apart() {
        // A second route leaves T1 towards the same headsign
        let feed = branching_network().with_route("M8", "Line 8").with_trip(
            "OTHER",
            "M8",
            "DAILY",
            "Alpha",
            &[
                ("T1p", "08:01:00", "08:01:00"),
                ("Ap", "08:04:00", "08:04:00"),
            ],
        );
        let network = build(&feed);
        let config = SearchConfig::default();
        let planner = Planner::new(&network, &config);

        let usable = planner.usable_events(t1(&network), at("07:00:00"), Direction::Forward);
        assert_eq!(labels(&usable), vec!["Alpha", "Beta", "Alpha"]);

        let trips: Vec<&str> = usable
            .values()
            .map(|&id| network.trip(network.event(id).trip).id.as_str())
            .collect();
        assert_eq!(trips, vec!["ALPHA", "BETA", "OTHER"]);
    }

    #[test]
    fn search_error_display() {
        let err = SearchError::NoPathFound {
            from: StationId::parse("A1").unwrap(),
            to: StationId::parse("B3").unwrap(),
        };
        assert_eq!(err.to_string(), "no path found from A1 to B3");
        assert_eq!(
            SearchError::StationNotFound(StationId::parse("S5").unwrap()).to_string(),
            "station not found: S5"
        );
    }
}
