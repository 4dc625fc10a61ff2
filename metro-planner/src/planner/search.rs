//! Earliest-arrival and latest-departure itinerary search.
//!
//! A forward search starts at the origin at the reference instant and pops
//! frontier items in order of arrival. A backward search mirrors it: it
//! starts at the destination at the required arrival instant, walks trips
//! through `previous`, pops items in order of departure (latest first),
//! and reverses the path it finds.

use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::domain::{StationId, StopId};
use crate::network::{EventId, Network, StationIdx, StopIdx};

use super::{Direction, Planner, SearchError};

/// A call at one stop along an itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopVisit {
    pub stop: StopId,
    pub stop_name: String,
    pub station: StationId,
    pub arrival: NaiveDateTime,
    pub departure: NaiveDateTime,
}

/// A loop-free itinerary between two stations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Itinerary {
    pub direction: Direction,

    /// Stations in travel order, origin first.
    pub stations: Vec<StationId>,
    pub station_names: Vec<String>,

    /// Stops in travel order, including those where the traveller changes
    /// stop within a station.
    pub stops: Vec<StopVisit>,

    /// When the traveller leaves the origin.
    pub departure: NaiveDateTime,

    /// When the traveller reaches the destination.
    pub arrival: NaiveDateTime,
}

impl Itinerary {
    /// The instant the search optimized: arrival for a forward search,
    /// departure for a backward one.
    pub fn final_instant(&self) -> NaiveDateTime {
        match self.direction {
            Direction::Forward => self.arrival,
            Direction::Backward => self.departure,
        }
    }

    /// Time from departure to arrival.
    pub fn duration(&self) -> Duration {
        self.arrival - self.departure
    }
}

/// A stop on a partial path, in search order.
#[derive(Debug, Clone, Copy)]
struct Visit {
    stop: StopIdx,
    arrival: NaiveDateTime,
    departure: NaiveDateTime,
}

#[derive(Debug, Clone)]
struct Path {
    stations: Vec<StationIdx>,
    visits: Vec<Visit>,
}

impl Path {
    fn has_station(&self, station: StationIdx) -> bool {
        self.stations.contains(&station)
    }

    fn has_stop(&self, stop: StopIdx) -> bool {
        self.visits.iter().any(|v| v.stop == stop)
    }

    /// This path extended by riding `hop`.
    ///
    /// The boarding stop is recorded unless the path already ends there,
    /// in which case only its boarding time is filled in.
    fn extend(&self, network: &Network, hop: &Hop, direction: Direction) -> Path {
        let mut path = self.clone();
        let board = network.event(hop.board);

        match path.visits.last_mut() {
            Some(last) if last.stop == hop.from_stop => match direction {
                Direction::Forward => last.departure = board.departure,
                Direction::Backward => last.arrival = board.arrival,
            },
            _ => path.visits.push(match direction {
                Direction::Forward => Visit {
                    stop: hop.from_stop,
                    arrival: hop.ready,
                    departure: board.departure,
                },
                Direction::Backward => Visit {
                    stop: hop.from_stop,
                    arrival: board.arrival,
                    departure: hop.ready,
                },
            }),
        }

        let alight_stop = network.event(hop.alight).stop;
        path.visits.push(Visit {
            stop: alight_stop,
            arrival: hop.reach,
            departure: hop.reach,
        });
        path.stations.push(network.station_of(alight_stop));
        path
    }
}

/// One ride from a stop of the current station to the next call.
#[derive(Debug, Clone, Copy)]
struct Hop {
    from_stop: StopIdx,

    /// When the traveller is ready at `from_stop`, transfer included.
    ready: NaiveDateTime,
    board: EventId,
    alight: EventId,

    /// When the traveller is at the follow-on stop.
    reach: NaiveDateTime,
}

/// A frontier item: the traveller at a station at some instant.
#[derive(Debug)]
struct Label {
    elapsed: Duration,
    seq: usize,
    instant: NaiveDateTime,
    station: StationIdx,

    /// The call that brought the traveller here; `None` at the origin.
    event: Option<EventId>,
    path: Path,
}

// Reversed so that BinaryHeap pops the least elapsed time first, oldest
// first among equals.
impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .elapsed
            .cmp(&self.elapsed)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Label {}

impl Planner<'_> {
    /// Find the fastest loop-free itinerary between two stations.
    ///
    /// Forward, `reference` is the earliest departure and the itinerary
    /// arrives as early as possible. Backward, `reference` is the latest
    /// arrival and the itinerary leaves as late as possible.
    ///
    /// # Errors
    ///
    /// - [`SearchError::StationNotFound`] if either station is not in the
    ///   network
    /// - [`SearchError::NoPathFound`] if no trip sequence connects them
    ///   within the network's window
    pub fn find_itinerary(
        &self,
        from: &StationId,
        to: &StationId,
        reference: NaiveDateTime,
        direction: Direction,
    ) -> Result<Itinerary, SearchError> {
        let start = self.resolve(from)?;
        let end = self.resolve(to)?;

        if start == end {
            return Ok(self.itinerary(
                Path {
                    stations: vec![start],
                    visits: Vec::new(),
                },
                reference,
                direction,
            ));
        }

        let (origin, target) = match direction {
            Direction::Forward => (start, end),
            Direction::Backward => (end, start),
        };

        debug!(%from, %to, %reference, ?direction, "Starting itinerary search");

        let mut frontier = BinaryHeap::new();
        let mut reached: HashMap<StopIdx, NaiveDateTime> = HashMap::new();
        let mut best: Option<Label> = None;
        let mut seq = 0;
        let mut explored = 0;

        for &stop in &self.network.station(origin).stops {
            reached.insert(stop, reference);
        }
        frontier.push(Label {
            elapsed: Duration::zero(),
            seq,
            instant: reference,
            station: origin,
            event: None,
            path: Path {
                stations: vec![origin],
                visits: Vec::new(),
            },
        });

        while let Some(label) = frontier.pop() {
            if best.as_ref().is_some_and(|b| label.elapsed >= b.elapsed) {
                break;
            }

            explored += 1;
            if explored > self.config.max_explored() {
                warn!(
                    explored,
                    limit = self.config.max_explored(),
                    "Itinerary search hit its exploration limit"
                );
                break;
            }

            if let Some(event) = label.event {
                let stop = self.network.event(event).stop;
                if reached
                    .get(&stop)
                    .is_some_and(|t| direction.is_better(*t, label.instant))
                {
                    trace!(station = label.station.0, "Skipping dominated item");
                    continue;
                }
            }

            if label.station == target {
                if best.as_ref().is_none_or(|b| label.elapsed < b.elapsed) {
                    best = Some(label);
                }
                continue;
            }

            for hop in self.hops(&label, direction, &mut reached).into_values() {
                let alight_stop = self.network.event(hop.alight).stop;
                let alight_station = self.network.station_of(alight_stop);

                if label.path.has_station(alight_station) || label.path.has_stop(alight_stop) {
                    continue;
                }
                if reached
                    .get(&alight_stop)
                    .is_some_and(|t| !direction.is_better(hop.reach, *t))
                {
                    continue;
                }
                reached.insert(alight_stop, hop.reach);

                seq += 1;
                frontier.push(Label {
                    elapsed: direction.elapsed(reference, hop.reach),
                    seq,
                    instant: hop.reach,
                    station: alight_station,
                    event: Some(hop.alight),
                    path: label.path.extend(self.network, &hop, direction),
                });
            }
        }

        debug!(explored, found = best.is_some(), "Itinerary search finished");

        match best {
            Some(label) => Ok(self.itinerary(label.path, reference, direction)),
            None => Err(SearchError::NoPathFound {
                from: from.clone(),
                to: to.clone(),
            }),
        }
    }

    /// The rides available from the label's station, keyed by the stop of
    /// their next call and keeping the best one per stop.
    ///
    /// Stops other than the one the traveller is at cost a transfer and
    /// are marked reached at the instant the traveller is ready there.
    fn hops(
        &self,
        label: &Label,
        direction: Direction,
        reached: &mut HashMap<StopIdx, NaiveDateTime>,
    ) -> BTreeMap<StopIdx, Hop> {
        let network = self.network;
        let current_stop = label.event.map(|e| network.event(e).stop);
        let mut hops: BTreeMap<StopIdx, Hop> = BTreeMap::new();

        for &stop in &network.station(label.station).stops {
            let ready = match current_stop {
                Some(current) if current != stop => {
                    if label.path.has_stop(stop) {
                        continue;
                    }
                    let ready =
                        direction.shift(label.instant, self.transfer_between(current, stop));
                    if reached
                        .get(&stop)
                        .is_some_and(|t| !direction.is_better(ready, *t))
                    {
                        continue;
                    }
                    reached.insert(stop, ready);
                    ready
                }
                _ => label.instant,
            };

            let mut boards: Vec<EventId> = self
                .usable_events(stop, ready, direction)
                .into_values()
                .collect();
            // Staying seated
            if current_stop == Some(stop) {
                boards.extend(label.event);
            }

            for board in boards {
                let Some(alight) = direction.follow(network.event(board)) else {
                    continue;
                };
                let alight_event = network.event(alight);
                let hop = Hop {
                    from_stop: stop,
                    ready,
                    board,
                    alight,
                    reach: direction.reach_time(alight_event),
                };

                match hops.entry(alight_event.stop) {
                    Entry::Vacant(slot) => {
                        slot.insert(hop);
                    }
                    Entry::Occupied(mut slot) => {
                        if direction.is_better(hop.reach, slot.get().reach) {
                            slot.insert(hop);
                        }
                    }
                }
            }
        }

        hops
    }

    /// Turn a path in search order into an itinerary in travel order.
    fn itinerary(&self, path: Path, reference: NaiveDateTime, direction: Direction) -> Itinerary {
        let network = self.network;
        let Path {
            mut stations,
            mut visits,
        } = path;

        if direction == Direction::Backward {
            stations.reverse();
            visits.reverse();
        }

        let departure = visits.first().map_or(reference, |v| v.departure);
        let arrival = visits.last().map_or(reference, |v| v.arrival);

        let stops = visits
            .iter()
            .map(|v| {
                let stop = network.stop(v.stop);
                StopVisit {
                    stop: stop.id.clone(),
                    stop_name: stop.name.clone(),
                    station: network.station(stop.station).id.clone(),
                    arrival: v.arrival,
                    departure: v.departure,
                }
            })
            .collect();

        Itinerary {
            direction,
            station_names: stations
                .iter()
                .map(|s| network.station(*s).name.clone())
                .collect(),
            stations: stations
                .iter()
                .map(|s| network.station(*s).id.clone())
                .collect(),
            stops,
            departure,
            arrival,
        }
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
