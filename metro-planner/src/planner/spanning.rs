//! Time-aware minimum spanning tree over stations.
//!
//! Prim's algorithm over a graph whose edges only exist at certain times:
//! from a newly spanned station, the candidate edges are the rides the
//! traveller could take after arriving there. Candidates are keyed by ride
//! time alone; transfer times decide which trips can be caught but are not
//! added to the cost.

use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BinaryHeap};

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, trace};

use crate::domain::{StationId, TripId};
use crate::network::{EventId, StationIdx, StopIdx};

use super::{Direction, Planner, SearchError};

/// One ride of the spanning tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpanningEdge {
    pub from: StationId,
    pub to: StationId,
    pub trip: TripId,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub cost_secs: i64,
}

impl SpanningEdge {
    pub fn cost(&self) -> Duration {
        Duration::seconds(self.cost_secs)
    }
}

/// A spanning tree rooted at a start station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpanningResult {
    pub start: StationId,

    /// Edges in the order their stations were spanned.
    pub edges: Vec<SpanningEdge>,

    /// Sum of ride times over all edges.
    pub total_cost_secs: i64,

    /// True if every station of the network was spanned.
    pub fully_connected: bool,

    /// Stations the tree could not reach, in network order.
    pub unreached: Vec<StationId>,
}

impl SpanningResult {
    pub fn total_cost(&self) -> Duration {
        Duration::seconds(self.total_cost_secs)
    }

    /// The start station followed by every spanned station in order.
    pub fn spanned_stations(&self) -> Vec<&StationId> {
        std::iter::once(&self.start)
            .chain(self.edges.iter().map(|e| &e.to))
            .collect()
    }
}

/// A ride from a spanned station, keyed by its ride time.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    cost: Duration,
    seq: usize,
    from: StationIdx,
    board: EventId,
    alight: EventId,
}

// Reversed for a min-heap, oldest first among equal costs
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Frontier state of one spanning search.
struct Frontier {
    heap: BinaryHeap<Candidate>,
    spanned: Vec<bool>,
    seq: usize,
}

impl Planner<'_> {
    /// Compute a minimum-time spanning tree from `start`, boarding no
    /// earlier than `reference`.
    ///
    /// # Errors
    ///
    /// [`SearchError::StationNotFound`] if `start` is not in the network.
    pub fn find_spanning_tree(
        &self,
        start: &StationId,
        reference: NaiveDateTime,
    ) -> Result<SpanningResult, SearchError> {
        let network = self.network;
        let root = self.resolve(start)?;

        let mut frontier = Frontier {
            heap: BinaryHeap::new(),
            spanned: vec![false; network.station_count()],
            seq: 0,
        };
        frontier.spanned[root.0] = true;
        self.push_candidates(&mut frontier, root, None, reference);

        let mut edges = Vec::new();
        let mut total = Duration::zero();

        while let Some(candidate) = frontier.heap.pop() {
            let alight = network.event(candidate.alight);
            let to = network.station_of(alight.stop);
            if frontier.spanned[to.0] {
                trace!(station = to.0, "Discarding stale edge");
                continue;
            }

            frontier.spanned[to.0] = true;
            total += candidate.cost;

            let board = network.event(candidate.board);
            edges.push(SpanningEdge {
                from: network.station(candidate.from).id.clone(),
                to: network.station(to).id.clone(),
                trip: network.trip(board.trip).id.clone(),
                departure: board.departure,
                arrival: alight.arrival,
                cost_secs: candidate.cost.num_seconds(),
            });

            self.push_candidates(&mut frontier, to, Some(candidate.alight), alight.arrival);
        }

        let unreached: Vec<StationId> = network
            .stations()
            .filter(|(idx, _)| !frontier.spanned[idx.0])
            .map(|(_, s)| s.id.clone())
            .collect();

        debug!(
            %start,
            spanned = edges.len() + 1,
            unreached = unreached.len(),
            total_secs = total.num_seconds(),
            "Spanning search finished"
        );

        Ok(SpanningResult {
            start: start.clone(),
            edges,
            total_cost_secs: total.num_seconds(),
            fully_connected: unreached.is_empty(),
            unreached,
        })
    }

    /// Queue the rides leaving `station` for unspanned stations, after
    /// arriving there at `instant` on `arrived_on` (`None` at the root).
    ///
    /// Rides are collapsed per stop of their next call, keeping the
    /// cheapest.
    fn push_candidates(
        &self,
        frontier: &mut Frontier,
        station: StationIdx,
        arrived_on: Option<EventId>,
        instant: NaiveDateTime,
    ) {
        let network = self.network;
        let current_stop = arrived_on.map(|e| network.event(e).stop);
        let mut cheapest: BTreeMap<StopIdx, (Duration, EventId, EventId)> = BTreeMap::new();

        for &stop in &network.station(station).stops {
            let ready = match current_stop {
                Some(current) if current != stop => instant + self.transfer_between(current, stop),
                _ => instant,
            };

            let mut boards: Vec<EventId> = self
                .usable_events(stop, ready, Direction::Forward)
                .into_values()
                .collect();
            if current_stop == Some(stop) {
                boards.extend(arrived_on);
            }

            for board in boards {
                let board_event = network.event(board);
                let Some(alight) = board_event.next else {
                    continue;
                };
                let alight_event = network.event(alight);
                if frontier.spanned[network.station_of(alight_event.stop).0] {
                    continue;
                }

                let cost = alight_event.arrival - board_event.departure;
                match cheapest.entry(alight_event.stop) {
                    Entry::Vacant(slot) => {
                        slot.insert((cost, board, alight));
                    }
                    Entry::Occupied(mut slot) => {
                        if cost < slot.get().0 {
                            slot.insert((cost, board, alight));
                        }
                    }
                }
            }
        }

        for (cost, board, alight) in cheapest.into_values() {
            frontier.seq += 1;
            frontier.heap.push(Candidate {
                cost,
                seq: frontier.seq,
                from: station,
                board,
                alight,
            });
        }
    }
}
