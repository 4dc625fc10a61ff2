//! Time-independent connectivity between stations.

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::StationId;
use crate::network::{Network, StationIdx};

/// Union-find over station indices with path compression and union by
/// rank.
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[x] != root {
            let next = self.parent[x];
            self.parent[x] = root;
            x = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (a, b) = (self.find(a), self.find(b));
        if a == b {
            return;
        }
        match self.rank[a].cmp(&self.rank[b]) {
            std::cmp::Ordering::Less => self.parent[a] = b,
            std::cmp::Ordering::Greater => self.parent[b] = a,
            std::cmp::Ordering::Equal => {
                self.parent[b] = a;
                self.rank[a] += 1;
            }
        }
    }
}

/// Partition the network's stations into connected components.
///
/// Two stations are connected if a trip calls at one and then directly at
/// the other, in either direction, or if a transfer is listed between
/// their stops. Components are sorted largest first, ties by their first
/// station; stations within a component keep network order.
pub fn find_components(network: &Network) -> Vec<Vec<StationId>> {
    let mut sets = DisjointSet::new(network.station_count());

    for (_, event) in network.events() {
        if let Some(next) = event.next {
            let from = network.station_of(event.stop);
            let to = network.station_of(network.event(next).stop);
            sets.union(from.0, to.0);
        }
    }

    for (idx, station) in network.stations() {
        for &stop in &station.stops {
            for (neighbor, _) in network.stop(stop).transfers.iter() {
                sets.union(idx.0, network.station_of(neighbor).0);
            }
        }
    }

    let mut by_root: Vec<Vec<StationId>> = vec![Vec::new(); network.station_count()];
    for (idx, station) in network.stations() {
        let root = sets.find(idx.0);
        by_root[root].push(station.id.clone());
    }

    let components = sorted(by_root.into_iter().filter(|c| !c.is_empty()).collect());
    debug!(components = components.len(), "Computed station components");
    components
}

/// Partition the network's stations into strongly connected components.
///
/// A station reaches another if some trip calls at it and then directly
/// at the other, or if a transfer is listed between their stops; transfers
/// can be walked both ways. Two stations share a component when each
/// reaches the other. Ordering follows [`find_components`].
pub fn find_strong_components(network: &Network) -> Vec<Vec<StationId>> {
    let forward = station_graph(network);
    let count = forward.len();

    let mut reverse: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (from, targets) in forward.iter().enumerate() {
        for &to in targets {
            reverse[to].push(from);
        }
    }

    // Kosaraju: finish order on the graph, then sweep the reversed graph
    // from the last finished station
    let mut finished = Vec::with_capacity(count);
    let mut visited = vec![false; count];
    for root in 0..count {
        if visited[root] {
            continue;
        }
        visited[root] = true;

        let mut stack = vec![(root, 0usize)];
        while let Some((node, edge)) = stack.last_mut() {
            match forward[*node].get(*edge) {
                Some(&to) => {
                    *edge += 1;
                    if !visited[to] {
                        visited[to] = true;
                        stack.push((to, 0));
                    }
                }
                None => {
                    finished.push(*node);
                    stack.pop();
                }
            }
        }
    }

    let mut assigned = vec![false; count];
    let mut components = Vec::new();
    for &root in finished.iter().rev() {
        if assigned[root] {
            continue;
        }
        assigned[root] = true;

        let mut members = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            members.push(node);
            for &from in &reverse[node] {
                if !assigned[from] {
                    assigned[from] = true;
                    stack.push(from);
                }
            }
        }

        members.sort_unstable();
        components.push(
            members
                .into_iter()
                .map(|i| network.station(StationIdx(i)).id.clone())
                .collect(),
        );
    }

    let components = sorted(components);
    debug!(
        components = components.len(),
        "Computed strongly connected station components"
    );
    components
}

/// Directed station adjacency, deduplicated and in station order.
fn station_graph(network: &Network) -> Vec<Vec<usize>> {
    let mut adjacency: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); network.station_count()];

    for (_, event) in network.events() {
        if let Some(next) = event.next {
            let from = network.station_of(event.stop);
            let to = network.station_of(network.event(next).stop);
            if from != to {
                adjacency[from.0].insert(to.0);
            }
        }
    }

    // Transfer maps are symmetric, so this adds both ways
    for (idx, station) in network.stations() {
        for &stop in &station.stops {
            for (neighbor, _) in network.stop(stop).transfers.iter() {
                let to = network.station_of(neighbor);
                if to != idx {
                    adjacency[idx.0].insert(to.0);
                }
            }
        }
    }

    adjacency
        .into_iter()
        .map(|targets| targets.into_iter().collect())
        .collect()
}

/// Largest first, ties by first station.
fn sorted(mut components: Vec<Vec<StationId>>) -> Vec<Vec<StationId>> {
    components.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));
    components
}
