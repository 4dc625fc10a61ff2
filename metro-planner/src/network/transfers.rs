//! Transfer durations between stops.
//!
//! Transfers are symmetric: if you can walk from A to B in some time, you
//! can walk from B to A in the same time. Each stop holds its own
//! [`TransferMap`] and [`link`] keeps both sides in agreement.

use std::collections::BTreeMap;

use chrono::Duration;

use super::StopIdx;

/// Minimum transfer durations from one stop to its neighbors, in seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferMap {
    durations: BTreeMap<StopIdx, u32>,
}

impl TransferMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the transfer duration to a neighbor, if listed.
    pub fn get(&self, to: StopIdx) -> Option<Duration> {
        self.durations
            .get(&to)
            .map(|secs| Duration::seconds(i64::from(*secs)))
    }

    /// Get the transfer duration to a neighbor in seconds, if listed.
    pub fn get_secs(&self, to: StopIdx) -> Option<u32> {
        self.durations.get(&to).copied()
    }

    /// All neighbors with their durations.
    pub fn iter(&self) -> impl Iterator<Item = (StopIdx, Duration)> + '_ {
        self.durations
            .iter()
            .map(|(stop, secs)| (*stop, Duration::seconds(i64::from(*secs))))
    }

    /// Returns the number of neighbors.
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    /// Returns true if there are no listed transfers.
    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    fn insert(&mut self, to: StopIdx, secs: u32) {
        self.durations.insert(to, secs);
    }
}

/// Outcome of recording a transfer on a pair that already had one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Conflict {
    pub kept_secs: u32,
    pub dropped_secs: u32,
}

/// Record a transfer between two stops on both of their maps.
///
/// When the pair already has a different duration, the shorter one is kept
/// on both sides and the conflict is returned.
pub(crate) fn link(
    maps: &mut [TransferMap],
    a: StopIdx,
    b: StopIdx,
    secs: u32,
) -> Option<Conflict> {
    let existing = maps[a.0].get_secs(b);

    let (kept, conflict) = match existing {
        Some(prev) if prev != secs => {
            let kept = prev.min(secs);
            let dropped = prev.max(secs);
            (
                kept,
                Some(Conflict {
                    kept_secs: kept,
                    dropped_secs: dropped,
                }),
            )
        }
        _ => (secs, None),
    };

    maps[a.0].insert(b, kept);
    maps[b.0].insert(a, kept);
    conflict
}
