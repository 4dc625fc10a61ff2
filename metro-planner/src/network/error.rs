//! Network build error types.

use std::fmt;

use chrono::NaiveDate;

use crate::domain::{RouteId, StationId, StopId, TimeOfDay, TripId};
use crate::source::SourceError;

/// Errors that abort a network build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Nothing runs on the requested date and window
    #[error("no schedule data for {date}: {reason}")]
    NotFound { date: NaiveDate, reason: &'static str },

    /// Records contradict each other (unknown trip or stop, bad times)
    #[error("inconsistent schedule data: {0}")]
    Inconsistent(String),

    /// The window ends before it starts
    #[error("invalid time window: {start} is after {end}")]
    InvalidWindow { start: TimeOfDay, end: TimeOfDay },

    /// A fetch from the schedule source failed
    #[error("schedule source failed: {0}")]
    Source(#[from] SourceError),
}

/// A data-quality problem that does not prevent building the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataDefect {
    /// Two stop-times of a trip share a sequence number
    DuplicateSequence { trip: TripId, sequence: u32 },

    /// A trip reaches a stop before leaving the previous one
    NonMonotonicTimes { trip: TripId, sequence: u32 },

    /// A transfer names a stop absent from the fetched stations
    DanglingTransfer { from: StopId, to: StopId },

    /// The same stop pair is listed with different durations
    ConflictingTransfer {
        from: StopId,
        to: StopId,
        kept_secs: u32,
        dropped_secs: u32,
    },

    /// A station lists a route absent from the fetched routes
    UnknownStationRoute { station: StationId, route: RouteId },
}

impl fmt::Display for DataDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataDefect::DuplicateSequence { trip, sequence } => {
                write!(f, "trip {trip} has several stop-times with sequence {sequence}")
            }
            DataDefect::NonMonotonicTimes { trip, sequence } => {
                write!(f, "trip {trip} goes back in time at sequence {sequence}")
            }
            DataDefect::DanglingTransfer { from, to } => {
                write!(f, "transfer {from} -> {to} names an unknown stop")
            }
            DataDefect::ConflictingTransfer {
                from,
                to,
                kept_secs,
                dropped_secs,
            } => write!(
                f,
                "transfer {from} <-> {to} listed as {kept_secs}s and {dropped_secs}s, keeping {kept_secs}s"
            ),
            DataDefect::UnknownStationRoute { station, route } => {
                write!(f, "station {station} lists unknown route {route}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = BuildError::NotFound {
            date: NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
            reason: "no routes",
        };
        assert_eq!(err.to_string(), "no schedule data for 2024-06-14: no routes");

        let err = BuildError::Inconsistent("trip T1 calls at unknown stop X".into());
        assert_eq!(
            err.to_string(),
            "inconsistent schedule data: trip T1 calls at unknown stop X"
        );

        let err = BuildError::InvalidWindow {
            start: TimeOfDay::parse("10:00:00").unwrap(),
            end: TimeOfDay::parse("09:00:00").unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "invalid time window: 10:00:00 is after 09:00:00"
        );
    }

    #[test]
    fn defect_display() {
        let defect = DataDefect::ConflictingTransfer {
            from: StopId::parse("A1").unwrap(),
            to: StopId::parse("A2").unwrap(),
            kept_secs: 60,
            dropped_secs: 90,
        };
        assert_eq!(
            defect.to_string(),
            "transfer A1 <-> A2 listed as 60s and 90s, keeping 60s"
        );

        let defect = DataDefect::DuplicateSequence {
            trip: TripId::parse("T1").unwrap(),
            sequence: 3,
        };
        assert_eq!(
            defect.to_string(),
            "trip T1 has several stop-times with sequence 3"
        );
    }
}
