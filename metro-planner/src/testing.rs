//! Shared feed fixtures for unit tests.

use chrono::NaiveDate;

use crate::domain::{ServiceCalendar, StationId, TimeOfDay};
use crate::network::{Network, build_network};
use crate::source::FeedSnapshot;

/// The service date every fixture runs on (a Friday).
pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
}

pub fn tod(s: &str) -> TimeOfDay {
    TimeOfDay::parse(s).unwrap()
}

/// Absolute instant of "HH:MM:SS" on the fixture date.
pub fn at(s: &str) -> chrono::NaiveDateTime {
    tod(s).on(date())
}

pub fn station(s: &str) -> StationId {
    StationId::parse(s).unwrap()
}

fn hms(secs: u32) -> String {
    TimeOfDay::from_seconds(secs).to_string()
}

/// Build a fixture for the whole service day, plus overflow hours.
pub fn build(snapshot: &FeedSnapshot) -> Network {
    futures::executor::block_on(build_network(
        snapshot,
        date(),
        tod("00:00:00"),
        tod("30:00:00"),
    ))
    .unwrap()
}

/// Stop times for one run along `stops`, leaving the first stop at
/// `start` (seconds), with a ride of `ride` seconds between stops and a
/// dwell of `dwell` seconds at intermediate stops.
pub fn run(stops: &[&str], start: u32, ride: u32, dwell: u32) -> Vec<(String, String, String)> {
    let mut t = start;
    let last = stops.len().saturating_sub(1);
    stops
        .iter()
        .enumerate()
        .map(|(i, stop)| {
            let arrival = t;
            let departure = if i == 0 || i == last { t } else { t + dwell };
            t = departure + ride;
            ((*stop).to_string(), hms(arrival), hms(departure))
        })
        .collect()
}

/// Add a trip built by [`run`] to a snapshot.
pub fn with_run(
    snapshot: FeedSnapshot,
    trip_id: &str,
    route_id: &str,
    direction: &str,
    stop_times: &[(String, String, String)],
) -> FeedSnapshot {
    let borrowed: Vec<(&str, &str, &str)> = stop_times
        .iter()
        .map(|(s, a, d)| (s.as_str(), a.as_str(), d.as_str()))
        .collect();
    snapshot.with_trip(trip_id, route_id, "DAILY", direction, &borrowed)
}

fn base() -> FeedSnapshot {
    FeedSnapshot::new().with_service("DAILY", ServiceCalendar::daily(date(), date()))
}

const EIGHT: u32 = 8 * 3600;

/// Stations S1–S4 on one line (stops P1–P4), trips S1→S4 every 10 minutes
/// from 08:00:00 and S4→S1 every 10 minutes from 08:05:00. Each hop rides
/// 3 minutes with a 30 second dwell, so the first S1→S4 trip reaches S4 at
/// 08:10:00.
pub fn line_network() -> FeedSnapshot {
    let mut snapshot = base()
        .with_route("M1", "Line 1")
        .with_station("S1", "Station 1", &["M1"], &[("P1", "Platform 1")])
        .with_station("S2", "Station 2", &["M1"], &[("P2", "Platform 2")])
        .with_station("S3", "Station 3", &["M1"], &[("P3", "Platform 3")])
        .with_station("S4", "Station 4", &["M1"], &[("P4", "Platform 4")]);

    for k in 0..6u32 {
        let out = run(&["P1", "P2", "P3", "P4"], EIGHT + k * 600, 180, 30);
        snapshot = with_run(snapshot, &format!("OUT{k}"), "M1", "Station 4", &out);

        let back = run(&["P4", "P3", "P2", "P1"], EIGHT + 300 + k * 600, 180, 30);
        snapshot = with_run(snapshot, &format!("BACK{k}"), "M1", "Station 1", &back);
    }
    snapshot
}

/// Two lines that share station X through two different stops, X1 and X2,
/// linked by a 180 second transfer.
///
/// L1: W → X1 → Y, leaving W at 08:00 and 08:15, 5 minutes per hop.
/// L2: X2 → Z, leaving X2 at 08:04, 08:06, 08:09 and 08:20, 6 minute ride.
pub fn transfer_network() -> FeedSnapshot {
    let mut snapshot = base()
        .with_route("L1", "Line 1")
        .with_route("L2", "Line 2")
        .with_station("W", "West", &["L1"], &[("W1", "West")])
        .with_station("X", "Cross", &["L1", "L2"], &[("X1", "Cross L1"), ("X2", "Cross L2")])
        .with_station("Y", "York", &["L1"], &[("Y1", "York")])
        .with_station("Z", "Zed", &["L2"], &[("Z1", "Zed")])
        .with_transfer("X1", "X2", 180);

    for (k, start) in [EIGHT, EIGHT + 900].into_iter().enumerate() {
        let stop_times = run(&["W1", "X1", "Y1"], start, 300, 0);
        snapshot = with_run(snapshot, &format!("L1-{k}"), "L1", "York", &stop_times);
    }
    for (k, start) in [240, 360, 540, 1200].into_iter().enumerate() {
        let stop_times = run(&["X2", "Z1"], EIGHT + start, 360, 0);
        snapshot = with_run(snapshot, &format!("L2-{k}"), "L2", "Zed", &stop_times);
    }
    snapshot
}

/// One route with a shared trunk T1 → T2 that branches to A ("Alpha") or
/// B ("Beta").
///
/// Alpha leaves T1 at 08:00, Beta at 08:02; 3 minutes per hop on the
/// trunk and 3 or 4 minutes on the branches.
pub fn branching_network() -> FeedSnapshot {
    base()
        .with_route("M7", "Line 7")
        .with_station("T1", "Trunk 1", &["M7"], &[("T1p", "Trunk 1")])
        .with_station("T2", "Trunk 2", &["M7"], &[("T2p", "Trunk 2")])
        .with_station("A", "Alpha", &["M7"], &[("Ap", "Alpha")])
        .with_station("B", "Beta", &["M7"], &[("Bp", "Beta")])
        .with_trip(
            "ALPHA",
            "M7",
            "DAILY",
            "Alpha",
            &[
                ("T1p", "08:00:00", "08:00:00"),
                ("T2p", "08:03:00", "08:03:00"),
                ("Ap", "08:06:00", "08:06:00"),
            ],
        )
        .with_trip(
            "BETA",
            "M7",
            "DAILY",
            "Beta",
            &[
                ("T1p", "08:02:00", "08:02:00"),
                ("T2p", "08:05:00", "08:05:00"),
                ("Bp", "08:09:00", "08:09:00"),
            ],
        )
}

/// Two lines with no trip or transfer between them: A1–A3 and B1–B3.
pub fn disjoint_network() -> FeedSnapshot {
    let mut snapshot = base().with_route("LA", "Line A").with_route("LB", "Line B");
    for name in ["A1", "A2", "A3", "B1", "B2", "B3"] {
        let stop = format!("{name}p");
        let route = if name.starts_with('A') { "LA" } else { "LB" };
        snapshot = snapshot.with_station(name, name, &[route], &[(stop.as_str(), name)]);
    }

    let a = run(&["A1p", "A2p", "A3p"], EIGHT, 120, 0);
    let b = run(&["B1p", "B2p", "B3p"], EIGHT, 240, 0);
    let snapshot = with_run(snapshot, "TA", "LA", "A3", &a);
    with_run(snapshot, "TB", "LB", "B3", &b)
}

/// Two routes from E1 to E4 under the same headsign. SLOW runs direct,
/// leaving E1 at 08:00 and reaching E4 at 08:40; LOCAL calls at E2 and E3,
/// leaving E1 at 08:01 and reaching E4 at 08:16.
pub fn slow_and_local_network() -> FeedSnapshot {
    let snapshot = base()
        .with_route("R1", "Direct")
        .with_route("R2", "Local")
        .with_station("E1", "East 1", &["R1", "R2"], &[("E1p", "East 1")])
        .with_station("E2", "East 2", &["R2"], &[("E2p", "East 2")])
        .with_station("E3", "East 3", &["R2"], &[("E3p", "East 3")])
        .with_station("E4", "East 4", &["R1", "R2"], &[("E4p", "East 4")]);

    let slow = run(&["E1p", "E4p"], EIGHT, 2400, 0);
    let local = run(&["E1p", "E2p", "E3p", "E4p"], EIGHT + 60, 300, 0);
    let snapshot = with_run(snapshot, "SLOW", "R1", "East 4", &slow);
    with_run(snapshot, "LOCAL", "R2", "East 4", &local)
}
