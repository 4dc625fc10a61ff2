//! Transit itinerary planner over a time-expanded network.
//!
//! Answers two questions about a timetabled network: what is the fastest
//! itinerary between two stations for a given departure or required
//! arrival time, and how quickly can every station be reached from a
//! given one.
//!
//! A [`network::Network`] is built once per service date and time window
//! from any [`source::ScheduleSource`] (such as a
//! [`source::FeedSnapshot`] loaded from JSON) and searched read-only by
//! [`planner::Planner`].

pub mod domain;
pub mod network;
pub mod planner;
pub mod source;

#[cfg(test)]
mod testing;
