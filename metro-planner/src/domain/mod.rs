//! Domain types for the metro planner.
//!
//! This module contains the value types shared by the schedule source, the
//! network builder and the searches. All types enforce their invariants at
//! construction time, so code that receives these types can trust their
//! validity.

mod calendar;
mod ids;
mod time;

pub use calendar::{CalendarException, ExceptionKind, ServiceCalendar};
pub use ids::{InvalidId, RouteId, StationId, StopId, TripId};
pub use time::{TimeError, TimeOfDay, format_instant};
