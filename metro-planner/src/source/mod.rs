//! Schedule source abstraction.
//!
//! The network builder does not talk to a database directly. It consumes
//! plain schedule records through the [`ScheduleSource`] trait, which any
//! store can implement. [`FeedSnapshot`] is an in-memory implementation
//! loaded from a JSON document, used by the command-line driver and tests.

mod error;
mod records;
mod snapshot;

pub use error::SourceError;
pub use records::{RouteRecord, ScheduleEventRecord, StationRecord, StopRecord, TransferRecord};
pub use snapshot::{FeedSnapshot, StopTimeRecord, TripRecord};

use chrono::NaiveDate;

use crate::domain::TimeOfDay;

/// Provider of raw schedule records.
///
/// This abstraction allows the builder to be tested with in-memory data.
/// The four fetches are independent of each other and may be awaited
/// concurrently.
#[allow(async_fn_in_trait)]
pub trait ScheduleSource {
    /// All routes of the network.
    async fn fetch_routes(&self) -> Result<Vec<RouteRecord>, SourceError>;

    /// All stations, each with its member stops.
    async fn fetch_stations_with_stops(&self) -> Result<Vec<StationRecord>, SourceError>;

    /// All transfer pairs with their minimum duration.
    async fn fetch_transfers(&self) -> Result<Vec<TransferRecord>, SourceError>;

    /// Schedule events of trips active on `date` whose arrival or departure
    /// falls in `[window_start, window_end]` on that service day.
    async fn fetch_schedule_events(
        &self,
        date: NaiveDate,
        window_start: TimeOfDay,
        window_end: TimeOfDay,
    ) -> Result<Vec<ScheduleEventRecord>, SourceError>;
}
