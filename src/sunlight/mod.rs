// Copyright Kyler Chin <kyler@catenarymaps.org>

pub mod path;
pub mod position;
pub mod solar;

pub use path::{DEFAULT_SAMPLE_COUNT, SunlightSegment, sunlight_segments};
pub use position::{TrainPosition, train_position};
pub use solar::{SunPhase, SunPosition, SunTimes};

use crate::processor::ProcessedTrip;
use chrono::{DateTime, NaiveDate, Utc};

/// `(arrival, departure)` instants for each stop of `trip` when it runs on
/// `service_date`. Each time carries its own day offset, so a stop that is
/// arrived at before midnight and left after it comes out right. `None` when
/// any stop's time cannot be placed on the calendar.
pub fn anchored_stop_times(
    trip: &ProcessedTrip,
    service_date: NaiveDate,
) -> Option<Vec<(DateTime<Utc>, DateTime<Utc>)>> {
    trip.stops
        .iter()
        .map(|stop| {
            let arrival = stop.arrival()?.anchor(service_date, trip.timezone)?;
            let departure = stop.departure()?.anchor(service_date, trip.timezone)?;
            Some((arrival, departure.max(arrival)))
        })
        .collect()
}
