// Copyright Kyler Chin <kyler@catenarymaps.org>

use super::anchored_stop_times;
use super::path::lerp_coord;
use crate::processor::ProcessedTrip;
use chrono::{DateTime, NaiveDate, Utc};
use geo::Coord;

/// A stop matches the query when one of its own instants is this close. The
/// closest stop wins when several do.
pub const STOP_MATCH_WINDOW_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainPosition {
    pub coordinate: Coord<f64>,
    /// The stop the train is at, or the two it is running between.
    pub nearest_stops: Vec<String>,
    /// Share of the scheduled run time elapsed, `0.0..=1.0`.
    pub progress: f64,
}

fn fraction_between(from: DateTime<Utc>, to: DateTime<Utc>, at: DateTime<Utc>) -> f64 {
    let span = (to - from).num_milliseconds();
    if span <= 0 {
        return 0.0;
    }
    ((at - from).num_milliseconds() as f64 / span as f64).clamp(0.0, 1.0)
}

/// Where the trip scheduled on `service_date` is at `at`, or `None` when the
/// train has not left its origin or has already arrived.
pub fn train_position(
    trip: &ProcessedTrip,
    service_date: NaiveDate,
    at: DateTime<Utc>,
) -> Option<TrainPosition> {
    if trip.stops.len() < 2 {
        return None;
    }

    let times = anchored_stop_times(trip, service_date)?;
    let first_departure = times.first()?.1;
    let last_arrival = times.last()?.0;

    if at < first_departure || at > last_arrival {
        return None;
    }

    let progress = fraction_between(first_departure, last_arrival, at);

    // zero while dwelling, otherwise the distance to the nearer of the two instants
    let gap_ms = |(arrival, departure): &(DateTime<Utc>, DateTime<Utc>)| {
        if *arrival <= at && at <= *departure {
            0
        } else {
            (at - *arrival)
                .num_milliseconds()
                .abs()
                .min((at - *departure).num_milliseconds().abs())
        }
    };
    if let Some((index, gap)) = times.iter().map(gap_ms).enumerate().min_by_key(|(_, gap)| *gap) {
        if gap <= STOP_MATCH_WINDOW_SECONDS * 1000 {
            return Some(TrainPosition {
                coordinate: trip.stops[index].coordinate,
                nearest_stops: vec![trip.stops[index].stop_id.clone()],
                progress,
            });
        }
    }

    let index = times
        .windows(2)
        .position(|pair| pair[0].1 <= at && at <= pair[1].0)?;

    let from = &trip.stops[index];
    let to = &trip.stops[index + 1];
    let fraction = fraction_between(times[index].1, times[index + 1].0, at);

    Some(TrainPosition {
        coordinate: lerp_coord(from.coordinate, to.coordinate, fraction),
        nearest_stops: vec![from.stop_id.clone(), to.stop_id.clone()],
        progress,
    })
}
