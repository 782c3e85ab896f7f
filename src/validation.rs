// Copyright Kyler Chin <kyler@catenarymaps.org>

//! Data quality checks over a processed catalog. Nothing here drops or
//! rewrites data; findings are only reported.

use crate::feed::StopRecord;
use crate::processor::ProcessedTrip;
use crate::report::{self, LoadWarning};
use ahash::AHashMap;
use chrono_tz::Tz;
use std::collections::BTreeMap;

pub fn validate_trip(trip: &ProcessedTrip, warnings: &mut Vec<LoadWarning>) {
    for pair in trip.stops.windows(2) {
        if pair[1].day_offset < pair[0].day_offset {
            report::record(
                warnings,
                LoadWarning::DecreasingDayOffset {
                    trip_id: trip.trip_id.clone(),
                    stop_id: pair[1].stop_id.clone(),
                },
            );
        }
    }

    for stop in &trip.stops {
        if stop.arrival_time.is_empty() || stop.departure_time.is_empty() {
            continue;
        }
        let (Some(arrival), Some(departure)) = (stop.arrival(), stop.departure()) else {
            continue;
        };
        if arrival.total_seconds() > departure.total_seconds() {
            report::record(
                warnings,
                LoadWarning::ArrivalAfterDeparture {
                    trip_id: trip.trip_id.clone(),
                    stop_id: stop.stop_id.clone(),
                },
            );
        }
    }
}

pub fn validate_schedules(
    schedules: &BTreeMap<String, Vec<ProcessedTrip>>,
    warnings: &mut Vec<LoadWarning>,
) {
    for trip in schedules.values().flatten() {
        validate_trip(trip, warnings);
    }
}

/// Range, timezone and duplicate-coordinate checks, in stop id order.
pub fn validate_stops(stops: &AHashMap<String, StopRecord>, warnings: &mut Vec<LoadWarning>) {
    let mut sorted = stops.values().collect::<Vec<_>>();
    sorted.sort_by(|a, b| a.stop_id.cmp(&b.stop_id));

    let mut by_coordinate: BTreeMap<(u64, u64), Vec<String>> = BTreeMap::new();

    for stop in sorted {
        if !stop.has_valid_coordinates() {
            report::record(
                warnings,
                LoadWarning::CoordinateOutOfRange {
                    stop_id: stop.stop_id.clone(),
                },
            );
        } else {
            by_coordinate
                .entry((stop.stop_lat.to_bits(), stop.stop_lon.to_bits()))
                .or_default()
                .push(stop.stop_id.clone());
        }

        if !stop.stop_timezone.is_empty() && stop.stop_timezone.parse::<Tz>().is_err() {
            report::record(
                warnings,
                LoadWarning::UnknownTimezone {
                    stop_id: stop.stop_id.clone(),
                    timezone: stop.stop_timezone.clone(),
                },
            );
        }
    }

    for stop_ids in by_coordinate.into_values() {
        if stop_ids.len() > 1 {
            report::record(warnings, LoadWarning::SharedCoordinates { stop_ids });
        }
    }
}
