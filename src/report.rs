// Copyright Kyler Chin <kyler@catenarymaps.org>

//! Non-fatal findings from a load cycle.
//!
//! Anything dropped or skipped is recorded here as well as logged, so a
//! partial catalog always travels with the reasons for what is missing.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeSkipReason {
    /// Fewer than two of the group's routes exist in the catalog.
    TooFewRoutes { found: usize },
    PrimaryMissing { primary_route_id: String },
    NoTrips { route_id: String },
    StopSetMismatch { route_id: String, other_route_id: String },
    /// Merging compares stop sets, which need stop times.
    StopTimesNotLoaded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    RouteWithoutTrips { route_id: String },
    AxisDefaulted { route_id: String },
    TripMissingCalendar { trip_id: String, service_id: String },
    TripWithoutStopTimes { trip_id: String },
    UnknownStop { trip_id: String, stop_id: String },
    MalformedStopTime { trip_id: String, stop_id: String },
    InvalidCalendarDates { service_id: String },
    UnknownTimezone { stop_id: String, timezone: String },
    DecreasingDayOffset { trip_id: String, stop_id: String },
    ArrivalAfterDeparture { trip_id: String, stop_id: String },
    CoordinateOutOfRange { stop_id: String },
    SharedCoordinates { stop_ids: Vec<String> },
    MergeSkipped { merged_name: String, reason: MergeSkipReason },
}

impl fmt::Display for MergeSkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeSkipReason::TooFewRoutes { found } => {
                write!(f, "only {} of its routes are in the catalog", found)
            }
            MergeSkipReason::PrimaryMissing { primary_route_id } => {
                write!(f, "primary route {} is not in the catalog", primary_route_id)
            }
            MergeSkipReason::NoTrips { route_id } => write!(f, "route {} has no trips", route_id),
            MergeSkipReason::StopSetMismatch {
                route_id,
                other_route_id,
            } => write!(
                f,
                "routes {} and {} do not visit the same stops",
                route_id, other_route_id
            ),
            MergeSkipReason::StopTimesNotLoaded => write!(f, "stop times were not loaded"),
        }
    }
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::RouteWithoutTrips { route_id } => {
                write!(f, "Route {} has no trips, dropping it", route_id)
            }
            LoadWarning::AxisDefaulted { route_id } => write!(
                f,
                "Route {} has fewer than two points to judge its axis, assuming East-West",
                route_id
            ),
            LoadWarning::TripMissingCalendar {
                trip_id,
                service_id,
            } => write!(
                f,
                "Trip {} references unknown service {}, dropping it",
                trip_id, service_id
            ),
            LoadWarning::TripWithoutStopTimes { trip_id } => {
                write!(f, "Trip {} has no usable stop times, dropping it", trip_id)
            }
            LoadWarning::UnknownStop { trip_id, stop_id } => write!(
                f,
                "Trip {} references unknown stop {}, skipping that stop",
                trip_id, stop_id
            ),
            LoadWarning::MalformedStopTime { trip_id, stop_id } => write!(
                f,
                "Trip {} has an out-of-range time at stop {}, skipping that stop",
                trip_id, stop_id
            ),
            LoadWarning::InvalidCalendarDates { service_id } => write!(
                f,
                "Service {} has unreadable start or end dates, dropping it",
                service_id
            ),
            LoadWarning::UnknownTimezone { stop_id, timezone } => {
                write!(f, "Stop {} has unknown timezone {:?}", stop_id, timezone)
            }
            LoadWarning::DecreasingDayOffset { trip_id, stop_id } => write!(
                f,
                "Trip {} goes back a day at stop {}",
                trip_id, stop_id
            ),
            LoadWarning::ArrivalAfterDeparture { trip_id, stop_id } => write!(
                f,
                "Trip {} arrives at {} after it departs",
                trip_id, stop_id
            ),
            LoadWarning::CoordinateOutOfRange { stop_id } => {
                write!(f, "Stop {} has coordinates out of range", stop_id)
            }
            LoadWarning::SharedCoordinates { stop_ids } => write!(
                f,
                "Stops {} share identical coordinates",
                stop_ids.join(", ")
            ),
            LoadWarning::MergeSkipped {
                merged_name,
                reason,
            } => write!(f, "Skipping merge into {:?}: {}", merged_name, reason),
        }
    }
}

/// Emits the warning to the log and keeps it.
pub fn record(warnings: &mut Vec<LoadWarning>, warning: LoadWarning) {
    log::warn!("{}", warning);
    warnings.push(warning);
}

/// Sizes of the finished catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadCounts {
    pub routes: usize,
    pub trips: usize,
    pub stops: usize,
    pub shapes: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub warnings: Vec<LoadWarning>,
    pub counts: LoadCounts,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn dropped_trip_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|warning| {
                matches!(
                    warning,
                    LoadWarning::TripMissingCalendar { .. } | LoadWarning::TripWithoutStopTimes { .. }
                )
            })
            .count()
    }
}
