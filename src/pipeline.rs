// Copyright Kyler Chin <kyler@catenarymaps.org>

//! One load cycle: feed text in, route and schedule catalog out.
//!
//! Every cycle builds a fresh catalog from scratch. Retrying a failed load
//! means calling [`load_catalog`] again.

use crate::config::{LoadOptions, RailsunConfig};
use crate::feed::{self, AgencyRecord, FeedFile, RawFeed, ServiceType, StopRecord};
use crate::index::{self, FeedIndex};
use crate::processor::{self, ProcessedCatalog, ProcessedRoute, ProcessedTrip, ProcessorContext};
use crate::report::{self, LoadCounts, LoadReport, LoadWarning, MergeSkipReason};
use crate::route_merge;
use crate::simplify;
use crate::source::{FeedSource, SourceError};
use crate::validation;
use ahash::{AHashMap, AHashSet};
use chrono::NaiveDate;
use chrono_tz::Tz;
use geo::Coord;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Feed is missing required file {0}")]
    MissingFile(FeedFile),
    #[error(transparent)]
    Source(#[from] SourceError),
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub routes: Vec<ProcessedRoute>,
    /// Keyed by route id.
    pub schedules: BTreeMap<String, Vec<ProcessedTrip>>,
    pub stops: AHashMap<String, StopRecord>,
    pub shapes: AHashMap<String, Vec<Coord<f64>>>,
    pub agencies: Vec<AgencyRecord>,
}

impl Catalog {
    pub fn route(&self, route_id: &str) -> Option<&ProcessedRoute> {
        self.routes.iter().find(|route| route.route_id == route_id)
    }

    pub fn trips_for_route(&self, route_id: &str) -> &[ProcessedTrip] {
        self.schedules
            .get(route_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn find_trip(&self, trip_id: &str) -> Option<&ProcessedTrip> {
        self.schedules
            .values()
            .flatten()
            .find(|trip| trip.trip_id == trip_id)
    }

    pub fn trips_running_on(&self, route_id: &str, date: NaiveDate) -> Vec<&ProcessedTrip> {
        self.trips_for_route(route_id)
            .iter()
            .filter(|trip| trip.service.runs_on(date))
            .collect()
    }

    pub fn shape(&self, shape_id: &str) -> Option<&[Coord<f64>]> {
        self.shapes.get(shape_id).map(Vec::as_slice)
    }

    pub fn stop(&self, stop_id: &str) -> Option<&StopRecord> {
        self.stops.get(stop_id)
    }
}

#[derive(Debug, Clone)]
pub struct LoadedFeed {
    pub catalog: Catalog,
    pub report: LoadReport,
}

fn read_required(source: &dyn FeedSource, file: FeedFile) -> Result<String, LoadError> {
    source.read(file)?.ok_or(LoadError::MissingFile(file))
}

fn read_optional(source: &dyn FeedSource, file: FeedFile) -> Result<String, LoadError> {
    Ok(source.read(file)?.unwrap_or_default())
}

/// Reads and tokenises every file the options call for.
pub fn read_raw_feed(source: &dyn FeedSource, options: &LoadOptions) -> Result<RawFeed, LoadError> {
    let stop_times = if options.include_stop_times {
        feed::parse_records(&read_required(source, FeedFile::StopTimes)?)
    } else {
        Vec::new()
    };

    let shapes = if options.include_dense_shapes {
        feed::parse_records(&read_optional(source, FeedFile::Shapes)?)
    } else {
        Vec::new()
    };

    Ok(RawFeed {
        agencies: feed::parse_records(&read_optional(source, FeedFile::Agency)?),
        routes: feed::parse_records(&read_required(source, FeedFile::Routes)?),
        stops: feed::parse_records(&read_required(source, FeedFile::Stops)?),
        trips: feed::parse_records(&read_required(source, FeedFile::Trips)?),
        stop_times,
        shapes,
        calendar: feed::parse_records(&read_required(source, FeedFile::Calendar)?),
    })
}

/// Keeps the primary agency's rail routes, then only the trips, stop times
/// and shape points that hang off them. Routes with no agency id count as
/// the primary agency's.
pub fn filter_to_primary_rail(raw: &mut RawFeed, primary_agency_id: Option<&str>) {
    raw.routes.retain(|route| {
        let agency_matches = match primary_agency_id {
            Some(primary) => route.agency_id.is_empty() || route.agency_id == primary,
            None => true,
        };
        agency_matches && route.service_type() == ServiceType::Rail
    });

    let route_ids = raw
        .routes
        .iter()
        .map(|route| route.route_id.as_str())
        .collect::<AHashSet<_>>();
    raw.trips.retain(|trip| route_ids.contains(trip.route_id.as_str()));

    let trip_ids = raw
        .trips
        .iter()
        .map(|trip| trip.trip_id.as_str())
        .collect::<AHashSet<_>>();
    let shape_ids = raw
        .trips
        .iter()
        .map(|trip| trip.shape_id.as_str())
        .collect::<AHashSet<_>>();

    raw.stop_times
        .retain(|stop_time| trip_ids.contains(stop_time.trip_id.as_str()));
    raw.shapes
        .retain(|point| shape_ids.contains(point.shape_id.as_str()));
}

fn primary_agency<'a>(agencies: &'a [AgencyRecord], options: &LoadOptions) -> Option<&'a AgencyRecord> {
    match &options.primary_agency_id {
        Some(agency_id) => agencies.iter().find(|agency| agency.agency_id == *agency_id),
        None => agencies.first(),
    }
}

/// Everything after the bytes are in hand. Never fails; problems end up in
/// the report.
pub fn build_catalog(mut raw: RawFeed, config: &RailsunConfig) -> LoadedFeed {
    let options = &config.load;
    let mut warnings = Vec::new();

    let primary = primary_agency(&raw.agencies, options).cloned();
    let primary_agency_id = options
        .primary_agency_id
        .clone()
        .or_else(|| primary.as_ref().map(|agency| agency.agency_id.clone()));

    let anchor_timezone = primary.as_ref().and_then(|agency| {
        let parsed = agency.agency_timezone.parse::<Tz>().ok();
        if parsed.is_none() {
            log::warn!(
                "Agency {} has unknown timezone {:?}, using station timezones",
                agency.agency_id,
                agency.agency_timezone
            );
        }
        parsed
    });

    if options.filter_to_primary_agency_trains_only {
        filter_to_primary_rail(&mut raw, primary_agency_id.as_deref());
    }

    let RawFeed {
        agencies,
        routes,
        stops,
        trips,
        stop_times,
        shapes,
        calendar,
    } = raw;

    let (routes_by_id, route_order) = index::index_routes(routes);
    let mut shapes_by_id = index::index_shapes(shapes);
    if let Some(tolerance) = options.shape_simplify_tolerance {
        simplify::simplify_shapes(&mut shapes_by_id, tolerance);
    }

    let feed_index = FeedIndex {
        stops_by_id: index::index_stops(stops),
        routes_by_id,
        route_order,
        shapes_by_id,
        stop_times_by_trip: index::index_stop_times(stop_times),
    };

    let calendars = processor::build_calendars(&calendar, &mut warnings);

    let context = ProcessorContext {
        index: &feed_index,
        trips: &trips,
        calendars: &calendars,
        anchor_timezone,
        categories: &config.categories,
        include_stop_times: options.include_stop_times,
    };
    let mut processed = processor::process(&context, &mut warnings);

    if options.include_stop_times {
        route_merge::merge_routes(&mut processed, &config.merge_groups, &mut warnings);
    } else {
        for group in &config.merge_groups {
            report::record(
                &mut warnings,
                LoadWarning::MergeSkipped {
                    merged_name: group.merged_name.clone(),
                    reason: MergeSkipReason::StopTimesNotLoaded,
                },
            );
        }
    }

    validation::validate_stops(&feed_index.stops_by_id, &mut warnings);
    validation::validate_schedules(&processed.schedules, &mut warnings);

    let ProcessedCatalog { routes, schedules } = processed;
    let FeedIndex {
        stops_by_id,
        shapes_by_id,
        ..
    } = feed_index;

    let counts = LoadCounts {
        routes: routes.len(),
        trips: schedules.values().map(Vec::len).sum(),
        stops: stops_by_id.len(),
        shapes: shapes_by_id.len(),
    };

    log::info!(
        "Loaded {} routes, {} trips, {} stops, {} shapes with {} warnings",
        counts.routes,
        counts.trips,
        counts.stops,
        counts.shapes,
        warnings.len()
    );

    LoadedFeed {
        catalog: Catalog {
            routes,
            schedules,
            stops: stops_by_id,
            shapes: shapes_by_id,
            agencies,
        },
        report: LoadReport { warnings, counts },
    }
}

pub fn load_catalog(source: &dyn FeedSource, config: &RailsunConfig) -> Result<LoadedFeed, LoadError> {
    let raw = read_raw_feed(source, &config.load)?;
    Ok(build_catalog(raw, config))
}
