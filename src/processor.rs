// Copyright Kyler Chin <kyler@catenarymaps.org>

//! Joins routes, trips, stop times, stops, shapes and calendars into the
//! denormalised route and schedule catalogs.

use crate::colour;
use crate::feed::{CalendarRecord, RouteRecord, ServiceType, TripRecord};
use crate::gtfs_time::ScheduleTime;
use crate::index::FeedIndex;
use crate::report::{self, LoadWarning};
use crate::travel_axis::{self, CompassDirection, TravelAxis};
use ahash::AHashMap;
use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use geo::Coord;
use rgb::RGB;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// How a direction of travel is presented to riders. Never derived from
/// `direction_id`, which Amtrak fills inconsistently between routes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DirectionLabel {
    Headsign(String),
    Compass(CompassDirection),
    /// Placeholder for routes whose trips carry no headsigns.
    Axis(TravelAxis),
}

impl fmt::Display for DirectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectionLabel::Headsign(headsign) => f.write_str(headsign),
            DirectionLabel::Compass(direction) => direction.fmt(f),
            DirectionLabel::Axis(axis) => axis.fmt(f),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperatingDays {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl OperatingDays {
    pub fn includes(&self, weekday: Weekday) -> bool {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCalendar {
    pub service_id: String,
    pub days: OperatingDays,
    /// Inclusive.
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
}

impl ServiceCalendar {
    pub fn from_record(record: &CalendarRecord) -> Option<ServiceCalendar> {
        let start_date = NaiveDate::parse_from_str(&record.start_date, "%Y%m%d").ok()?;
        let end_date = NaiveDate::parse_from_str(&record.end_date, "%Y%m%d").ok()?;

        Some(ServiceCalendar {
            service_id: record.service_id.clone(),
            days: OperatingDays {
                monday: record.monday,
                tuesday: record.tuesday,
                wednesday: record.wednesday,
                thursday: record.thursday,
                friday: record.friday,
                saturday: record.saturday,
                sunday: record.sunday,
            },
            start_date,
            end_date,
        })
    }

    pub fn runs_on(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date && self.days.includes(date.weekday())
    }
}

pub fn build_calendars(
    records: &[CalendarRecord],
    warnings: &mut Vec<LoadWarning>,
) -> AHashMap<String, ServiceCalendar> {
    let mut calendars = AHashMap::new();
    for record in records {
        match ServiceCalendar::from_record(record) {
            Some(calendar) => {
                calendars.insert(record.service_id.clone(), calendar);
            }
            None => report::record(
                warnings,
                LoadWarning::InvalidCalendarDates {
                    service_id: record.service_id.clone(),
                },
            ),
        }
    }
    calendars
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedStop {
    pub stop_id: String,
    pub name: String,
    pub coordinate: Coord<f64>,
    /// IANA name as written in stops.txt; may be empty.
    pub timezone: String,
    pub arrival_time: String,
    pub departure_time: String,
    /// Days past the trip's first service day, taken from the arrival time.
    pub day_offset: u32,
    pub stop_sequence: u32,
}

impl ProcessedStop {
    /// `None` when the time text is out of range.
    pub fn arrival(&self) -> Option<ScheduleTime> {
        if self.arrival_time.is_empty() {
            ScheduleTime::parse(&self.departure_time)
        } else {
            ScheduleTime::parse(&self.arrival_time)
        }
    }

    pub fn departure(&self) -> Option<ScheduleTime> {
        if self.departure_time.is_empty() {
            ScheduleTime::parse(&self.arrival_time)
        } else {
            ScheduleTime::parse(&self.departure_time)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedTrip {
    pub trip_id: String,
    pub route_id: String,
    pub train_number: String,
    pub headsign: Option<String>,
    pub direction: DirectionLabel,
    pub shape_id: Option<String>,
    /// Ordered by stop sequence, never empty.
    pub stops: Vec<ProcessedStop>,
    pub service: ServiceCalendar,
    /// Zone the schedule's clock times are read in.
    pub timezone: Tz,
}

impl ProcessedTrip {
    pub fn stop_ids(&self) -> impl Iterator<Item = &str> {
        self.stops.iter().map(|stop| stop.stop_id.as_str())
    }

    pub fn stop_path(&self) -> Vec<Coord<f64>> {
        self.stops.iter().map(|stop| stop.coordinate).collect()
    }

    /// Calendar date `at` falls on in the trip's own zone.
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.timezone).date_naive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRoute {
    pub route_id: String,
    pub agency_id: String,
    pub name: String,
    pub service_type: ServiceType,
    pub train_numbers: BTreeSet<String>,
    pub axis: TravelAxis,
    pub direction_options: Vec<DirectionLabel>,
    pub shape_ids: BTreeSet<String>,
    pub color: RGB<u8>,
    pub url: String,
    pub category: Option<String>,
}

impl ProcessedRoute {
    pub fn color_hex(&self) -> String {
        colour::to_hex(self.color)
    }
}

pub struct ProcessorContext<'a> {
    pub index: &'a FeedIndex,
    pub trips: &'a [TripRecord],
    pub calendars: &'a AHashMap<String, ServiceCalendar>,
    /// Primary agency timezone, when the feed declares a readable one.
    pub anchor_timezone: Option<Tz>,
    pub categories: &'a BTreeMap<String, String>,
    pub include_stop_times: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedCatalog {
    pub routes: Vec<ProcessedRoute>,
    /// Keyed by route id.
    pub schedules: BTreeMap<String, Vec<ProcessedTrip>>,
}

pub fn process(ctx: &ProcessorContext, warnings: &mut Vec<LoadWarning>) -> ProcessedCatalog {
    let mut trips_by_route: AHashMap<&str, Vec<&TripRecord>> = AHashMap::new();
    for trip in ctx.trips {
        trips_by_route
            .entry(trip.route_id.as_str())
            .or_default()
            .push(trip);
    }

    let mut catalog = ProcessedCatalog::default();

    for route_id in &ctx.index.route_order {
        let Some(route) = ctx.index.routes_by_id.get(route_id) else {
            continue;
        };

        let trips = match trips_by_route.get(route_id.as_str()) {
            Some(trips) if !trips.is_empty() => trips,
            _ => {
                report::record(
                    warnings,
                    LoadWarning::RouteWithoutTrips {
                        route_id: route_id.clone(),
                    },
                );
                continue;
            }
        };

        catalog.routes.push(process_route(route, trips, ctx, warnings));

        if ctx.include_stop_times {
            let processed = trips
                .iter()
                .filter_map(|trip| process_trip(trip, ctx, warnings))
                .collect::<Vec<_>>();
            if !processed.is_empty() {
                catalog.schedules.insert(route_id.clone(), processed);
            }
        }
    }

    log::info!(
        "Processed {} routes and {} trips",
        catalog.routes.len(),
        catalog.schedules.values().map(Vec::len).sum::<usize>()
    );

    catalog
}

/// Shape of the trip when there is one worth using, otherwise its stops in order.
fn trip_path(trip: &TripRecord, index: &FeedIndex) -> Vec<Coord<f64>> {
    if let Some(shape) = index.shapes_by_id.get(&trip.shape_id) {
        if shape.len() >= 2 {
            return shape.clone();
        }
    }

    index
        .stop_times_by_trip
        .get(&trip.trip_id)
        .map(|stop_times| {
            stop_times
                .iter()
                .filter_map(|stop_time| index.stops_by_id.get(&stop_time.stop_id))
                .map(|stop| stop.coordinate())
                .collect()
        })
        .unwrap_or_default()
}

fn process_route(
    route: &RouteRecord,
    trips: &[&TripRecord],
    ctx: &ProcessorContext,
    warnings: &mut Vec<LoadWarning>,
) -> ProcessedRoute {
    let path = trip_path(trips[0], ctx.index);
    let inference = travel_axis::infer_axis(&path);
    if inference.defaulted {
        report::record(
            warnings,
            LoadWarning::AxisDefaulted {
                route_id: route.route_id.clone(),
            },
        );
    }

    let mut direction_options = Vec::new();
    for trip in trips {
        let headsign = trip.trip_headsign.trim();
        if headsign.is_empty() {
            continue;
        }
        let label = DirectionLabel::Headsign(headsign.to_string());
        if !direction_options.contains(&label) {
            direction_options.push(label);
        }
    }
    if direction_options.is_empty() {
        direction_options.push(DirectionLabel::Axis(inference.axis));
    }

    let train_numbers = trips
        .iter()
        .filter(|trip| !trip.trip_short_name.is_empty())
        .map(|trip| trip.trip_short_name.clone())
        .collect::<BTreeSet<_>>();

    let shape_ids = trips
        .iter()
        .filter(|trip| !trip.shape_id.is_empty())
        .map(|trip| trip.shape_id.clone())
        .collect::<BTreeSet<_>>();

    ProcessedRoute {
        route_id: route.route_id.clone(),
        agency_id: route.agency_id.clone(),
        name: route.display_name().to_string(),
        service_type: route.service_type(),
        train_numbers,
        axis: inference.axis,
        direction_options,
        shape_ids,
        color: colour::route_colour(&route.route_color),
        url: route.route_url.clone(),
        category: ctx.categories.get(&route.route_id).cloned(),
    }
}

fn process_trip(
    trip: &TripRecord,
    ctx: &ProcessorContext,
    warnings: &mut Vec<LoadWarning>,
) -> Option<ProcessedTrip> {
    let Some(service) = ctx.calendars.get(&trip.service_id) else {
        report::record(
            warnings,
            LoadWarning::TripMissingCalendar {
                trip_id: trip.trip_id.clone(),
                service_id: trip.service_id.clone(),
            },
        );
        return None;
    };

    let stop_times = ctx
        .index
        .stop_times_by_trip
        .get(&trip.trip_id)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut stops = Vec::with_capacity(stop_times.len());
    for stop_time in stop_times {
        let Some(stop) = ctx.index.stops_by_id.get(&stop_time.stop_id) else {
            report::record(
                warnings,
                LoadWarning::UnknownStop {
                    trip_id: trip.trip_id.clone(),
                    stop_id: stop_time.stop_id.clone(),
                },
            );
            continue;
        };

        let (Some(arrival), Some(departure)) = (
            ScheduleTime::parse(&stop_time.arrival_time),
            ScheduleTime::parse(&stop_time.departure_time),
        ) else {
            report::record(
                warnings,
                LoadWarning::MalformedStopTime {
                    trip_id: trip.trip_id.clone(),
                    stop_id: stop_time.stop_id.clone(),
                },
            );
            continue;
        };

        let day_offset = if stop_time.arrival_time.is_empty() {
            departure.day_offset
        } else {
            arrival.day_offset
        };

        stops.push(ProcessedStop {
            stop_id: stop.stop_id.clone(),
            name: stop.stop_name.clone(),
            coordinate: stop.coordinate(),
            timezone: stop.stop_timezone.clone(),
            arrival_time: stop_time.arrival_time.clone(),
            departure_time: stop_time.departure_time.clone(),
            day_offset,
            stop_sequence: stop_time.stop_sequence,
        });
    }

    if stops.is_empty() {
        report::record(
            warnings,
            LoadWarning::TripWithoutStopTimes {
                trip_id: trip.trip_id.clone(),
            },
        );
        return None;
    }

    let timezone = ctx
        .anchor_timezone
        .or_else(|| stops[0].timezone.parse::<Tz>().ok())
        .unwrap_or(chrono_tz::UTC);

    let headsign = Some(trip.trip_headsign.trim())
        .filter(|headsign| !headsign.is_empty())
        .map(str::to_string);

    let direction = match &headsign {
        Some(headsign) => DirectionLabel::Headsign(headsign.clone()),
        None => {
            let path = trip_path(trip, ctx.index);
            let axis = travel_axis::infer_axis(&path).axis;
            DirectionLabel::Compass(travel_axis::compass_direction(&path, axis))
        }
    };

    Some(ProcessedTrip {
        trip_id: trip.trip_id.clone(),
        route_id: trip.route_id.clone(),
        train_number: trip.trip_short_name.clone(),
        headsign,
        direction,
        shape_id: Some(trip.shape_id.clone()).filter(|shape_id| !shape_id.is_empty()),
        stops,
        service: service.clone(),
        timezone,
    })
}
