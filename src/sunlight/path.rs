// Copyright Kyler Chin <kyler@catenarymaps.org>

//! Time along a trip's path, resampled evenly and coloured by the sun.

use super::anchored_stop_times;
use super::solar::{self, SunPhase};
use crate::processor::ProcessedTrip;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use geo::{Coord, Distance, Haversine, Point};

pub const DEFAULT_SAMPLE_COUNT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunlightSegment {
    pub start: Coord<f64>,
    pub end: Coord<f64>,
    /// Instant the train is at the segment midpoint; phase and intensity are taken there.
    pub midpoint_time: DateTime<Utc>,
    pub phase: SunPhase,
    pub intensity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedPoint {
    pub coordinate: Coord<f64>,
    /// Metres from the start of the path.
    pub distance: f64,
    pub time: DateTime<Utc>,
}

pub(crate) fn lerp_coord(a: Coord<f64>, b: Coord<f64>, fraction: f64) -> Coord<f64> {
    geo::coord! {
        x: a.x + (b.x - a.x) * fraction,
        y: a.y + (b.y - a.y) * fraction,
    }
}

pub(crate) fn lerp_time(a: DateTime<Utc>, b: DateTime<Utc>, fraction: f64) -> DateTime<Utc> {
    let span_ms = (b - a).num_milliseconds() as f64;
    a + Duration::milliseconds((span_ms * fraction).round() as i64)
}

fn cumulative_distances(path: &[Coord<f64>]) -> Vec<f64> {
    let mut total = 0.0;
    let mut distances = Vec::with_capacity(path.len());
    distances.push(0.0);
    for pair in path.windows(2) {
        total += Haversine.distance(Point::from(pair[0]), Point::from(pair[1]));
        distances.push(total);
    }
    distances
}

/// Index of the path vertex nearest `target` in plain degree space; the
/// first one wins a tie.
fn closest_vertex(path: &[Coord<f64>], target: Coord<f64>) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (index, point) in path.iter().enumerate() {
        let distance = (point.x - target.x).powi(2) + (point.y - target.y).powi(2);
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }
    best
}

/// Piecewise linear time as a function of distance through `(distance, time)`
/// anchors sorted by distance.
fn time_at_distance(anchors: &[(f64, DateTime<Utc>)], distance: f64) -> Option<DateTime<Utc>> {
    let (first_distance, first_time) = *anchors.first()?;
    if distance < first_distance {
        return Some(first_time);
    }

    let next = anchors.partition_point(|(anchor_distance, _)| *anchor_distance <= distance);
    if next >= anchors.len() {
        return anchors.last().map(|(_, time)| *time);
    }

    let (from_distance, from_time) = anchors[next - 1];
    let (to_distance, to_time) = anchors[next];
    let fraction = (distance - from_distance) / (to_distance - from_distance);
    Some(lerp_time(from_time, to_time, fraction))
}

/// Every vertex of the trip's path with the instant the train passes it.
///
/// With `geometry` of two or more points the shape is the path and each stop
/// is pinned to its closest vertex; otherwise the stops themselves are the
/// path. Stops are kept in travel order along the path even if the nearest
/// vertex of a later stop lies behind an earlier one.
pub fn timed_path(
    trip: &ProcessedTrip,
    service_date: NaiveDate,
    geometry: Option<&[Coord<f64>]>,
) -> Vec<TimedPoint> {
    if trip.stops.len() < 2 {
        return Vec::new();
    }

    let path = match geometry {
        Some(geometry) if geometry.len() >= 2 => geometry.to_vec(),
        _ => trip.stop_path(),
    };
    let distances = cumulative_distances(&path);
    let Some(stop_times) = anchored_stop_times(trip, service_date) else {
        log::warn!(
            "Trip {} has stop times that cannot be placed on {}",
            trip.trip_id,
            service_date
        );
        return Vec::new();
    };

    let mut anchors = Vec::with_capacity(stop_times.len() * 2);
    let mut floor = 0.0_f64;
    for (stop, (arrival, departure)) in trip.stops.iter().zip(stop_times) {
        let distance = distances[closest_vertex(&path, stop.coordinate)].max(floor);
        floor = distance;

        anchors.push((distance, arrival));
        if departure > arrival {
            anchors.push((distance, departure));
        }
    }

    path.into_iter()
        .zip(distances)
        .filter_map(|(coordinate, distance)| {
            time_at_distance(&anchors, distance).map(|time| TimedPoint {
                coordinate,
                distance,
                time,
            })
        })
        .collect()
}

/// `count` points evenly spaced by distance along `points`, endpoints included.
pub fn resample(points: &[TimedPoint], count: usize) -> Vec<TimedPoint> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Vec::new();
    };
    if points.len() == 1 {
        return vec![*first];
    }

    let count = count.min(points.len()).max(2);
    let total = last.distance - first.distance;

    (0..count)
        .map(|i| {
            let target = first.distance + total * i as f64 / (count - 1) as f64;
            let upper = points
                .partition_point(|point| point.distance <= target)
                .clamp(1, points.len() - 1);
            let a = points[upper - 1];
            let b = points[upper];

            let length = b.distance - a.distance;
            let fraction = if length > 0.0 {
                ((target - a.distance) / length).clamp(0.0, 1.0)
            } else {
                0.0
            };

            TimedPoint {
                coordinate: lerp_coord(a.coordinate, b.coordinate, fraction),
                distance: target,
                time: lerp_time(a.time, b.time, fraction),
            }
        })
        .collect()
}

/// Sun phase and intensity along a trip run on `service_date`.
pub fn sunlight_segments(
    trip: &ProcessedTrip,
    service_date: NaiveDate,
    geometry: Option<&[Coord<f64>]>,
    sample_count: usize,
) -> Vec<SunlightSegment> {
    if trip.stops.len() < 2 {
        log::warn!(
            "Trip {} has {} stops, cannot compute sunlight",
            trip.trip_id,
            trip.stops.len()
        );
        return Vec::new();
    }

    let samples = resample(&timed_path(trip, service_date, geometry), sample_count);

    samples
        .windows(2)
        .map(|pair| {
            let midpoint = lerp_coord(pair[0].coordinate, pair[1].coordinate, 0.5);
            let midpoint_time = lerp_time(pair[0].time, pair[1].time, 0.5);
            let sample = solar::sunlight_at(midpoint_time, midpoint.y, midpoint.x);

            SunlightSegment {
                start: pair[0].coordinate,
                end: pair[1].coordinate,
                midpoint_time,
                phase: sample.phase,
                intensity: sample.intensity,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures;
    use chrono::TimeZone;
    use geo::coord;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 19).unwrap()
    }

    #[test]
    fn test_stops_as_path_hit_schedule() {
        let trip = test_fixtures::synthetic_trip();
        let points = timed_path(&trip, date(), None);
        assert_eq!(points.len(), 3);

        assert_eq!(points[0].time, Utc.with_ymd_and_hms(2024, 6, 19, 10, 0, 0).unwrap());
        // a stop vertex carries the departure, the train has dwelt by then
        assert_eq!(points[1].time, Utc.with_ymd_and_hms(2024, 6, 19, 10, 35, 0).unwrap());
        assert_eq!(points[2].time, Utc.with_ymd_and_hms(2024, 6, 19, 11, 0, 0).unwrap());
        assert!(points[1].distance > 110_000.0 && points[1].distance < 112_000.0);
    }

    #[test]
    fn test_dense_geometry_interpolates_between_stops() {
        let trip = test_fixtures::synthetic_trip();
        let geometry = vec![
            coord! { x: -100.0, y: 40.0 },
            coord! { x: -100.0, y: 40.5 },
            coord! { x: -100.0, y: 41.0 },
            coord! { x: -100.0, y: 41.5 },
            coord! { x: -100.0, y: 42.0 },
        ];
        let points = timed_path(&trip, date(), Some(&geometry));
        assert_eq!(points.len(), 5);
        assert_eq!(points[1].time, Utc.with_ymd_and_hms(2024, 6, 19, 10, 15, 0).unwrap());
        assert_eq!(points[3].time, Utc.with_ymd_and_hms(2024, 6, 19, 10, 47, 30).unwrap());
    }

    #[test]
    fn test_out_of_range_time_gives_no_segments() {
        let mut trip = test_fixtures::synthetic_trip();
        trip.stops[2].arrival_time = "4294967295:00:00".to_string();
        assert!(timed_path(&trip, date(), None).is_empty());
        assert!(sunlight_segments(&trip, date(), None, DEFAULT_SAMPLE_COUNT).is_empty());
    }

    #[test]
    fn test_resample_is_even_and_bounded() {
        let trip = test_fixtures::synthetic_trip();
        let points = timed_path(&trip, date(), None);

        let resampled = resample(&points, 100);
        assert_eq!(resampled.len(), 3);

        let resampled = resample(&points, 1);
        assert_eq!(resampled.len(), 2);
        assert_eq!(resampled[0].coordinate, points[0].coordinate);
        assert_eq!(resampled[1].coordinate, points[2].coordinate);
    }

    #[test]
    fn test_zero_length_path() {
        let mut trip = test_fixtures::synthetic_trip();
        for stop in &mut trip.stops {
            stop.coordinate = coord! { x: -100.0, y: 40.0 };
        }
        let segments = sunlight_segments(&trip, date(), None, 10);
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|segment| segment.start == segment.end));
    }

    #[test]
    fn test_too_few_stops() {
        let mut trip = test_fixtures::synthetic_trip();
        trip.stops.truncate(1);
        assert!(sunlight_segments(&trip, date(), None, DEFAULT_SAMPLE_COUNT).is_empty());
    }

    #[test]
    fn test_overnight_trip_crosses_into_night() {
        let loaded = test_fixtures::load_fixture(test_fixtures::no_merge_config());
        let trip = loaded.catalog.find_trip("T67").unwrap();
        let shape = loaded.catalog.shape("SH1");

        let segments = sunlight_segments(trip, date(), shape, DEFAULT_SAMPLE_COUNT);
        assert!(!segments.is_empty());
        assert!(segments.len() < DEFAULT_SAMPLE_COUNT);

        // leaves New York at 22:00 in late twilight, reaches Washington after 01:00
        let first = segments.first().unwrap();
        let last = segments.last().unwrap();
        assert_eq!(first.phase, SunPhase::Dusk);
        assert!(first.intensity > 0.0 && first.intensity < 0.5);
        assert_eq!(last.phase, SunPhase::Night);
        assert_eq!(last.intensity, 0.0);

        for pair in segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert!(pair[0].midpoint_time <= pair[1].midpoint_time);
        }
    }

    #[test]
    fn test_daytime_trip_is_lit() {
        let loaded = test_fixtures::load_fixture(test_fixtures::no_merge_config());
        let trip = loaded.catalog.find_trip("T171").unwrap();

        let segments = sunlight_segments(trip, date(), None, DEFAULT_SAMPLE_COUNT);
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|segment| segment.phase == SunPhase::Day));
        assert!(segments.iter().all(|segment| segment.intensity > 0.5));
    }
}
