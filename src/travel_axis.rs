// Copyright Kyler Chin <kyler@catenarymaps.org>

//! Decides whether a path runs mostly north-south or east-west.
//!
//! Bearing alone misleads on loops and zig-zags, so the bearing from the
//! first to the last point is checked against the latitude and longitude
//! spans of the whole path.

use geo::Coord;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TravelAxis {
    EastWest,
    NorthSouth,
}

impl fmt::Display for TravelAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelAxis::EastWest => f.write_str("East-West"),
            TravelAxis::NorthSouth => f.write_str("North-South"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CompassDirection {
    Northbound,
    Southbound,
    Eastbound,
    Westbound,
}

impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CompassDirection::Northbound => "Northbound",
            CompassDirection::Southbound => "Southbound",
            CompassDirection::Eastbound => "Eastbound",
            CompassDirection::Westbound => "Westbound",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisInference {
    pub axis: TravelAxis,
    /// Initial great-circle bearing from the first to the last point, degrees in `[0, 360)`.
    pub bearing: Option<f64>,
    /// Set when the path had fewer than two points and the axis is only a default.
    pub defaulted: bool,
}

const SPAN_RATIO: f64 = 0.7;

/// Initial great-circle bearing in degrees, `[0, 360)` clockwise from north.
pub fn initial_bearing(from: Coord<f64>, to: Coord<f64>) -> f64 {
    let phi1 = from.y.to_radians();
    let phi2 = to.y.to_radians();
    let delta_lambda = (to.x - from.x).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

fn is_north_south_bearing(bearing: f64) -> bool {
    !(45.0..315.0).contains(&bearing) || (135.0..225.0).contains(&bearing)
}

pub fn infer_axis(path: &[Coord<f64>]) -> AxisInference {
    if path.len() < 2 {
        return AxisInference {
            axis: TravelAxis::EastWest,
            bearing: None,
            defaulted: true,
        };
    }
    let first = path[0];
    let last = path[path.len() - 1];

    let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
    for point in path {
        min_lat = min_lat.min(point.y);
        max_lat = max_lat.max(point.y);
        min_lon = min_lon.min(point.x);
        max_lon = max_lon.max(point.x);
    }
    let lat_span = max_lat - min_lat;
    let lon_span = max_lon - min_lon;

    let bearing = initial_bearing(first, last);
    let north_south_like = is_north_south_bearing(bearing);

    let axis = if north_south_like && lat_span >= SPAN_RATIO * lon_span {
        TravelAxis::NorthSouth
    } else if !north_south_like && lon_span >= SPAN_RATIO * lat_span {
        TravelAxis::EastWest
    } else if lat_span > lon_span {
        TravelAxis::NorthSouth
    } else {
        TravelAxis::EastWest
    };

    AxisInference {
        axis,
        bearing: Some(bearing),
        defaulted: false,
    }
}

/// Which way along `axis` the path travels, judged from its endpoints.
pub fn compass_direction(path: &[Coord<f64>], axis: TravelAxis) -> CompassDirection {
    let (first, last) = match (path.first(), path.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return match axis {
                TravelAxis::NorthSouth => CompassDirection::Northbound,
                TravelAxis::EastWest => CompassDirection::Eastbound,
            };
        }
    };

    match axis {
        TravelAxis::NorthSouth if last.y >= first.y => CompassDirection::Northbound,
        TravelAxis::NorthSouth => CompassDirection::Southbound,
        TravelAxis::EastWest if last.x >= first.x => CompassDirection::Eastbound,
        TravelAxis::EastWest => CompassDirection::Westbound,
    }
}
