// Copyright Kyler Chin <kyler@catenarymaps.org>

//! Row types for each GTFS text file.
//!
//! Every field is optional on the wire. Missing columns fall back to the
//! field default, and numbers that fail to parse become `NaN` (floats) or
//! `0` (integers) instead of rejecting the row.

use serde::{Deserialize, Deserializer};

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let raw = String::deserialize(d)?;
    Ok(raw.trim().parse::<f64>().unwrap_or(f64::NAN))
}

fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let raw = String::deserialize(d)?;
    Ok(raw.trim().parse::<u32>().unwrap_or(0))
}

fn lenient_i32<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    let raw = String::deserialize(d)?;
    Ok(raw.trim().parse::<i32>().unwrap_or(0))
}

fn lenient_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(d)?;
    Ok(raw.trim() == "1")
}

/// Coarse classification of `route_type`, covering both the basic and the
/// extended GTFS route type ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceType {
    Rail,
    Bus,
    Other(i32),
}

impl ServiceType {
    pub fn from_route_type(route_type: i32) -> Self {
        match route_type {
            2 | 100..=117 => ServiceType::Rail,
            3 | 200..=209 | 700..=716 => ServiceType::Bus,
            other => ServiceType::Other(other),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AgencyRecord {
    pub agency_id: String,
    pub agency_name: String,
    pub agency_url: String,
    pub agency_timezone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RouteRecord {
    pub route_id: String,
    pub agency_id: String,
    pub route_short_name: String,
    pub route_long_name: String,
    #[serde(deserialize_with = "lenient_i32")]
    pub route_type: i32,
    pub route_color: String,
    pub route_url: String,
}

impl RouteRecord {
    pub fn service_type(&self) -> ServiceType {
        ServiceType::from_route_type(self.route_type)
    }

    /// Long name first, since Amtrak leaves the short name empty for most services.
    pub fn display_name(&self) -> &str {
        if !self.route_long_name.is_empty() {
            &self.route_long_name
        } else if !self.route_short_name.is_empty() {
            &self.route_short_name
        } else {
            &self.route_id
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StopRecord {
    pub stop_id: String,
    pub stop_name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub stop_lat: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub stop_lon: f64,
    pub stop_timezone: String,
    pub stop_url: String,
}

impl StopRecord {
    pub fn coordinate(&self) -> geo::Coord<f64> {
        geo::coord! { x: self.stop_lon, y: self.stop_lat }
    }

    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.stop_lat) && (-180.0..=180.0).contains(&self.stop_lon)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TripRecord {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
    pub trip_short_name: String,
    pub trip_headsign: String,
    /// Not consistent across Amtrak routes; kept for completeness only.
    #[serde(deserialize_with = "lenient_u32")]
    pub direction_id: u32,
    pub shape_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StopTimeRecord {
    pub trip_id: String,
    pub arrival_time: String,
    pub departure_time: String,
    pub stop_id: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub stop_sequence: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShapePointRecord {
    pub shape_id: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub shape_pt_lat: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub shape_pt_lon: f64,
    #[serde(deserialize_with = "lenient_u32")]
    pub shape_pt_sequence: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CalendarRecord {
    pub service_id: String,
    #[serde(deserialize_with = "lenient_flag")]
    pub monday: bool,
    #[serde(deserialize_with = "lenient_flag")]
    pub tuesday: bool,
    #[serde(deserialize_with = "lenient_flag")]
    pub wednesday: bool,
    #[serde(deserialize_with = "lenient_flag")]
    pub thursday: bool,
    #[serde(deserialize_with = "lenient_flag")]
    pub friday: bool,
    #[serde(deserialize_with = "lenient_flag")]
    pub saturday: bool,
    #[serde(deserialize_with = "lenient_flag")]
    pub sunday: bool,
    pub start_date: String,
    pub end_date: String,
}
