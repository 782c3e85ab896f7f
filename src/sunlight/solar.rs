// Copyright Kyler Chin <kyler@catenarymaps.org>

//! Low precision solar ephemeris, good to about a minute for event times.
//!
//! Angles are radians internally and degrees at the public surface.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::f64::consts::PI;
use std::fmt;

const RAD: f64 = PI / 180.0;
const DAY_MS: f64 = 86_400_000.0;
const J1970: f64 = 2_440_588.0;
const J2000: f64 = 2_451_545.0;
const J0: f64 = 0.0009;
const OBLIQUITY: f64 = RAD * 23.4397;

/// Sun centre altitude at sunrise and sunset, refraction and disc radius included.
pub const SUNRISE_ALTITUDE_DEG: f64 = -0.833;
pub const ASTRONOMICAL_TWILIGHT_ALTITUDE_DEG: f64 = -18.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SunPhase {
    Day,
    Night,
    Dawn,
    Dusk,
}

impl fmt::Display for SunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SunPhase::Day => "day",
            SunPhase::Night => "night",
            SunPhase::Dawn => "dawn",
            SunPhase::Dusk => "dusk",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    pub altitude_deg: f64,
    /// Measured from south, positive towards west.
    pub azimuth_deg: f64,
}

/// Events of the solar day nearest the queried instant. An event is `None`
/// when the sun never crosses that altitude on this day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunTimes {
    pub solar_noon: DateTime<Utc>,
    pub astronomical_dawn: Option<DateTime<Utc>>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub astronomical_dusk: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunSample {
    pub phase: SunPhase,
    pub intensity: f64,
    pub altitude_deg: f64,
}

fn to_julian(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / DAY_MS - 0.5 + J1970
}

fn from_julian(julian: f64) -> Option<DateTime<Utc>> {
    if !julian.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(((julian + 0.5 - J1970) * DAY_MS).round() as i64)
}

fn to_days(instant: DateTime<Utc>) -> f64 {
    to_julian(instant) - J2000
}

fn right_ascension(l: f64, b: f64) -> f64 {
    (l.sin() * OBLIQUITY.cos() - b.tan() * OBLIQUITY.sin()).atan2(l.cos())
}

fn declination(l: f64, b: f64) -> f64 {
    (b.sin() * OBLIQUITY.cos() + b.cos() * OBLIQUITY.sin() * l.sin()).asin()
}

fn azimuth(h: f64, phi: f64, dec: f64) -> f64 {
    h.sin().atan2(h.cos() * phi.sin() - dec.tan() * phi.cos())
}

fn altitude(h: f64, phi: f64, dec: f64) -> f64 {
    (phi.sin() * dec.sin() + phi.cos() * dec.cos() * h.cos()).asin()
}

fn sidereal_time(d: f64, lw: f64) -> f64 {
    RAD * (280.16 + 360.985_623_5 * d) - lw
}

fn solar_mean_anomaly(d: f64) -> f64 {
    RAD * (357.5291 + 0.985_600_28 * d)
}

fn ecliptic_longitude(m: f64) -> f64 {
    let centre = RAD * (1.9148 * m.sin() + 0.02 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin());
    let perihelion = RAD * 102.9372;
    m + centre + perihelion + PI
}

pub fn sun_position(instant: DateTime<Utc>, lat: f64, lon: f64) -> SunPosition {
    let lw = RAD * -lon;
    let phi = RAD * lat;
    let d = to_days(instant);

    let l = ecliptic_longitude(solar_mean_anomaly(d));
    let dec = declination(l, 0.0);
    let ra = right_ascension(l, 0.0);
    let h = sidereal_time(d, lw) - ra;

    SunPosition {
        altitude_deg: altitude(h, phi, dec) / RAD,
        azimuth_deg: azimuth(h, phi, dec) / RAD,
    }
}

fn julian_cycle(d: f64, lw: f64) -> f64 {
    (d - J0 - lw / (2.0 * PI)).round()
}

fn approx_transit(ht: f64, lw: f64, n: f64) -> f64 {
    J0 + (ht + lw) / (2.0 * PI) + n
}

fn solar_transit_j(ds: f64, m: f64, l: f64) -> f64 {
    J2000 + ds + 0.0053 * m.sin() - 0.0069 * (2.0 * l).sin()
}

/// NaN when the sun never reaches `h` at this latitude and declination.
fn hour_angle(h: f64, phi: f64, dec: f64) -> f64 {
    ((h.sin() - phi.sin() * dec.sin()) / (phi.cos() * dec.cos())).acos()
}

pub fn sun_times(instant: DateTime<Utc>, lat: f64, lon: f64) -> SunTimes {
    let lw = RAD * -lon;
    let phi = RAD * lat;
    let d = to_days(instant);

    let n = julian_cycle(d, lw);
    let ds = approx_transit(0.0, lw, n);
    let m = solar_mean_anomaly(ds);
    let l = ecliptic_longitude(m);
    let dec = declination(l, 0.0);
    let j_noon = solar_transit_j(ds, m, l);

    // (rise, set) for the sun centre crossing `altitude_deg`
    let crossing = |altitude_deg: f64| {
        let w = hour_angle(altitude_deg * RAD, phi, dec);
        let j_set = solar_transit_j(approx_transit(w, lw, n), m, l);
        let j_rise = j_noon - (j_set - j_noon);
        (from_julian(j_rise), from_julian(j_set))
    };

    let (sunrise, sunset) = crossing(SUNRISE_ALTITUDE_DEG);
    let (astronomical_dawn, astronomical_dusk) = crossing(ASTRONOMICAL_TWILIGHT_ALTITUDE_DEG);

    SunTimes {
        solar_noon: from_julian(j_noon).unwrap_or(instant),
        astronomical_dawn,
        sunrise,
        sunset,
        astronomical_dusk,
    }
}

/// Linear in altitude: `[0.5, 1.0]` above the horizon, `[0, 0.5]` through
/// astronomical twilight, zero below it.
pub fn intensity_for_altitude(altitude_deg: f64) -> f64 {
    if altitude_deg >= 0.0 {
        (0.5 + 0.5 * altitude_deg / 90.0).min(1.0)
    } else if altitude_deg > ASTRONOMICAL_TWILIGHT_ALTITUDE_DEG {
        0.5 * (altitude_deg - ASTRONOMICAL_TWILIGHT_ALTITUDE_DEG) / -ASTRONOMICAL_TWILIGHT_ALTITUDE_DEG
    } else {
        0.0
    }
}

fn phase_from_altitude(instant: DateTime<Utc>, altitude_deg: f64, solar_noon: DateTime<Utc>) -> SunPhase {
    if altitude_deg >= SUNRISE_ALTITUDE_DEG {
        SunPhase::Day
    } else if altitude_deg > ASTRONOMICAL_TWILIGHT_ALTITUDE_DEG {
        if instant < solar_noon {
            SunPhase::Dawn
        } else {
            SunPhase::Dusk
        }
    } else {
        SunPhase::Night
    }
}

/// Classifies `instant` against the day's events. Intervals are half open,
/// so the instant of sunrise is already day.
pub fn phase_at(instant: DateTime<Utc>, lat: f64, lon: f64) -> SunPhase {
    let times = sun_times(instant, lat, lon);

    let (Some(sunrise), Some(sunset)) = (times.sunrise, times.sunset) else {
        let altitude_deg = sun_position(instant, lat, lon).altitude_deg;
        return phase_from_altitude(instant, altitude_deg, times.solar_noon);
    };

    if instant >= sunrise && instant < sunset {
        SunPhase::Day
    } else if instant < sunrise {
        match times.astronomical_dawn {
            Some(dawn) if instant < dawn => SunPhase::Night,
            // white nights: the sun never gets down to astronomical twilight
            _ => SunPhase::Dawn,
        }
    } else {
        match times.astronomical_dusk {
            Some(dusk) if instant >= dusk => SunPhase::Night,
            _ => SunPhase::Dusk,
        }
    }
}

pub fn sunlight_at(instant: DateTime<Utc>, lat: f64, lon: f64) -> SunSample {
    let altitude_deg = sun_position(instant, lat, lon).altitude_deg;
    SunSample {
        phase: phase_at(instant, lat, lon),
        intensity: intensity_for_altitude(altitude_deg),
        altitude_deg,
    }
}
