// Copyright Kyler Chin <kyler@catenarymaps.org>

//! GTFS clock times such as `25:30:00`, where the hour keeps counting past
//! midnight for trips that run into the next service day.

use chrono::{DateTime, Days, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Longest run past the first service day a schedule time may describe.
pub const MAX_SCHEDULE_HOURS: u32 = 24 * 366;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ScheduleTime {
    /// Wall clock hour, `0..24`.
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// Whole days past the trip's first service day.
    pub day_offset: u32,
}

impl ScheduleTime {
    /// Missing or non-numeric parts read as zero. `None` when a part is out
    /// of range: minutes or seconds of 60 and up, or more than
    /// [`MAX_SCHEDULE_HOURS`] hours.
    pub fn parse(text: &str) -> Option<ScheduleTime> {
        let mut parts = text.trim().split(':').map(|part| part.trim().parse::<u32>().unwrap_or(0));

        let total_hours = parts.next().unwrap_or(0);
        let minute = parts.next().unwrap_or(0);
        let second = parts.next().unwrap_or(0);

        if total_hours > MAX_SCHEDULE_HOURS || minute >= 60 || second >= 60 {
            return None;
        }

        Some(ScheduleTime {
            hour: total_hours % 24,
            minute,
            second,
            day_offset: total_hours / 24,
        })
    }

    pub fn total_minutes(&self) -> u64 {
        (u64::from(self.day_offset) * 24 + u64::from(self.hour)) * 60 + u64::from(self.minute)
    }

    pub fn total_seconds(&self) -> u64 {
        self.total_minutes() * 60 + u64::from(self.second)
    }

    pub fn clock_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute.min(59), self.second.min(59))
            .unwrap_or(NaiveTime::MIN)
    }

    /// The instant this time denotes on `service_date` in `timezone`, or
    /// `None` when the day offset runs past the calendar chrono can represent.
    pub fn anchor(&self, service_date: NaiveDate, timezone: Tz) -> Option<DateTime<Utc>> {
        let day = service_date.checked_add_days(Days::new(u64::from(self.day_offset)))?;
        Some(resolve_local(timezone, NaiveDateTime::new(day, self.clock_time())))
    }
}

/// Ambiguous local times take the earlier reading; times skipped by a DST
/// jump are read an hour later.
fn resolve_local(timezone: Tz, local: NaiveDateTime) -> DateTime<Utc> {
    match timezone.from_local_datetime(&local) {
        LocalResult::Single(instant) => instant.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => match local
            .checked_add_signed(Duration::hours(1))
            .and_then(|later| timezone.from_local_datetime(&later).earliest())
        {
            Some(instant) => instant.with_timezone(&Utc),
            None => Utc.from_utc_datetime(&local),
        },
    }
}
