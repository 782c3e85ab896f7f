// Copyright Kyler Chin <kyler@catenarymaps.org>

pub mod records;

use serde::de::DeserializeOwned;
use std::fmt;

pub use records::*;

/// The text files of a GTFS feed that the pipeline reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeedFile {
    Agency,
    Routes,
    Stops,
    Trips,
    StopTimes,
    Shapes,
    Calendar,
}

impl FeedFile {
    pub const ALL: [FeedFile; 7] = [
        FeedFile::Agency,
        FeedFile::Routes,
        FeedFile::Stops,
        FeedFile::Trips,
        FeedFile::StopTimes,
        FeedFile::Shapes,
        FeedFile::Calendar,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            FeedFile::Agency => "agency.txt",
            FeedFile::Routes => "routes.txt",
            FeedFile::Stops => "stops.txt",
            FeedFile::Trips => "trips.txt",
            FeedFile::StopTimes => "stop_times.txt",
            FeedFile::Shapes => "shapes.txt",
            FeedFile::Calendar => "calendar.txt",
        }
    }
}

impl fmt::Display for FeedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Splits the text of one feed file into typed rows.
///
/// Quoted fields may contain the delimiter. Empty or header-only input
/// yields no rows. A row the reader cannot make sense of at all is logged
/// and skipped; it never aborts the rest of the file.
pub fn parse_records<T: DeserializeOwned>(text: &str) -> Vec<T> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(err) => {
            log::warn!("Unreadable header row: {}", err);
            return Vec::new();
        }
    };

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let mut record = match result {
            Ok(record) => record,
            Err(err) => {
                log::warn!("Skipping unreadable row {}: {}", line + 2, err);
                continue;
            }
        };

        // short rows are padded so every known column reads as empty
        record.truncate(headers.len());
        while record.len() < headers.len() {
            record.push_field("");
        }

        match record.deserialize::<T>(Some(&headers)) {
            Ok(row) => rows.push(row),
            Err(err) => log::warn!("Skipping unreadable row {}: {}", line + 2, err),
        }
    }
    rows
}

/// Flat row sets for every file of one feed.
#[derive(Debug, Clone, Default)]
pub struct RawFeed {
    pub agencies: Vec<AgencyRecord>,
    pub routes: Vec<RouteRecord>,
    pub stops: Vec<StopRecord>,
    pub trips: Vec<TripRecord>,
    pub stop_times: Vec<StopTimeRecord>,
    pub shapes: Vec<ShapePointRecord>,
    pub calendar: Vec<CalendarRecord>,
}
