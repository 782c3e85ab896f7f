// Copyright Kyler Chin <kyler@catenarymaps.org>

//! A tiny Northeast Corridor feed for tests.

use crate::config::RailsunConfig;
use crate::feed::FeedFile;
use crate::pipeline::{self, LoadedFeed};
use crate::processor::{DirectionLabel, OperatingDays, ProcessedStop, ProcessedTrip, ServiceCalendar};
use crate::route_merge::MergeGroup;
use crate::source::MemorySource;
use crate::travel_axis::CompassDirection;
use chrono::NaiveDate;
use geo::coord;

const AGENCY: &str = "\
agency_id,agency_name,agency_url,agency_timezone
51,Amtrak,https://www.amtrak.com,America/New_York
99,Other Railroad,https://example.org,America/New_York
";

const ROUTES: &str = "\
route_id,agency_id,route_short_name,route_long_name,route_type,route_url,route_color
NER,51,,Northeast Regional,2,https://www.amtrak.com/northeast-regional,1772AC
NER2,51,,\"Northeast Regional, Washington - New York\",2,,
BUS,51,,Thruway Connecting Service,3,,
EMPTY,51,,Ghost Train,2,,
BOS,,Shuttle,,2,,FFFFFF
OTH,99,,Other Railroad,2,,
";

const STOPS: &str = "\
stop_id,stop_name,stop_lat,stop_lon,stop_timezone,stop_url
NYP,New York Penn Station,40.7506,-73.9935,America/New_York,
PHL,Philadelphia 30th Street,39.9566,-75.1820,America/New_York,
WAS,Washington Union Station,38.8973,-77.0063,America/New_York,
BOS,Boston South Station,42.3519,-71.0552,America/New_York,
";

const TRIPS: &str = "\
route_id,service_id,trip_id,trip_short_name,trip_headsign,direction_id,shape_id
NER,WKDY,T171,171,Washington,0,SH1
NER,WKDY,T172,172,New York,1,
NER,DAILY,T67,67,Washington,0,SH1
NER,NOPE,T99,99,Washington,0,
NER2,WKDY,T643,643,Washington Union Station,0,SH2
BUS,WKDY,T5001,5001,Philadelphia,0,
BOS,WKDY,T2170,2170,,1,
OTH,WKDY,T900,900,Boston,0,SHX
";

const STOP_TIMES: &str = "\
trip_id,arrival_time,departure_time,stop_id,stop_sequence
T171,13:00:00,13:00:00,WAS,3
T171,10:00:00,10:00:00,NYP,1
T171,11:20:00,11:25:00,PHL,2
T172,14:00:00,14:00:00,WAS,1
T172,15:35:00,15:40:00,PHL,2
T172,17:00:00,17:00:00,NYP,3
T67,22:00:00,22:00:00,NYP,1
T67,23:20:00,23:25:00,PHL,2
T67,25:10:00,25:10:00,WAS,3
T99,08:00:00,08:00:00,NYP,1
T99,11:00:00,11:00:00,WAS,2
T643,12:00:00,12:00:00,NYP,1
T643,13:20:00,13:22:00,PHL,2
T643,15:00:00,15:00:00,WAS,3
T5001,09:00:00,09:00:00,PHL,1
T5001,10:30:00,10:30:00,NYP,2
T2170,06:00:00,06:00:00,BOS,1
T2170,10:15:00,10:15:00,NYP,2
T900,09:00:00,09:00:00,NYP,1
T900,13:00:00,13:00:00,BOS,2
";

const SHAPES: &str = "\
shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence
SH1,38.8973,-77.0063,7
SH1,40.7506,-73.9935,1
SH1,40.7347,-74.1644,2
SH1,40.2171,-74.7429,3
SH1,39.9566,-75.1820,4
SH1,39.7372,-75.5511,5
SH1,39.3076,-76.6159,6
SH2,40.7506,-73.9935,1
SH2,39.9566,-75.1820,2
SH2,38.8973,-77.0063,3
SHX,40.7506,-73.9935,1
SHX,42.3519,-71.0552,2
";

const CALENDAR: &str = "\
service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date
WKDY,1,1,1,1,1,0,0,20240101,20241231
DAILY,1,1,1,1,1,1,1,20240101,20241231
";

pub fn fixture_source() -> MemorySource {
    MemorySource::default()
        .with_file(FeedFile::Agency, AGENCY)
        .with_file(FeedFile::Routes, ROUTES)
        .with_file(FeedFile::Stops, STOPS)
        .with_file(FeedFile::Trips, TRIPS)
        .with_file(FeedFile::StopTimes, STOP_TIMES)
        .with_file(FeedFile::Shapes, SHAPES)
        .with_file(FeedFile::Calendar, CALENDAR)
}

/// The fixture feed with `extra` rows appended to the named files.
pub fn extended_source(extra: &[(FeedFile, &str)]) -> MemorySource {
    let mut source = fixture_source();
    for (file, rows) in extra {
        if let Some(text) = source.files.get_mut(file) {
            text.push_str(rows);
        }
    }
    source
}

pub fn no_merge_config() -> RailsunConfig {
    let mut config = RailsunConfig::default();
    config
        .categories
        .insert("NER".to_string(), "Northeast Corridor".to_string());
    config
}

pub fn fixture_config() -> RailsunConfig {
    let mut config = no_merge_config();
    config.merge_groups.push(MergeGroup {
        route_ids: vec!["NER".to_string(), "NER2".to_string()],
        merged_name: "Northeast Regional".to_string(),
        primary_route_id: Some("NER".to_string()),
    });
    config
}

pub fn load_fixture(config: RailsunConfig) -> LoadedFeed {
    pipeline::load_catalog(&fixture_source(), &config).unwrap()
}

fn synthetic_stop(stop_id: &str, lat: f64, arrival: &str, departure: &str, sequence: u32) -> ProcessedStop {
    ProcessedStop {
        stop_id: stop_id.to_string(),
        name: format!("Station {}", stop_id),
        coordinate: coord! { x: -100.0, y: lat },
        timezone: "UTC".to_string(),
        arrival_time: arrival.to_string(),
        departure_time: departure.to_string(),
        day_offset: 0,
        stop_sequence: sequence,
    }
}

/// Due north across Kansas: A leaves 10:00, B 10:30 to 10:35, C arrives 11:00, all UTC.
pub fn synthetic_trip() -> ProcessedTrip {
    ProcessedTrip {
        trip_id: "SYN1".to_string(),
        route_id: "SYN".to_string(),
        train_number: "1".to_string(),
        headsign: None,
        direction: DirectionLabel::Compass(CompassDirection::Northbound),
        shape_id: None,
        stops: vec![
            synthetic_stop("A", 40.0, "10:00:00", "10:00:00", 1),
            synthetic_stop("B", 41.0, "10:30:00", "10:35:00", 2),
            synthetic_stop("C", 42.0, "11:00:00", "11:00:00", 3),
        ],
        service: ServiceCalendar {
            service_id: "ALL".to_string(),
            days: OperatingDays {
                monday: true,
                tuesday: true,
                wednesday: true,
                thursday: true,
                friday: true,
                saturday: true,
                sunday: true,
            },
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        },
        timezone: chrono_tz::UTC,
    }
}
