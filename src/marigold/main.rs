// Copyright Kyler Chin <kyler@catenarymaps.org>

use anyhow::{Context, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use railsun::config::RailsunConfig;
use railsun::geojson_export;
use railsun::pipeline::{self, Catalog};
use railsun::processor::ProcessedTrip;
use railsun::source::{DirectorySource, FeedSource, HttpSource};
use railsun::sunlight::{self, DEFAULT_SAMPLE_COUNT};
use serde::Serialize;
use std::path::PathBuf;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding an unzipped GTFS feed
    #[arg(long, conflicts_with = "feed_url")]
    feed_dir: Option<PathBuf>,
    /// Base URL the feed's .txt files are served under
    #[arg(long)]
    feed_url: Option<String>,
    /// RON file with load options, merge groups and categories
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Print catalog counts, routes and load warnings
    Summary,
    /// Print a trip's sunlight segments for a date as GeoJSON
    Sunlight {
        #[arg(long)]
        trip: String,
        /// Service date, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value_t = DEFAULT_SAMPLE_COUNT)]
        samples: usize,
        /// Use straight lines between stations even when the trip has a shape
        #[arg(long)]
        no_shape: bool,
    },
    /// Print where a trip is at an instant as JSON
    Position {
        #[arg(long)]
        trip: String,
        /// Service date the trip started on, defaults to the date of --at in the trip's zone
        #[arg(long)]
        date: Option<NaiveDate>,
        /// RFC 3339 instant
        #[arg(long)]
        at: DateTime<Utc>,
    },
    /// Print a route's shapes as GeoJSON
    Shapes {
        #[arg(long)]
        route: String,
    },
}

#[derive(Serialize)]
struct RouteSummary<'a> {
    route_id: &'a str,
    name: &'a str,
    axis: String,
    directions: Vec<String>,
    train_numbers: Vec<&'a str>,
    color: String,
    category: Option<&'a str>,
    trips: usize,
}

#[derive(Serialize)]
struct Summary<'a> {
    counts: railsun::report::LoadCounts,
    routes: Vec<RouteSummary<'a>>,
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct PositionOutput {
    trip_id: String,
    in_transit: bool,
    lat: Option<f64>,
    lon: Option<f64>,
    nearest_stops: Vec<String>,
    progress: Option<f64>,
}

fn open_source(args: &Args) -> anyhow::Result<Box<dyn FeedSource>> {
    match (&args.feed_dir, &args.feed_url) {
        (Some(dir), _) => Ok(Box::new(DirectorySource::new(dir))),
        (None, Some(url)) => Ok(Box::new(
            HttpSource::new(url).context("Could not build HTTP client")?,
        )),
        (None, None) => Err(anyhow!("Pass either --feed-dir or --feed-url")),
    }
}

fn find_trip<'a>(catalog: &'a Catalog, trip_id: &str) -> anyhow::Result<&'a ProcessedTrip> {
    catalog
        .find_trip(trip_id)
        .ok_or_else(|| anyhow!("No trip {} in the catalog", trip_id))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RailsunConfig::from_path(path)
            .with_context(|| format!("Could not load config {}", path.display()))?,
        None => RailsunConfig::default(),
    };

    let source = open_source(&args)?;
    let loaded =
        pipeline::load_catalog(source.as_ref(), &config).context("Could not load the feed")?;
    let catalog = &loaded.catalog;

    match &args.cmd {
        Command::Summary => {
            let routes = catalog
                .routes
                .iter()
                .map(|route| RouteSummary {
                    route_id: &route.route_id,
                    name: &route.name,
                    axis: route.axis.to_string(),
                    directions: route
                        .direction_options
                        .iter()
                        .map(ToString::to_string)
                        .collect(),
                    train_numbers: route.train_numbers.iter().map(String::as_str).collect(),
                    color: route.color_hex(),
                    category: route.category.as_deref(),
                    trips: catalog.trips_for_route(&route.route_id).len(),
                })
                .collect();

            let summary = Summary {
                counts: loaded.report.counts,
                routes,
                warnings: loaded
                    .report
                    .warnings
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Sunlight {
            trip,
            date,
            samples,
            no_shape,
        } => {
            let trip = find_trip(catalog, trip)?;
            if !trip.service.runs_on(*date) {
                log::warn!("Trip {} does not run on {}", trip.trip_id, date);
            }

            let geometry = if *no_shape {
                None
            } else {
                trip.shape_id
                    .as_deref()
                    .and_then(|shape_id| catalog.shape(shape_id))
            };

            let segments = sunlight::sunlight_segments(trip, *date, geometry, *samples);
            println!("{}", geojson_export::segments_to_geojson(&segments));
        }
        Command::Position { trip, date, at } => {
            let trip = find_trip(catalog, trip)?;
            let service_date = date.unwrap_or_else(|| trip.local_date(*at));
            let position = sunlight::train_position(trip, service_date, *at);

            let output = match position {
                Some(position) => PositionOutput {
                    trip_id: trip.trip_id.clone(),
                    in_transit: true,
                    lat: Some(position.coordinate.y),
                    lon: Some(position.coordinate.x),
                    nearest_stops: position.nearest_stops,
                    progress: Some(position.progress),
                },
                None => PositionOutput {
                    trip_id: trip.trip_id.clone(),
                    in_transit: false,
                    lat: None,
                    lon: None,
                    nearest_stops: Vec::new(),
                    progress: None,
                },
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Shapes { route } => {
            let route = catalog
                .route(route)
                .ok_or_else(|| anyhow!("No route {} in the catalog", route))?;
            println!("{}", geojson_export::route_shapes_to_geojson(route, catalog));
        }
    }

    Ok(())
}
