// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Amtrak GTFS processing and sunlight along train paths.
//!
//! A load cycle ([`pipeline::load_catalog`]) reads the feed files through a
//! [`source::FeedSource`], indexes and joins them into processed routes and
//! trips, merges duplicate routes and reports everything it had to drop.
//! The [`sunlight`] engine then colours any trip's path by sun phase for a
//! given service date.

#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::single_char_pattern,
    clippy::for_kv_map,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::op_ref
)]

pub mod colour;
pub mod config;
pub mod feed;
pub mod geojson_export;
pub mod gtfs_time;
pub mod index;
pub mod pipeline;
pub mod processor;
pub mod report;
pub mod route_merge;
pub mod simplify;
pub mod source;
pub mod sunlight;
pub mod travel_axis;
pub mod validation;

#[cfg(test)]
mod test_fixtures;

pub use config::{LoadOptions, RailsunConfig};
pub use pipeline::{Catalog, LoadError, LoadedFeed, load_catalog};
