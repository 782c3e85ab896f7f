// Copyright Kyler Chin <kyler@catenarymaps.org>

//! Load options, merge groups and route categories, read from a RON file.

use crate::route_merge::MergeGroup;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Keep only the primary agency's rail routes and everything hanging off them.
    pub filter_to_primary_agency_trains_only: bool,
    pub include_dense_shapes: bool,
    pub include_stop_times: bool,
    /// Defaults to the first row of agency.txt.
    pub primary_agency_id: Option<String>,
    /// Douglas-Peucker tolerance in degrees. `None` leaves shapes dense.
    pub shape_simplify_tolerance: Option<f64>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            filter_to_primary_agency_trains_only: true,
            include_dense_shapes: true,
            include_stop_times: true,
            primary_agency_id: None,
            shape_simplify_tolerance: Some(0.0005),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RailsunConfig {
    pub load: LoadOptions,
    pub merge_groups: Vec<MergeGroup>,
    /// Route id to category label.
    pub categories: BTreeMap<String, String>,
}

impl RailsunConfig {
    pub fn from_ron_str(text: &str) -> Result<RailsunConfig, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<RailsunConfig, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }
}
