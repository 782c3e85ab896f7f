// Copyright Kyler Chin <kyler@catenarymaps.org>

//! Collapses feed routes that are one physical service under several ids.

use crate::processor::{ProcessedCatalog, ProcessedTrip};
use crate::report::{self, LoadWarning, MergeSkipReason};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeGroup {
    pub route_ids: Vec<String>,
    pub merged_name: String,
    /// Defaults to the first listed route that is present.
    #[serde(default)]
    pub primary_route_id: Option<String>,
}

fn stop_set(trips: &[ProcessedTrip]) -> BTreeSet<&str> {
    trips.iter().flat_map(|trip| trip.stop_ids()).collect()
}

/// Whether both trip collections visit exactly the same stations, ignoring
/// order and repeats. An empty collection never matches.
pub fn have_identical_stops(a: &[ProcessedTrip], b: &[ProcessedTrip]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    stop_set(a) == stop_set(b)
}

pub fn merge_routes(
    catalog: &mut ProcessedCatalog,
    groups: &[MergeGroup],
    warnings: &mut Vec<LoadWarning>,
) {
    for group in groups {
        if let Err(reason) = merge_group(catalog, group) {
            report::record(
                warnings,
                LoadWarning::MergeSkipped {
                    merged_name: group.merged_name.clone(),
                    reason,
                },
            );
        }
    }
}

fn merge_group(catalog: &mut ProcessedCatalog, group: &MergeGroup) -> Result<(), MergeSkipReason> {
    let present = group
        .route_ids
        .iter()
        .filter(|route_id| catalog.routes.iter().any(|route| route.route_id == **route_id))
        .cloned()
        .collect::<Vec<String>>();

    if present.len() < 2 {
        return Err(MergeSkipReason::TooFewRoutes {
            found: present.len(),
        });
    }

    let primary_id = match &group.primary_route_id {
        Some(primary_id) if present.contains(primary_id) => primary_id.clone(),
        Some(primary_id) => {
            return Err(MergeSkipReason::PrimaryMissing {
                primary_route_id: primary_id.clone(),
            });
        }
        None => present[0].clone(),
    };

    let empty = Vec::new();
    let trips_of = |route_id: &str| catalog.schedules.get(route_id).unwrap_or(&empty);

    for route_id in &present {
        if trips_of(route_id.as_str()).is_empty() {
            return Err(MergeSkipReason::NoTrips {
                route_id: route_id.clone(),
            });
        }
    }

    let primary_trips = trips_of(primary_id.as_str());
    for route_id in present.iter().filter(|route_id| **route_id != primary_id) {
        if !have_identical_stops(primary_trips, trips_of(route_id.as_str())) {
            return Err(MergeSkipReason::StopSetMismatch {
                route_id: primary_id.clone(),
                other_route_id: route_id.clone(),
            });
        }
    }

    let others = present
        .iter()
        .filter(|route_id| **route_id != primary_id)
        .cloned()
        .collect::<Vec<String>>();

    let mut absorbed = Vec::with_capacity(others.len());
    catalog.routes.retain(|route| {
        if others.contains(&route.route_id) {
            absorbed.push(route.clone());
            false
        } else {
            true
        }
    });

    if let Some(primary) = catalog
        .routes
        .iter_mut()
        .find(|route| route.route_id == primary_id)
    {
        for other in &absorbed {
            primary.train_numbers.extend(other.train_numbers.iter().cloned());
            primary.shape_ids.extend(other.shape_ids.iter().cloned());
            for label in &other.direction_options {
                if !primary.direction_options.contains(label) {
                    primary.direction_options.push(label.clone());
                }
            }
        }
        primary.name = group.merged_name.clone();
    }

    let mut moved = Vec::new();
    for route_id in &others {
        if let Some(trips) = catalog.schedules.remove(route_id) {
            moved.extend(trips.into_iter().map(|mut trip| {
                trip.route_id = primary_id.clone();
                trip
            }));
        }
    }
    catalog
        .schedules
        .entry(primary_id.clone())
        .or_default()
        .extend(moved);

    log::info!(
        "Merged routes {:?} into {} as {:?}",
        others,
        primary_id,
        group.merged_name
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::DirectionLabel;
    use crate::test_fixtures;

    fn unmerged() -> ProcessedCatalog {
        let loaded = test_fixtures::load_fixture(test_fixtures::no_merge_config());
        ProcessedCatalog {
            routes: loaded.catalog.routes,
            schedules: loaded.catalog.schedules,
        }
    }

    fn northeast_group() -> MergeGroup {
        MergeGroup {
            route_ids: vec!["NER".to_string(), "NER2".to_string()],
            merged_name: "Northeast Regional".to_string(),
            primary_route_id: Some("NER".to_string()),
        }
    }

    #[test]
    fn test_identical_stops_symmetric_and_order_free() {
        let catalog = unmerged();
        let ner = &catalog.schedules["NER"];
        let ner2 = &catalog.schedules["NER2"];
        let bos = &catalog.schedules["BOS"];

        assert!(have_identical_stops(ner, ner2));
        assert!(have_identical_stops(ner2, ner));
        assert!(!have_identical_stops(ner, bos));
        assert!(!have_identical_stops(bos, ner));

        let mut shuffled = ner.clone();
        shuffled.reverse();
        for trip in &mut shuffled {
            trip.stops.reverse();
        }
        assert!(have_identical_stops(&shuffled, ner2));
        assert!(have_identical_stops(ner2, &shuffled));

        assert!(!have_identical_stops(&[], ner));
        assert!(!have_identical_stops(ner, &[]));
    }

    #[test]
    fn test_merge_collapses_routes() {
        let mut catalog = unmerged();
        let mut warnings = Vec::new();
        merge_routes(&mut catalog, &[northeast_group()], &mut warnings);
        assert!(warnings.is_empty());

        let route_ids = catalog
            .routes
            .iter()
            .map(|route| route.route_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(route_ids, vec!["NER", "BOS"]);

        let merged = &catalog.routes[0];
        assert_eq!(merged.name, "Northeast Regional");
        assert_eq!(
            merged.train_numbers.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["171", "172", "643", "67", "99"]
        );
        assert_eq!(
            merged.shape_ids.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["SH1", "SH2"]
        );
        assert_eq!(
            merged.direction_options,
            vec![
                DirectionLabel::Headsign("Washington".to_string()),
                DirectionLabel::Headsign("New York".to_string()),
                DirectionLabel::Headsign("Washington Union Station".to_string()),
            ]
        );
        assert_eq!(merged.color_hex(), "#1772ac");

        assert!(!catalog.schedules.contains_key("NER2"));
        let trips = &catalog.schedules["NER"];
        assert_eq!(trips.len(), 4);
        assert!(trips.iter().all(|trip| trip.route_id == "NER"));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut once = unmerged();
        let mut warnings = Vec::new();
        merge_routes(&mut once, &[northeast_group()], &mut warnings);

        let mut twice = once.clone();
        merge_routes(&mut twice, &[northeast_group()], &mut warnings);

        assert_eq!(once, twice);
        assert_eq!(
            warnings,
            vec![LoadWarning::MergeSkipped {
                merged_name: "Northeast Regional".to_string(),
                reason: MergeSkipReason::TooFewRoutes { found: 1 },
            }]
        );
    }

    #[test]
    fn test_mismatched_stops_skip_whole_group() {
        let mut catalog = unmerged();
        let before = catalog.clone();
        let group = MergeGroup {
            route_ids: vec!["NER".to_string(), "NER2".to_string(), "BOS".to_string()],
            merged_name: "Everything".to_string(),
            primary_route_id: None,
        };

        let mut warnings = Vec::new();
        merge_routes(&mut catalog, &[group], &mut warnings);

        assert_eq!(catalog, before);
        assert_eq!(
            warnings,
            vec![LoadWarning::MergeSkipped {
                merged_name: "Everything".to_string(),
                reason: MergeSkipReason::StopSetMismatch {
                    route_id: "NER".to_string(),
                    other_route_id: "BOS".to_string(),
                },
            }]
        );
    }

    #[test]
    fn test_missing_primary_skips() {
        let mut catalog = unmerged();
        let group = MergeGroup {
            route_ids: vec!["NER".to_string(), "NER2".to_string()],
            merged_name: "Northeast Regional".to_string(),
            primary_route_id: Some("GONE".to_string()),
        };

        let mut warnings = Vec::new();
        merge_routes(&mut catalog, &[group], &mut warnings);
        assert_eq!(catalog.routes.len(), 3);
        assert!(matches!(
            warnings[0],
            LoadWarning::MergeSkipped {
                reason: MergeSkipReason::PrimaryMissing { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_route_without_trips_skips() {
        let mut catalog = unmerged();
        catalog.schedules.remove("NER2");

        let mut warnings = Vec::new();
        merge_routes(&mut catalog, &[northeast_group()], &mut warnings);
        assert_eq!(catalog.routes.len(), 3);
        assert_eq!(
            warnings,
            vec![LoadWarning::MergeSkipped {
                merged_name: "Northeast Regional".to_string(),
                reason: MergeSkipReason::NoTrips {
                    route_id: "NER2".to_string()
                },
            }]
        );
    }
}
