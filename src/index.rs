// Copyright Kyler Chin <kyler@catenarymaps.org>

//! Hash-keyed lookups built once per load from the flat row sets.
//!
//! An id with no rows is simply absent from its map; callers treat a miss
//! as a normal outcome.

use crate::feed::{RouteRecord, ShapePointRecord, StopRecord, StopTimeRecord};
use ahash::AHashMap;
use geo::{Coord, coord};

#[derive(Debug, Clone, Default)]
pub struct FeedIndex {
    pub stops_by_id: AHashMap<String, StopRecord>,
    pub routes_by_id: AHashMap<String, RouteRecord>,
    /// Route ids in the order they first appear in routes.txt.
    pub route_order: Vec<String>,
    pub shapes_by_id: AHashMap<String, Vec<Coord<f64>>>,
    pub stop_times_by_trip: AHashMap<String, Vec<StopTimeRecord>>,
}

/// Last write wins on duplicate stop ids.
pub fn index_stops(stops: impl IntoIterator<Item = StopRecord>) -> AHashMap<String, StopRecord> {
    let mut stops_by_id = AHashMap::new();
    for stop in stops {
        stops_by_id.insert(stop.stop_id.clone(), stop);
    }
    stops_by_id
}

pub fn index_routes(
    routes: impl IntoIterator<Item = RouteRecord>,
) -> (AHashMap<String, RouteRecord>, Vec<String>) {
    let mut routes_by_id = AHashMap::new();
    let mut route_order = Vec::new();
    for route in routes {
        if !routes_by_id.contains_key(&route.route_id) {
            route_order.push(route.route_id.clone());
        }
        routes_by_id.insert(route.route_id.clone(), route);
    }
    (routes_by_id, route_order)
}

/// Groups shape points by shape id and orders each group by `shape_pt_sequence`.
pub fn index_shapes(
    points: impl IntoIterator<Item = ShapePointRecord>,
) -> AHashMap<String, Vec<Coord<f64>>> {
    let mut grouped: AHashMap<String, Vec<ShapePointRecord>> = AHashMap::new();
    for point in points {
        grouped.entry(point.shape_id.clone()).or_default().push(point);
    }

    grouped
        .into_iter()
        .map(|(shape_id, mut points)| {
            // stable, so equal sequence numbers keep file order
            points.sort_by_key(|point| point.shape_pt_sequence);
            let coords = points
                .into_iter()
                .map(|point| coord! { x: point.shape_pt_lon, y: point.shape_pt_lat })
                .collect::<Vec<_>>();
            (shape_id, coords)
        })
        .collect()
}

/// Groups stop times by trip id and orders each group by `stop_sequence`.
pub fn index_stop_times(
    stop_times: impl IntoIterator<Item = StopTimeRecord>,
) -> AHashMap<String, Vec<StopTimeRecord>> {
    let mut grouped: AHashMap<String, Vec<StopTimeRecord>> = AHashMap::new();
    for stop_time in stop_times {
        grouped
            .entry(stop_time.trip_id.clone())
            .or_default()
            .push(stop_time);
    }

    for stop_times in grouped.values_mut() {
        stop_times.sort_by_key(|stop_time| stop_time.stop_sequence);
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape_point(shape_id: &str, lat: f64, lon: f64, seq: u32) -> ShapePointRecord {
        ShapePointRecord {
            shape_id: shape_id.to_string(),
            shape_pt_lat: lat,
            shape_pt_lon: lon,
            shape_pt_sequence: seq,
        }
    }

    #[test]
    fn test_shapes_sorted_by_sequence() {
        let shapes = index_shapes(vec![
            shape_point("a", 3.0, 0.0, 3),
            shape_point("a", 1.0, 0.0, 1),
            shape_point("b", 9.0, 9.0, 1),
            shape_point("a", 2.0, 0.0, 2),
        ]);

        let a = &shapes["a"];
        assert_eq!(a.len(), 3);
        assert_eq!(a.iter().map(|c| c.y).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
        assert_eq!(shapes["b"].len(), 1);
        assert!(!shapes.contains_key("c"));
    }

    #[test]
    fn test_stop_times_sorted_by_sequence() {
        let row = |stop_id: &str, seq: u32| StopTimeRecord {
            trip_id: "T1".to_string(),
            stop_id: stop_id.to_string(),
            stop_sequence: seq,
            ..Default::default()
        };
        let grouped = index_stop_times(vec![row("WAS", 3), row("NYP", 1), row("PHL", 2)]);
        let ids = grouped["T1"]
            .iter()
            .map(|st| st.stop_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["NYP", "PHL", "WAS"]);
        assert!(grouped.get("T2").is_none());
    }

    #[test]
    fn test_stops_last_write_wins() {
        let stop = |name: &str| StopRecord {
            stop_id: "NYP".to_string(),
            stop_name: name.to_string(),
            ..Default::default()
        };
        let stops = index_stops(vec![stop("old"), stop("new")]);
        assert_eq!(stops.len(), 1);
        assert_eq!(stops["NYP"].stop_name, "new");
    }

    #[test]
    fn test_route_order_kept() {
        let route = |id: &str| RouteRecord {
            route_id: id.to_string(),
            ..Default::default()
        };
        let (by_id, order) = index_routes(vec![route("b"), route("a"), route("b")]);
        assert_eq!(by_id.len(), 2);
        assert_eq!(order, vec!["b".to_string(), "a".to_string()]);
    }
}
