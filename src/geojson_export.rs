// Copyright Kyler Chin <kyler@catenarymaps.org>

use crate::pipeline::Catalog;
use crate::processor::ProcessedRoute;
use crate::sunlight::SunlightSegment;
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject};
use serde_json::json;

fn line_feature(points: Vec<geo::Coord<f64>>, properties: JsonObject) -> Feature {
    let line = geo::LineString::new(points);
    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::from(&line)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// One LineString per segment with `phase`, `intensity` and `time` properties.
pub fn segments_to_geojson(segments: &[SunlightSegment]) -> GeoJson {
    let features = segments
        .iter()
        .map(|segment| {
            let mut properties = JsonObject::new();
            properties.insert("phase".to_string(), json!(segment.phase));
            properties.insert("intensity".to_string(), json!(segment.intensity));
            properties.insert("time".to_string(), json!(segment.midpoint_time.to_rfc3339()));
            line_feature(vec![segment.start, segment.end], properties)
        })
        .collect::<Vec<Feature>>();

    GeoJson::from(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Every shape the route uses, coloured with the route colour. Shape ids
/// missing from the catalog are skipped.
pub fn route_shapes_to_geojson(route: &ProcessedRoute, catalog: &Catalog) -> GeoJson {
    let features = route
        .shape_ids
        .iter()
        .filter_map(|shape_id| catalog.shape(shape_id).map(|points| (shape_id, points)))
        .map(|(shape_id, points)| {
            let mut properties = JsonObject::new();
            properties.insert("route_id".to_string(), json!(route.route_id));
            properties.insert("shape_id".to_string(), json!(shape_id));
            properties.insert("name".to_string(), json!(route.name));
            properties.insert("color".to_string(), json!(route.color_hex()));
            if let Some(category) = &route.category {
                properties.insert("category".to_string(), json!(category));
            }
            line_feature(points.to_vec(), properties)
        })
        .collect::<Vec<Feature>>();

    GeoJson::from(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}
