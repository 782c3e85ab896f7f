// Copyright Kyler Chin <kyler@catenarymaps.org>

//! Douglas-Peucker decimation of dense shape geometry.
//!
//! Distances are planar in degree space, which is fine for visual
//! simplification but not geodesically accurate. The split recursion is
//! driven by an explicit stack instead of the call stack; the stack never
//! holds more than one pending range per input point, so pathological
//! shapes cost O(n) memory rather than O(n) call depth.

use ahash::AHashMap;
use geo::Coord;

/// Distance from `point` to the infinite line through `start` and `end`,
/// or to `start` when the two coincide.
pub fn perpendicular_distance(point: Coord<f64>, start: Coord<f64>, end: Coord<f64>) -> f64 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let chord = (dx * dx + dy * dy).sqrt();

    if chord == 0.0 {
        return ((point.x - start.x).powi(2) + (point.y - start.y).powi(2)).sqrt();
    }

    (dy * point.x - dx * point.y + end.x * start.y - end.y * start.x).abs() / chord
}

pub fn douglas_peucker(points: &[Coord<f64>], tolerance: f64) -> Vec<Coord<f64>> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut pending = vec![(0usize, points.len() - 1)];

    while let Some((start, end)) = pending.pop() {
        if end - start < 2 {
            continue;
        }

        let mut max_distance = 0.0;
        let mut max_index = start;
        for index in (start + 1)..end {
            let distance = perpendicular_distance(points[index], points[start], points[end]);
            // strict comparison so ties stay on the lowest index
            if distance > max_distance {
                max_distance = distance;
                max_index = index;
            }
        }

        if max_index != start && max_distance > tolerance {
            keep[max_index] = true;
            pending.push((max_index, end));
            pending.push((start, max_index));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(point, kept)| kept.then_some(*point))
        .collect()
}

/// Simplifies every shape in place.
pub fn simplify_shapes(shapes: &mut AHashMap<String, Vec<Coord<f64>>>, tolerance: f64) {
    let mut before = 0;
    let mut after = 0;
    for points in shapes.values_mut() {
        before += points.len();
        *points = douglas_peucker(points, tolerance);
        after += points.len();
    }
    log::debug!(
        "Simplified {} shapes from {} to {} points",
        shapes.len(),
        before,
        after
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    #[test]
    fn test_collinear_collapses_to_endpoints() {
        let points = (0..10)
            .map(|i| coord! { x: i as f64, y: 2.0 * i as f64 })
            .collect::<Vec<_>>();
        let simplified = douglas_peucker(&points, 0.01);
        assert_eq!(simplified, vec![points[0], points[9]]);
    }

    #[test]
    fn test_zero_tolerance_keeps_bent_line() {
        let points = vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 0.5 },
            coord! { x: 2.0, y: -0.3 },
            coord! { x: 3.0, y: 0.8 },
            coord! { x: 4.0, y: 0.1 },
        ];
        assert_eq!(douglas_peucker(&points, 0.0).len(), points.len());
    }

    #[test]
    fn test_short_input_unchanged() {
        let points = vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 5.0, y: 5.0 }];
        assert_eq!(douglas_peucker(&points, 10.0), points);
        assert!(douglas_peucker(&[], 1.0).is_empty());
    }

    #[test]
    fn test_keeps_significant_corner() {
        let points = vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 1.5 },
            coord! { x: 2.0, y: 3.0 },
            coord! { x: 3.0, y: 1.5 },
            coord! { x: 4.0, y: 0.0 },
        ];
        let simplified = douglas_peucker(&points, 0.5);
        assert_eq!(simplified, vec![points[0], points[2], points[4]]);
    }

    #[test]
    fn test_tie_resolves_to_first() {
        // both interior points sit 1.0 off the chord
        let points = vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
            coord! { x: 2.0, y: 1.0 },
            coord! { x: 3.0, y: 0.0 },
        ];
        // splitting on index 1 leaves index 2 only 0.45 off the new chord
        let simplified = douglas_peucker(&points, 0.9);
        assert_eq!(simplified, vec![points[0], points[1], points[3]]);
    }

    #[test]
    fn test_distance_to_degenerate_chord() {
        let origin = coord! { x: 0.0, y: 0.0 };
        let distance = perpendicular_distance(coord! { x: 3.0, y: 4.0 }, origin, origin);
        assert!((distance - 5.0).abs() < 1e-12);
    }
}
