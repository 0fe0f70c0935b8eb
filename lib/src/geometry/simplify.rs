//! Outline simplification.
//!
//! First-layer outlines come straight out of slicing and carry far more
//! vertices than adhesion rings need. Every extra vertex is multiplied by the
//! number of rings offset from the outline, so the outline is thinned first:
//!
//! - **Short segment removal**: vertices closer than a minimum segment length to
//!   the previously kept vertex are dropped.
//! - **Douglas-Peucker**: vertices within a maximum deviation of the simplified
//!   path are dropped.

use super::{Line, Point, Polygon};
use crate::{Coord, CoordF};

/// Segments shorter than this (0.2mm) are merged away.
pub const SMALLEST_LINE_LENGTH: Coord = 200;

/// Maximum deviation a removed vertex may cause (scaled units).
pub const LARGEST_ERROR_OF_REMOVED_POINT: Coord = 50;

/// Douglas-Peucker over an open path: keeps the endpoints and every vertex
/// that deviates more than `tolerance` from the chord of its kept neighbours.
pub fn douglas_peucker(points: &[Point], tolerance: Coord) -> Vec<Point> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }

    let limit = (tolerance as CoordF).powi(2);
    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    // Spans still to examine, as (first, last) indices
    let mut spans = vec![(0, n - 1)];
    while let Some((first, last)) = spans.pop() {
        let furthest = (first + 1..last)
            .map(|i| (i, Line::distance_to_squared(points[i], points[first], points[last])))
            .max_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((i, deviation)) = furthest {
            if deviation > limit {
                keep[i] = true;
                spans.push((first, i));
                spans.push((i, last));
            }
        }
    }

    points
        .iter()
        .zip(&keep)
        .filter_map(|(p, &kept)| kept.then_some(*p))
        .collect()
}

/// [`douglas_peucker`] on a closed loop. A loop that would drop below three
/// vertices is returned as is.
pub fn douglas_peucker_polygon(polygon: &Polygon, tolerance: Coord) -> Polygon {
    let points = polygon.points();
    if points.len() <= 3 {
        return polygon.clone();
    }

    let simplified = douglas_peucker(points, tolerance);
    if simplified.len() < 3 {
        return polygon.clone();
    }

    Polygon::from_points(simplified)
}

/// Remove vertices that lie closer than `min_length` to the previously kept one.
///
/// The closing edge is checked as well, so the last point is dropped when it
/// nearly coincides with the first.
pub fn remove_short_segments(points: &[Point], min_length: Coord) -> Vec<Point> {
    if points.len() <= 3 {
        return points.to_vec();
    }

    let min_sq = min_length as i128 * min_length as i128;
    let mut result: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        match result.last() {
            Some(last) if last.distance_squared(p) < min_sq => {}
            _ => result.push(*p),
        }
    }

    while result.len() > 3 {
        match (result.first(), result.last()) {
            (Some(first), Some(last)) if first.distance_squared(last) < min_sq => {
                result.pop();
            }
            _ => break,
        }
    }

    if result.len() < 3 {
        return points.to_vec();
    }
    result
}

/// Simplify a closed polygon: drop short segments, then Douglas-Peucker.
pub fn simplify_polygon(polygon: &Polygon, smallest_line_length: Coord, max_error: Coord) -> Polygon {
    let thinned = Polygon::from_points(remove_short_segments(polygon.points(), smallest_line_length));
    douglas_peucker_polygon(&thinned, max_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_line_points(start: (i64, i64), end: (i64, i64), count: usize) -> Vec<Point> {
        (0..count)
            .map(|i| {
                let t = i as f64 / (count - 1) as f64;
                Point::new(
                    start.0 + ((end.0 - start.0) as f64 * t).round() as i64,
                    start.1 + ((end.1 - start.1) as f64 * t).round() as i64,
                )
            })
            .collect()
    }

    #[test]
    fn test_douglas_peucker_straight_line() {
        let points = make_line_points((0, 0), (10_000, 0), 11);
        let simplified = douglas_peucker(&points, 10);
        assert_eq!(simplified.len(), 2);
        assert_eq!(simplified[0], Point::new(0, 0));
        assert_eq!(simplified[1], Point::new(10_000, 0));
    }

    #[test]
    fn test_douglas_peucker_keeps_corner() {
        let points = vec![
            Point::new(0, 0),
            Point::new(5_000, 0),
            Point::new(5_000, 5_000),
        ];
        let simplified = douglas_peucker(&points, 10);
        assert_eq!(simplified.len(), 3);
    }

    #[test]
    fn test_remove_short_segments() {
        let points = vec![
            Point::new(0, 0),
            Point::new(50, 0),
            Point::new(1_000, 0),
            Point::new(1_000, 1_000),
            Point::new(0, 1_000),
            Point::new(0, 20),
        ];
        let thinned = remove_short_segments(&points, SMALLEST_LINE_LENGTH);
        assert_eq!(thinned.len(), 4);
    }

    #[test]
    fn test_simplify_polygon_keeps_square() {
        let mut points = make_line_points((0, 0), (10_000, 0), 21);
        points.extend(make_line_points((10_000, 0), (10_000, 10_000), 21).into_iter().skip(1));
        points.push(Point::new(0, 10_000));
        let polygon = Polygon::from_points(points);

        let simplified =
            simplify_polygon(&polygon, SMALLEST_LINE_LENGTH, LARGEST_ERROR_OF_REMOVED_POINT);
        assert_eq!(simplified.len(), 4);
        assert!((simplified.area() - polygon.area()).abs() < 1.0);
    }
}
