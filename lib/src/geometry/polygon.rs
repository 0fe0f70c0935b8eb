//! Closed polygon type.
//!
//! A [`Polygon`] is a closed loop of points; the closing edge from the last
//! point back to the first is implicit. Signed area encodes orientation:
//! counter-clockwise loops are outer boundaries, clockwise loops are holes.

use super::{BoundingBox, Line, Point};
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};

/// A closed polygon (the last point connects back to the first).
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    points: Vec<Point>,
}

/// A collection of polygons.
pub type Polygons = Vec<Polygon>;

impl Polygon {
    /// Create an empty polygon.
    #[inline]
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a polygon from a list of points.
    #[inline]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Create an axis-aligned rectangle (counter-clockwise) from two corners.
    pub fn rectangle(min: Point, max: Point) -> Self {
        Self::from_points(vec![
            Point::new(min.x, min.y),
            Point::new(max.x, min.y),
            Point::new(max.x, max.y),
            Point::new(min.x, max.y),
        ])
    }

    /// Get the points of this polygon.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Twice the signed area, exact.
    pub fn area2(&self) -> i128 {
        let n = self.points.len();
        if n < 3 {
            return 0;
        }
        (0..n)
            .map(|i| self.points[i].cross(&self.points[(i + 1) % n]))
            .sum()
    }

    /// Signed area (positive for counter-clockwise) in scaled units².
    #[inline]
    pub fn area(&self) -> CoordF {
        self.area2() as CoordF / 2.0
    }

    /// Whether the polygon winds counter-clockwise.
    #[inline]
    pub fn is_counter_clockwise(&self) -> bool {
        self.area2() > 0
    }

    /// Make the polygon counter-clockwise. Returns true if it was reversed.
    pub fn make_counter_clockwise(&mut self) -> bool {
        if self.area2() < 0 {
            self.points.reverse();
            true
        } else {
            false
        }
    }

    /// Make the polygon clockwise. Returns true if it was reversed.
    pub fn make_clockwise(&mut self) -> bool {
        if self.area2() > 0 {
            self.points.reverse();
            true
        } else {
            false
        }
    }

    /// Edges of the polygon, including the closing edge.
    pub fn edges(&self) -> Vec<Line> {
        let n = self.points.len();
        if n < 2 {
            return Vec::new();
        }
        (0..n)
            .map(|i| Line::new(self.points[i], self.points[(i + 1) % n]))
            .collect()
    }

    /// Perimeter length in scaled units, including the closing edge.
    pub fn length(&self) -> Coord {
        let total: CoordF = self.edges().iter().map(Line::length).sum();
        total.round() as Coord
    }

    /// Axis-aligned bounding box.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Even-odd point containment test. Points on the boundary may go either way.
    pub fn contains_point(&self, p: &Point) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let pi = self.points[i];
            let pj = self.points[j];
            if (pi.y > p.y) != (pj.y > p.y) {
                // x coordinate of the edge at p.y, compared without division
                let lhs = (p.x - pi.x) as i128 * (pj.y - pi.y) as i128;
                let rhs = (pj.x - pi.x) as i128 * (p.y - pi.y) as i128;
                if (pj.y > pi.y && lhs < rhs) || (pj.y < pi.y && lhs > rhs) {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Translate all points by a vector.
    pub fn translate(&mut self, v: Point) {
        for p in &mut self.points {
            *p = *p + v;
        }
    }

    /// Whether this polygon has enough points to enclose an area.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 3
    }
}

impl fmt::Debug for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polygon({:?})", self.points)
    }
}

impl Deref for Polygon {
    type Target = Vec<Point>;

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl DerefMut for Polygon {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.points
    }
}

impl FromIterator<Point> for Polygon {
    fn from_iter<T: IntoIterator<Item = Point>>(iter: T) -> Self {
        Self::from_points(iter.into_iter().collect())
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(points: Vec<Point>) -> Self {
        Self::from_points(points)
    }
}

/// Total perimeter length of a set of polygons.
pub fn polygons_length(polygons: &[Polygon]) -> Coord {
    polygons.iter().map(Polygon::length).sum()
}
