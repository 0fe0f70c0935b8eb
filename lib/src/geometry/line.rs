//! Polygon edges.

use super::Point;
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Segment from `a` to `b`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    pub a: Point,
    pub b: Point,
}

pub type Lines = Vec<Line>;

impl Line {
    #[inline]
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn length(&self) -> CoordF {
        self.a.distance(&self.b)
    }

    /// Distance from `p` to the nearest point of the segment.
    pub fn distance_to(&self, p: Point) -> CoordF {
        Self::distance_to_squared(p, self.a, self.b).sqrt()
    }

    /// Squared distance from `p` to the segment `a`-`b`.
    pub fn distance_to_squared(p: Point, a: Point, b: Point) -> CoordF {
        p.distance_squared(&p.project_onto_segment(a, b)) as CoordF
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({:?} -> {:?})", self.a, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length() {
        let edge = Line::new(Point::new(0, 0), Point::new(300, 400));
        assert!((edge.length() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_clamps_to_endpoints() {
        let edge = Line::new(Point::new(0, 0), Point::new(1_000, 0));
        assert!((edge.distance_to(Point::new(500, 200)) - 200.0).abs() < 1e-9);
        assert!((edge.distance_to(Point::new(1_300, 400)) - 500.0).abs() < 1e-9);
        assert!((Line::distance_to_squared(Point::new(-30, 40), edge.a, edge.b) - 2_500.0).abs() < 1e-9);
    }
}
