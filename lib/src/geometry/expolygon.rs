//! Polygon with holes.

use super::{BoundingBox, Point, Polygon, Polygons};
use crate::CoordF;
use serde::{Deserialize, Serialize};

/// An outer contour (counter-clockwise) with zero or more holes (clockwise).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExPolygon {
    pub contour: Polygon,
    #[serde(default)]
    pub holes: Vec<Polygon>,
}

/// A collection of polygons with holes, i.e. a planar area.
pub type ExPolygons = Vec<ExPolygon>;

impl ExPolygon {
    /// Create an ExPolygon without holes.
    pub fn new(contour: Polygon) -> Self {
        Self::with_holes(contour, Vec::new())
    }

    /// Create an ExPolygon with holes, normalising orientation.
    pub fn with_holes(mut contour: Polygon, mut holes: Vec<Polygon>) -> Self {
        contour.make_counter_clockwise();
        for hole in &mut holes {
            hole.make_clockwise();
        }
        Self { contour, holes }
    }

    /// Net area (contour minus holes) in scaled units².
    pub fn area(&self) -> CoordF {
        self.contour.area().abs() - self.holes.iter().map(|h| h.area().abs()).sum::<CoordF>()
    }

    /// Whether the contour is degenerate.
    pub fn is_empty(&self) -> bool {
        !self.contour.is_valid()
    }

    /// Point containment: inside the contour and outside every hole.
    pub fn contains_point(&self, p: &Point) -> bool {
        self.contour.contains_point(p) && !self.holes.iter().any(|h| h.contains_point(p))
    }

    /// Bounding box of the contour.
    pub fn bounding_box(&self) -> BoundingBox {
        self.contour.bounding_box()
    }

    /// Contour and holes as individual polygons, contour first.
    pub fn to_polygons(&self) -> Polygons {
        let mut result = Vec::with_capacity(1 + self.holes.len());
        result.push(self.contour.clone());
        result.extend(self.holes.iter().cloned());
        result
    }
}

impl From<Polygon> for ExPolygon {
    fn from(contour: Polygon) -> Self {
        ExPolygon::new(contour)
    }
}

/// Flatten ExPolygons into contour and hole polygons.
pub fn to_polygons(expolygons: &[ExPolygon]) -> Polygons {
    expolygons.iter().flat_map(ExPolygon::to_polygons).collect()
}

/// Bounding box around a set of ExPolygons.
pub fn get_extents(expolygons: &[ExPolygon]) -> BoundingBox {
    let mut bb = BoundingBox::new();
    for expoly in expolygons {
        bb.merge(&expoly.bounding_box());
    }
    bb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Coord;

    fn square(min: Coord, max: Coord) -> Polygon {
        Polygon::rectangle(Point::new(min, min), Point::new(max, max))
    }

    #[test]
    fn test_area_with_hole() {
        let expoly = ExPolygon::with_holes(square(0, 100), vec![square(25, 75)]);
        assert!((expoly.area() - 7_500.0).abs() < 1e-6);
        assert!(expoly.contour.is_counter_clockwise());
        assert!(!expoly.holes[0].is_counter_clockwise());
    }

    #[test]
    fn test_contains_point_respects_holes() {
        let expoly = ExPolygon::with_holes(square(0, 100), vec![square(25, 75)]);
        assert!(expoly.contains_point(&Point::new(10, 10)));
        assert!(!expoly.contains_point(&Point::new(50, 50)));
    }

    #[test]
    fn test_to_polygons_keeps_holes() {
        let expoly = ExPolygon::with_holes(square(0, 100), vec![square(25, 75)]);
        let loops = to_polygons(&[expoly]);
        assert_eq!(loops.len(), 2);
        assert_eq!(crate::geometry::polygons_length(&loops), 600);
    }
}
