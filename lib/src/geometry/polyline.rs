//! Open paths.
//!
//! Brim rings that run into another extruder's parts are cut open there; the
//! remaining pieces are kept as [`Polyline`]s.

use super::{BoundingBox, Line, Point};
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// An open path. Unlike a [`super::Polygon`] the last point does not connect
/// back to the first.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    points: Vec<Point>,
}

pub type Polylines = Vec<Polyline>;

impl Polyline {
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn first_point(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last_point(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Length in scaled units.
    pub fn length(&self) -> Coord {
        let total: CoordF = self
            .points
            .windows(2)
            .map(|pair| Line::new(pair[0], pair[1]).length())
            .sum();
        total.round() as Coord
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// At least one segment.
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Append `other`, whose first point must equal this path's last point.
    pub fn join(&mut self, other: &Polyline) {
        let skip = usize::from(self.last_point() == other.first_point());
        self.points.extend(other.points.iter().skip(skip).copied());
    }
}

impl fmt::Debug for Polyline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polyline({:?})", self.points)
    }
}

impl Deref for Polyline {
    type Target = Vec<Point>;

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl From<Vec<Point>> for Polyline {
    fn from(points: Vec<Point>) -> Self {
        Self::from_points(points)
    }
}

/// Total length of a set of open paths.
pub fn polylines_length(polylines: &[Polyline]) -> Coord {
    polylines.iter().map(Polyline::length).sum()
}
