//! Covered-area bookkeeping.
//!
//! Skirt/brim sources are generated one after another. Each later source
//! (support brim, shield brim) subtracts the area earlier lines already sweep
//! so no region is printed twice.

use crate::clipper::{
    difference, offset_polygons, offset_polylines, total_area, union, union_ex, OffsetJoinType,
};
use crate::geometry::{ExPolygon, ExPolygons, Polygon, Polyline};
use crate::{Coord, CoordF};

/// Area swept by printing closed `lines` with the given line width.
///
/// Each ring becomes a band of `line_width` centred on it. Rings are treated
/// as outer loops whatever their orientation, so hole rings of an offset
/// outline are handled the same way as contours.
pub fn line_coverage(lines: &[Polygon], line_width: Coord) -> ExPolygons {
    if line_width <= 0 {
        return vec![];
    }
    let half_width = (line_width + 1) / 2;

    let mut bands = Vec::new();
    for ring in lines.iter().filter(|r| r.is_valid()) {
        let ring = std::slice::from_ref(ring);
        let outer = offset_polygons(ring, half_width, OffsetJoinType::Round);
        let inner = offset_polygons(ring, -half_width, OffsetJoinType::Round);
        bands.extend(difference(&outer, &inner));
    }
    union_ex(&bands)
}

/// Area swept by printing open `paths` with the given line width.
pub fn polyline_coverage(paths: &[Polyline], line_width: Coord) -> ExPolygons {
    let paths: Vec<Polyline> = paths.iter().filter(|p| p.is_valid()).cloned().collect();
    offset_polylines(&paths, (line_width + 1) / 2, OffsetJoinType::Round)
}

/// Union the area swept by `lines` into `covered`.
pub fn accumulate(covered: &[ExPolygon], lines: &[Polygon], line_width: Coord) -> ExPolygons {
    union(covered, &line_coverage(lines, line_width))
}

/// The part of `area` that nothing has covered yet.
pub fn subtract_covered(area: &[ExPolygon], covered: &[ExPolygon]) -> ExPolygons {
    difference(area, covered)
}

/// Running union of all area committed to skirt/brim lines.
///
/// Only grows: every update is a union with the previous value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoveredArea {
    area: ExPolygons,
}

impl CoveredArea {
    /// Nothing covered yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The covered area.
    pub fn area(&self) -> &[ExPolygon] {
        &self.area
    }

    /// Whether no line has been committed.
    pub fn is_empty(&self) -> bool {
        self.area.is_empty()
    }

    /// Covered area in scaled units².
    pub fn total_area(&self) -> CoordF {
        total_area(&self.area)
    }

    /// Add the area swept by `lines`.
    #[must_use]
    pub fn with_lines(self, lines: &[Polygon], line_width: Coord) -> Self {
        if lines.is_empty() {
            return self;
        }
        Self {
            area: accumulate(&self.area, lines, line_width),
        }
    }

    /// Add the area swept by open `paths`.
    #[must_use]
    pub fn with_polylines(self, paths: &[Polyline], line_width: Coord) -> Self {
        if paths.is_empty() {
            return self;
        }
        Self {
            area: union(&self.area, &polyline_coverage(paths, line_width)),
        }
    }

    /// Add an already computed area.
    #[must_use]
    pub fn with_area(self, area: &[ExPolygon]) -> Self {
        if area.is_empty() {
            return self;
        }
        Self {
            area: union(&self.area, area),
        }
    }

    /// The part of `area` not yet covered.
    pub fn subtract_from(&self, area: &[ExPolygon]) -> ExPolygons {
        subtract_covered(area, &self.area)
    }
}
