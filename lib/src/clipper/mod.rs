//! Polygon set algebra on top of geo-clipper.
//!
//! Everything skirt/brim generation does to areas goes through here:
//! - offsetting rings outward from an outline, or inward into a band
//! - trimming support under the model brim
//! - subtracting already lined area before support and shield brim
//! - cutting brim rings open where they would cross another material
//!
//! Points are integer micrometres and go to Clipper with a factor of 1.0, so
//! Clipper's own integer rounding is exact and repeated offsets don't drift.
//! Clipper fills non-zero: contours are handed over counter-clockwise and
//! holes clockwise whatever orientation the input had.

use crate::geometry::{ExPolygon, ExPolygons, Point, Polygon, Polygons, Polyline, Polylines};
use crate::{Coord, CoordF};
use geo::{
    ConvexHull, Coord as GeoCoord, LineString, MultiLineString, MultiPolygon,
    Polygon as GeoPolygon,
};
use geo_clipper::{Clipper, EndType, JoinType};
use serde::{Deserialize, Serialize};

/// Input is already integral.
const CLIPPER_FACTOR: CoordF = 1.0;

/// Maximum deviation of a round join from the true arc (scaled units).
const ROUND_ARC_TOLERANCE: CoordF = 0.25;

/// Miter joins sharper than this multiple of the offset get squared off.
const MITER_LIMIT: CoordF = 2.0;

/// Corner style of an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetJoinType {
    Square,
    /// Arcs around convex corners. What a round nozzle actually traces.
    #[default]
    Round,
    /// Sharp corners, so offsets of rectilinear outlines stay rectilinear.
    Miter,
}

impl From<OffsetJoinType> for JoinType {
    fn from(join_type: OffsetJoinType) -> Self {
        match join_type {
            OffsetJoinType::Square => JoinType::Square,
            OffsetJoinType::Round => JoinType::Round(ROUND_ARC_TOLERANCE),
            OffsetJoinType::Miter => JoinType::Miter(MITER_LIMIT),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

fn open_line_string(points: &[Point]) -> LineString<f64> {
    LineString::new(
        points
            .iter()
            .map(|p| GeoCoord {
                x: p.x as f64,
                y: p.y as f64,
            })
            .collect(),
    )
}

fn closed_line_string(points: &[Point]) -> LineString<f64> {
    let LineString(mut coords) = open_line_string(points);
    if let Some(&first) = coords.first() {
        if coords.last() != Some(&first) {
            coords.push(first);
        }
    }
    LineString::new(coords)
}

/// Loop with the given winding. Zero-area loops pass through as they are.
fn wound(polygon: &Polygon, counter_clockwise: bool) -> LineString<f64> {
    if polygon.area2() == 0 || polygon.is_counter_clockwise() == counter_clockwise {
        closed_line_string(polygon.points())
    } else {
        let reversed: Vec<Point> = polygon.points().iter().rev().copied().collect();
        closed_line_string(&reversed)
    }
}

fn to_geo(expolygon: &ExPolygon) -> GeoPolygon<f64> {
    GeoPolygon::new(
        wound(&expolygon.contour, true),
        expolygon.holes.iter().map(|h| wound(h, false)).collect(),
    )
}

fn to_geo_multi(expolygons: &[ExPolygon]) -> MultiPolygon<f64> {
    MultiPolygon::new(expolygons.iter().map(to_geo).collect())
}

/// Every loop as a solid contour.
fn loops_to_geo_multi(polygons: &[Polygon]) -> MultiPolygon<f64> {
    MultiPolygon::new(
        polygons
            .iter()
            .map(|p| GeoPolygon::new(wound(p, true), vec![]))
            .collect(),
    )
}

fn points_of(line_string: &LineString<f64>) -> Vec<Point> {
    line_string
        .coords()
        .map(|c| Point::new(c.x.round() as Coord, c.y.round() as Coord))
        .collect()
}

fn from_line_string(line_string: &LineString<f64>) -> Polygon {
    let mut points = points_of(line_string);
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    Polygon::from_points(points)
}

/// Back to ExPolygons, dropping parts that rounded away to nothing.
fn from_geo_multi(multi: &MultiPolygon<f64>) -> ExPolygons {
    multi
        .0
        .iter()
        .map(|polygon| {
            let holes = polygon
                .interiors()
                .iter()
                .map(from_line_string)
                .filter(Polygon::is_valid)
                .collect();
            ExPolygon::with_holes(from_line_string(polygon.exterior()), holes)
        })
        .filter(|expolygon| !expolygon.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Booleans
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum BooleanOp {
    Union,
    Intersection,
    Difference,
}

fn boolean(subject: &[ExPolygon], clip: &[ExPolygon], op: BooleanOp) -> ExPolygons {
    let subject = to_geo_multi(subject);
    let clip = to_geo_multi(clip);
    let result = match op {
        BooleanOp::Union => subject.union(&clip, CLIPPER_FACTOR),
        BooleanOp::Intersection => subject.intersection(&clip, CLIPPER_FACTOR),
        BooleanOp::Difference => subject.difference(&clip, CLIPPER_FACTOR),
    };
    from_geo_multi(&result)
}

/// Area covered by either set.
pub fn union(subject: &[ExPolygon], clip: &[ExPolygon]) -> ExPolygons {
    match (subject.is_empty(), clip.is_empty()) {
        (true, _) => union_ex(clip),
        (_, true) => union_ex(subject),
        _ => boolean(subject, clip, BooleanOp::Union),
    }
}

/// Merge the overlapping members of one set.
pub fn union_ex(expolygons: &[ExPolygon]) -> ExPolygons {
    match expolygons {
        [] => vec![],
        [single] => vec![single.clone()],
        [first, rest @ ..] => boolean(std::slice::from_ref(first), rest, BooleanOp::Union),
    }
}

/// Area covered by both sets.
pub fn intersection(subject: &[ExPolygon], clip: &[ExPolygon]) -> ExPolygons {
    if subject.is_empty() || clip.is_empty() {
        return vec![];
    }
    boolean(subject, clip, BooleanOp::Intersection)
}

/// `subject` with `clip` cut away.
pub fn difference(subject: &[ExPolygon], clip: &[ExPolygon]) -> ExPolygons {
    if subject.is_empty() || clip.is_empty() {
        return subject.to_vec();
    }
    boolean(subject, clip, BooleanOp::Difference)
}

// ---------------------------------------------------------------------------
// Offsets
// ---------------------------------------------------------------------------

/// Offset an area by `delta` scaled units: outward when positive, inward when
/// negative. Holes move the opposite way. A zero delta just merges the set.
pub fn offset_expolygons(
    expolygons: &[ExPolygon],
    delta: Coord,
    join_type: OffsetJoinType,
) -> ExPolygons {
    if expolygons.is_empty() {
        return vec![];
    }
    if delta == 0 {
        return union_ex(expolygons);
    }
    let result = to_geo_multi(expolygons).offset(
        delta as CoordF,
        join_type.into(),
        EndType::ClosedPolygon,
        CLIPPER_FACTOR,
    );
    from_geo_multi(&result)
}

/// Offset closed loops, each taken as a solid contour whatever its winding.
pub fn offset_polygons(polygons: &[Polygon], delta: Coord, join_type: OffsetJoinType) -> ExPolygons {
    if polygons.is_empty() {
        return vec![];
    }
    let result = loops_to_geo_multi(polygons).offset(
        delta as CoordF,
        join_type.into(),
        EndType::ClosedPolygon,
        CLIPPER_FACTOR,
    );
    from_geo_multi(&result)
}

/// Inward offset by `distance`.
pub fn shrink(expolygons: &[ExPolygon], distance: Coord, join_type: OffsetJoinType) -> ExPolygons {
    offset_expolygons(expolygons, -distance.abs(), join_type)
}

/// Outward offset by `distance`.
pub fn grow(expolygons: &[ExPolygon], distance: Coord, join_type: OffsetJoinType) -> ExPolygons {
    offset_expolygons(expolygons, distance.abs(), join_type)
}

/// Grow then shrink by `distance`. Parts less than `2 * distance` apart become
/// one and narrow gaps fill in. Everything else keeps its shape.
pub fn closing(expolygons: &[ExPolygon], distance: Coord, join_type: OffsetJoinType) -> ExPolygons {
    if expolygons.is_empty() || distance <= 0 {
        return expolygons.to_vec();
    }
    shrink(&grow(expolygons, distance, join_type), distance, join_type)
}

// ---------------------------------------------------------------------------
// Open paths
// ---------------------------------------------------------------------------

/// Area swept by open `paths` widened by `delta` on each side, ends rounded.
pub fn offset_polylines(paths: &[Polyline], delta: Coord, join_type: OffsetJoinType) -> ExPolygons {
    if paths.is_empty() || delta <= 0 {
        return vec![];
    }
    let multi = MultiLineString::new(paths.iter().map(|p| open_line_string(p.points())).collect());
    let result = geo_clipper::ClipperOpen::offset(
        &multi,
        delta as CoordF,
        join_type.into(),
        EndType::OpenRound(ROUND_ARC_TOLERANCE),
        CLIPPER_FACTOR,
    );
    from_geo_multi(&result)
}

/// Cut closed `loops` where they run through `exclude`.
///
/// Loops clear of `exclude` come back closed. Of the others only the parts
/// outside `exclude` are kept, as open paths. A loop entirely inside is gone.
pub fn clip_loops(loops: &[Polygon], exclude: &[ExPolygon]) -> (Polygons, Polylines) {
    if exclude.is_empty() {
        return (loops.to_vec(), vec![]);
    }
    let exclude = to_geo_multi(exclude);

    let mut closed = Vec::new();
    let mut open = Vec::new();
    for ring in loops.iter().filter(|r| r.is_valid()) {
        let path = MultiLineString::new(vec![closed_line_string(ring.points())]);
        let inside: Coord = geo_clipper::ClipperOpen::intersection(&path, &exclude, CLIPPER_FACTOR)
            .0
            .iter()
            .map(|l| Polyline::from_points(points_of(l)).length())
            .sum();
        if inside == 0 {
            closed.push(ring.clone());
            continue;
        }

        let pieces: Polylines = geo_clipper::ClipperOpen::difference(&path, &exclude, CLIPPER_FACTOR)
            .0
            .iter()
            .map(|l| Polyline::from_points(points_of(l)))
            .filter(Polyline::is_valid)
            .collect();
        open.extend(rejoin_seam(pieces, ring.points()[0]));
    }
    (closed, open)
}

/// A loop clipped as an open path is also split at its start point. Glue the
/// two pieces meeting there back together.
fn rejoin_seam(mut pieces: Polylines, seam: Point) -> Polylines {
    let at_seam: Vec<usize> = pieces
        .iter()
        .enumerate()
        .filter(|(_, p)| p.first_point() == Some(seam) || p.last_point() == Some(seam))
        .map(|(i, _)| i)
        .take(2)
        .collect();
    if let [a, b] = at_seam[..] {
        let mut tail = pieces[a].clone();
        if tail.first_point() == Some(seam) {
            tail.reverse();
        }
        let mut head = pieces.remove(b);
        if head.last_point() == Some(seam) {
            head.reverse();
        }
        tail.join(&head);
        pieces[a] = tail;
    }
    pieces
}

// ---------------------------------------------------------------------------
// Cleanup and measures
// ---------------------------------------------------------------------------

/// Drop holes with an area below `min_hole_area` (scaled units²).
pub fn remove_small_holes(expolygons: &[ExPolygon], min_hole_area: CoordF) -> ExPolygons {
    expolygons
        .iter()
        .map(|expolygon| ExPolygon {
            contour: expolygon.contour.clone(),
            holes: expolygon
                .holes
                .iter()
                .filter(|hole| hole.area().abs() >= min_hole_area)
                .cloned()
                .collect(),
        })
        .collect()
}

/// Smallest convex area around every contour of the set.
pub fn convex_hull(expolygons: &[ExPolygon]) -> ExPolygons {
    if expolygons.is_empty() {
        return vec![];
    }
    let hull = to_geo_multi(expolygons).convex_hull();
    let hull = ExPolygon::new(from_line_string(hull.exterior()));
    if hull.is_empty() {
        vec![]
    } else {
        vec![hull]
    }
}

/// Net area of a set in scaled units².
pub fn total_area(expolygons: &[ExPolygon]) -> CoordF {
    expolygons.iter().map(ExPolygon::area).sum()
}
