//! Concentric ring generation.
//!
//! A ring sequence offsets a reference outline by a growing distance, one
//! line width per ring. Outward sequences produce skirt and brim around the
//! model; inward sequences fill a region (support edge, shield band) from its
//! boundary.
//!
//! # Algorithm
//!
//! 1. Offset the reference outline by the first offset to get ring 0
//! 2. Drop offset holes smaller than `hole_area_threshold`
//! 3. Accumulate the ring's perimeter length
//! 4. Repeat with the offset advanced by one step while fewer than
//!    `line_count` rings exist, or while the accumulated length is below
//!    `minimal_length`
//! 5. Stop unconditionally at `max_rings` rings, or when an offset vanishes
//!
//! With an exclusion area set, each ring is cut open where it runs through
//! it. Only the length left outside counts towards `minimal_length`.
//!
//! Each ring is offset from the reference outline itself rather than from
//! the previous ring, so integer offsets never accumulate rounding error.

use crate::clipper::{clip_loops, offset_expolygons, remove_small_holes, OffsetJoinType};
use crate::config::{SkirtBrimConfig, MAX_RING_COUNT};
use crate::geometry::{
    polygons_length, polylines_length, to_polygons, ExPolygon, ExPolygons, Polygons, Polylines,
};
use crate::{Coord, CoordF};
use log::{debug, warn};

/// The rings produced by one sequence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RingSet {
    /// Ring lines, innermost sequence step first.
    pub lines: Polygons,
    /// Pieces of rings cut open by the exclusion area.
    pub open_lines: Polylines,
    /// Offset of the last generated ring from the reference outline.
    /// Equals the first offset when no ring was generated.
    pub last_offset: Coord,
    /// Requested ring count, raised to the number of rings generated when
    /// extra rings were needed for the minimal length.
    pub line_count: usize,
    /// Number of sequence steps actually generated.
    pub rings_generated: usize,
    /// Total length of `lines` and `open_lines`.
    pub total_length: Coord,
    /// Whether the ring cap stopped the sequence.
    pub capped: bool,
}

impl RingSet {
    /// Whether no line was produced.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.open_lines.is_empty()
    }
}

/// Parameters of one ring sequence.
#[derive(Clone, Copy, Debug)]
struct RingPlan {
    first_offset: Coord,
    step: Coord,
    line_count: usize,
    minimal_length: Coord,
    /// Length already laid by earlier sequences that counts towards `minimal_length`.
    baseline_length: Coord,
    /// Keep going until the offset vanishes.
    until_empty: bool,
}

/// Generates ring sequences for one line width.
#[derive(Clone, Debug)]
pub struct RingOffsetGenerator {
    line_width: Coord,
    join_type: OffsetJoinType,
    max_rings: usize,
    hole_area_threshold: CoordF,
    /// Where ring centre lines may not run.
    exclusion: ExPolygons,
}

impl RingOffsetGenerator {
    /// Create a generator for a line width with default settings.
    pub fn new(line_width: Coord) -> Self {
        Self {
            line_width,
            join_type: OffsetJoinType::Round,
            max_rings: MAX_RING_COUNT,
            hole_area_threshold: 0.0,
            exclusion: Vec::new(),
        }
    }

    /// Create a generator for an extruder's first-layer line width.
    pub fn from_config(config: &SkirtBrimConfig, extruder: usize) -> Self {
        let line_width = config.line_width(extruder);
        Self {
            line_width,
            join_type: config.join_type,
            max_rings: config.max_ring_count,
            hole_area_threshold: config.hole_area_threshold(line_width),
            exclusion: Vec::new(),
        }
    }

    /// Set the corner style.
    pub fn with_join_type(mut self, join_type: OffsetJoinType) -> Self {
        self.join_type = join_type;
        self
    }

    /// Set the ring cap.
    pub fn with_max_rings(mut self, max_rings: usize) -> Self {
        self.max_rings = max_rings;
        self
    }

    /// Set the area below which offset holes are dropped.
    pub fn with_hole_area_threshold(mut self, area: CoordF) -> Self {
        self.hole_area_threshold = area;
        self
    }

    /// Cut rings open where they run through `area`. Pieces shorter than a
    /// line width are dropped.
    pub fn with_exclusion(mut self, area: ExPolygons) -> Self {
        self.exclusion = area;
        self
    }

    /// Line width (ring pitch).
    pub fn line_width(&self) -> Coord {
        self.line_width
    }

    /// Corner style used for offsets.
    pub fn join_type(&self) -> OffsetJoinType {
        self.join_type
    }

    /// Generate skirt/brim rings outward from `outline`.
    ///
    /// Ring `k` lies at `start_distance + k * line_width`. Rings are added
    /// until `line_count` exist and their total length reaches
    /// `minimal_length`, or the ring cap is hit.
    pub fn generate_primary_skirt_brim_lines(
        &self,
        start_distance: Coord,
        line_count: usize,
        minimal_length: Coord,
        outline: &[ExPolygon],
    ) -> RingSet {
        self.offset_rings(
            outline,
            RingPlan {
                first_offset: start_distance,
                step: self.line_width,
                line_count,
                minimal_length,
                baseline_length: 0,
                until_empty: false,
            },
        )
    }

    /// Lay rings inward from the boundary of `region`.
    ///
    /// The first ring sits half a line width inside the boundary so the line
    /// is flush with it. `baseline_length` is length laid elsewhere that counts
    /// towards `minimal_length`.
    pub fn generate_inward_lines(
        &self,
        region: &[ExPolygon],
        line_count: usize,
        minimal_length: Coord,
        baseline_length: Coord,
    ) -> RingSet {
        self.offset_rings(
            region,
            RingPlan {
                first_offset: -(self.line_width / 2),
                step: -self.line_width,
                line_count,
                minimal_length,
                baseline_length,
                until_empty: false,
            },
        )
    }

    /// Fill `region` with inward rings until nothing is left.
    pub fn fill_region(&self, region: &[ExPolygon]) -> RingSet {
        self.offset_rings(
            region,
            RingPlan {
                first_offset: -(self.line_width / 2),
                step: -self.line_width,
                line_count: 0,
                minimal_length: 0,
                baseline_length: 0,
                until_empty: true,
            },
        )
    }

    fn offset_rings(&self, outline: &[ExPolygon], plan: RingPlan) -> RingSet {
        let mut result = RingSet {
            last_offset: plan.first_offset,
            line_count: plan.line_count,
            ..Default::default()
        };
        if outline.is_empty() {
            return result;
        }

        let mut offset = plan.first_offset;
        loop {
            let produced = result.rings_generated;
            let wants_more = plan.until_empty
                || produced < plan.line_count
                || plan.baseline_length + result.total_length < plan.minimal_length;
            if !wants_more {
                break;
            }
            if produced >= self.max_rings {
                result.capped = true;
                warn!(
                    "Skirt/brim ring cap of {} reached with {} of {} length laid",
                    self.max_rings,
                    plan.baseline_length + result.total_length,
                    plan.minimal_length
                );
                break;
            }

            let ring = remove_small_holes(
                &offset_expolygons(outline, offset, self.join_type),
                self.hole_area_threshold,
            );
            if ring.is_empty() {
                debug!("Ring offset {} vanished after {} rings", offset, produced);
                break;
            }

            let (lines, mut open) = clip_loops(&to_polygons(&ring), &self.exclusion);
            open.retain(|piece| piece.length() >= self.line_width);
            result.total_length += polygons_length(&lines) + polylines_length(&open);
            result.lines.extend(lines);
            result.open_lines.extend(open);
            result.rings_generated += 1;
            result.last_offset = offset;
            offset += plan.step;
        }

        if result.rings_generated > plan.line_count && !plan.until_empty {
            debug!(
                "Added {} extra rings to reach minimal length {}",
                result.rings_generated - plan.line_count,
                plan.minimal_length
            );
        }
        result.line_count = result.line_count.max(result.rings_generated);
        result
    }
}

/// Generate the primary skirt/brim rings with the adhesion extruder's settings.
///
/// See [`RingOffsetGenerator::generate_primary_skirt_brim_lines`].
pub fn generate_primary_skirt_brim_lines(
    config: &SkirtBrimConfig,
    start_distance: Coord,
    line_count: usize,
    minimal_length: Coord,
    outline: &[ExPolygon],
) -> RingSet {
    RingOffsetGenerator::from_config(config, config.adhesion_extruder)
        .generate_primary_skirt_brim_lines(start_distance, line_count, minimal_length, outline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Polygon};

    fn square(size: Coord) -> Vec<ExPolygon> {
        vec![Polygon::rectangle(Point::new(0, 0), Point::new(size, size)).into()]
    }

    fn miter(line_width: Coord) -> RingOffsetGenerator {
        RingOffsetGenerator::new(line_width).with_join_type(OffsetJoinType::Miter)
    }

    #[test]
    fn test_single_skirt_ring() {
        let rings = miter(400).generate_primary_skirt_brim_lines(3_000, 1, 0, &square(10_000));

        assert_eq!(rings.rings_generated, 1);
        assert_eq!(rings.line_count, 1);
        assert_eq!(rings.lines.len(), 1);
        assert_eq!(rings.last_offset, 3_000);
        assert!((rings.total_length - 64_000).abs() <= 4);
        assert!(!rings.capped);
    }

    #[test]
    fn test_ring_pitch_is_line_width() {
        let rings = miter(400).generate_primary_skirt_brim_lines(1_000, 3, 0, &square(10_000));

        assert_eq!(rings.rings_generated, 3);
        assert_eq!(rings.last_offset, 1_800);
        // 12mm, 12.8mm and 13.6mm squares
        let expected = 4 * (12_000 + 12_800 + 13_600);
        assert!((rings.total_length - expected).abs() <= 12);
    }

    #[test]
    fn test_minimal_length_adds_rings() {
        let rings = miter(400).generate_primary_skirt_brim_lines(0, 2, 500_000, &square(10_000));

        assert!(rings.rings_generated > 2);
        assert_eq!(rings.line_count, rings.rings_generated);
        assert!(rings.total_length >= 500_000);

        // One ring fewer would not have been enough
        let last_ring = rings.lines.last().map(|l| l.length()).unwrap_or(0);
        assert!(rings.total_length - last_ring < 500_000);
    }

    #[test]
    fn test_zero_count_grows_from_minimal_length() {
        let rings = miter(400).generate_primary_skirt_brim_lines(0, 0, 100_000, &square(10_000));
        assert_eq!(rings.rings_generated, 3);
        assert_eq!(rings.line_count, 3);

        let none = miter(400).generate_primary_skirt_brim_lines(0, 0, 0, &square(10_000));
        assert!(none.is_empty());
        assert_eq!(none.line_count, 0);
    }

    #[test]
    fn test_ring_cap_stops_generation() {
        let rings = miter(400)
            .with_max_rings(5)
            .generate_primary_skirt_brim_lines(0, 1, Coord::MAX / 4, &square(1_000));

        assert!(rings.capped);
        assert_eq!(rings.rings_generated, 5);
        assert_eq!(rings.line_count, 5);
        assert!(rings.total_length < Coord::MAX / 4);
    }

    #[test]
    fn test_empty_outline_produces_nothing() {
        let rings = miter(400).generate_primary_skirt_brim_lines(2_500, 4, 1_000_000, &[]);

        assert!(rings.is_empty());
        assert_eq!(rings.rings_generated, 0);
        assert_eq!(rings.line_count, 4);
        assert_eq!(rings.last_offset, 2_500);
        assert_eq!(rings.total_length, 0);
        assert!(!rings.capped);
    }

    #[test]
    fn test_small_holes_are_dropped() {
        // A 2mm hole (4mm²) is well below 100 * (0.4mm)² = 16mm²
        let outer = Polygon::rectangle(Point::new(0, 0), Point::new(20_000, 20_000));
        let hole = Polygon::rectangle(Point::new(9_000, 9_000), Point::new(11_000, 11_000));
        let outline = vec![ExPolygon::with_holes(outer, vec![hole])];

        let keep_all = miter(400).generate_primary_skirt_brim_lines(0, 2, 0, &outline);
        assert_eq!(keep_all.lines.len(), 4);

        let dropping = miter(400)
            .with_hole_area_threshold(400.0 * 400.0 * 100.0)
            .generate_primary_skirt_brim_lines(0, 2, 0, &outline);
        assert_eq!(dropping.lines.len(), 2);
    }

    #[test]
    fn test_fill_region_until_empty() {
        // 2.2mm wide band: lines from both sides, the third step leaves 0.2mm
        let outer = Polygon::rectangle(Point::new(0, 0), Point::new(20_000, 20_000));
        let inner = Polygon::rectangle(Point::new(2_200, 2_200), Point::new(17_800, 17_800));
        let band = vec![ExPolygon::with_holes(outer, vec![inner])];

        let rings = miter(400).fill_region(&band);
        assert_eq!(rings.rings_generated, 3);
        assert_eq!(rings.lines.len(), 6);
        assert_eq!(rings.last_offset, -1_000);
        assert!(!rings.capped);
    }

    fn neighbour() -> ExPolygon {
        Polygon::rectangle(Point::new(10_200, -5_000), Point::new(20_000, 15_000)).into()
    }

    #[test]
    fn test_exclusion_cuts_rings_open() {
        let rings = miter(400)
            .with_exclusion(vec![neighbour()])
            .generate_primary_skirt_brim_lines(0, 2, 0, &square(10_000));

        assert_eq!(rings.rings_generated, 2);
        // Ring 0 stays clear, ring 1 loses its right side
        assert_eq!(rings.lines.len(), 1);
        assert_eq!(rings.open_lines.len(), 1);
        assert!(rings.open_lines[0].iter().all(|p| p.x <= 10_200));
        assert!((rings.total_length - (40_000 + 32_000)).abs() <= 8);
    }

    #[test]
    fn test_excluded_length_does_not_count() {
        let clear = miter(400).generate_primary_skirt_brim_lines(0, 1, 120_000, &square(10_000));
        let cut = miter(400)
            .with_exclusion(vec![neighbour()])
            .generate_primary_skirt_brim_lines(0, 1, 120_000, &square(10_000));

        assert_eq!(clear.rings_generated, 3);
        assert_eq!(cut.rings_generated, 4);
        assert!(cut.total_length >= 120_000);
    }

    #[test]
    fn test_inward_lines_count_baseline_length() {
        let region = square(20_000);
        let without = miter(400).generate_inward_lines(&region, 1, 150_000, 0);
        let with = miter(400).generate_inward_lines(&region, 1, 150_000, 100_000);

        assert_eq!(without.rings_generated, 2);
        assert_eq!(with.rings_generated, 1);
    }
}
