//! First-layer adhesion: skirt, brim, support brim and shield brim.
//!
//! - [`outline`]: which outline the rings are offset from
//! - [`rings`]: concentric ring sequences with minimal-length growth
//! - [`coverage`]: area already lined, so later sources skip it
//! - [`skirt_brim`]: the stages of a run and where their lines go

pub mod coverage;
pub mod outline;
pub mod rings;
pub mod skirt_brim;

pub use coverage::{accumulate, line_coverage, polyline_coverage, subtract_covered, CoveredArea};
pub use outline::{
    collect_first_layer_outline, get_first_layer_outline, OutlineCollection, OutlineRequest,
};
pub use rings::{generate_primary_skirt_brim_lines, RingOffsetGenerator, RingSet};
pub use skirt_brim::{
    generate, generate_shield_brim, generate_support_brim, AdhesionMode, ShieldBrimResult,
    SupportBrimResult,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipper::{difference, intersection, total_area, OffsetJoinType};
    use crate::config::{ExtruderSettings, SkirtBrimConfig};
    use crate::geometry::{polygons_length, ExPolygon, Point, Polygon};
    use crate::store::{Extruders, FirstLayerStore, ShieldKind, SupportLayer};
    use crate::Coord;

    fn rect(x0: Coord, y0: Coord, x1: Coord, y1: Coord) -> ExPolygon {
        Polygon::rectangle(Point::new(x0, y0), Point::new(x1, y1)).into()
    }

    fn config(distance: Coord, line_count: usize, minimal_length: Coord) -> SkirtBrimConfig {
        SkirtBrimConfig::default()
            .distance(distance)
            .line_count(line_count)
            .join_type(OffsetJoinType::Miter)
            .extruders(vec![ExtruderSettings::new(400).minimal_length(minimal_length)])
    }

    #[test]
    fn test_skirt_single_ring_around_square() {
        let mut store = FirstLayerStore::new(1).with_part(0, rect(0, 0, 10_000, 10_000));
        let config = config(3_000, 1, 0);
        assert_eq!(AdhesionMode::from_config(&config), AdhesionMode::Skirt);

        generate(&mut store, &config);

        let lines = store.skirt_brim_lines(0);
        assert_eq!(lines.len(), 1);
        let bb = lines[0].bounding_box();
        assert_eq!(bb.min, Point::new(-3_000, -3_000));
        assert_eq!(bb.max, Point::new(13_000, 13_000));
        assert!((polygons_length(lines) - 64_000).abs() <= 4);
    }

    #[test]
    fn test_brim_tops_up_to_minimal_length() {
        let outline = vec![rect(0, 0, 10_000, 10_000)];
        let config = config(0, 2, 500_000);

        let rings = generate_primary_skirt_brim_lines(&config, 0, 2, 500_000, &outline);

        // Ring k is 40mm + 3.2mm * k long: nine rings give 475.2mm, ten 544mm
        assert_eq!(rings.rings_generated, 10);
        assert_eq!(rings.line_count, 10);
        assert!(rings.total_length >= 500_000);
        assert_eq!(rings.last_offset, 3_600);
        assert!(!rings.capped);

        let mut store = FirstLayerStore::new(1).with_part(0, outline[0].clone());
        generate(&mut store, &config);
        assert_eq!(store.skirt_brim_lines(0).len(), 10);
        assert!(store.skirt_brim_length() >= 500_000);
    }

    #[test]
    fn test_support_brim_merges_without_double_lines() {
        let model = rect(0, 0, 10_000, 10_000);
        let generator = RingOffsetGenerator::new(400).with_join_type(OffsetJoinType::Miter);
        let model_brim = generator
            .generate_primary_skirt_brim_lines(0, 4, 0, &[model.clone()])
            .lines;

        // Support reaches into the model brim on one side
        let support = SupportLayer {
            infill_parts: vec![rect(10_500, -3_000, 25_000, 13_000)],
            ..Default::default()
        };
        let mut store = FirstLayerStore::new(1)
            .with_part(0, model)
            .with_support(support);
        *store.skirt_brim_mut(0) = model_brim.clone();

        let config = config(0, 4, 0).support_brim(true, 3);
        let result = generate_support_brim(&mut store, &config, true);

        assert!(result.merged);
        assert_eq!(result.rings_generated, 3);
        assert!(store.support_brim.is_empty());

        // One combined set, support lines first
        let merged = store.skirt_brim_lines(0);
        assert_eq!(merged.len(), result.lines.len() + model_brim.len());
        assert_eq!(&merged[..result.lines.len()], result.lines.as_slice());

        let model_area = line_coverage(&model_brim, 400);
        let support_area = line_coverage(&result.lines, 400);
        let overlap = total_area(&intersection(&model_area, &support_area));
        assert!(overlap < 0.01 * total_area(&support_area));

        // The merged set covers the union of both and nothing twice
        let merged_area = total_area(&line_coverage(merged, 400));
        let separate = total_area(&model_area) + total_area(&support_area);
        assert!((merged_area - separate).abs() < 0.01 * separate);
    }

    #[test]
    fn test_rings_grow_strictly_outward() {
        let outline = vec![ExPolygon::with_holes(
            Polygon::rectangle(Point::new(0, 0), Point::new(30_000, 20_000)),
            vec![Polygon::rectangle(Point::new(5_000, 5_000), Point::new(25_000, 15_000))],
        )];
        let rings = RingOffsetGenerator::new(400)
            .with_join_type(OffsetJoinType::Miter)
            .generate_primary_skirt_brim_lines(1_000, 5, 0, &outline);

        // Contour then hole per ring
        assert_eq!(rings.lines.len(), 10);
        let contours: Vec<&Polygon> = rings.lines.iter().step_by(2).collect();
        for pair in contours.windows(2) {
            assert!(pair[0].iter().all(|p| pair[1].contains_point(p)));
            assert!(pair[1].area() > pair[0].area());
        }
        let holes: Vec<&Polygon> = rings.lines.iter().skip(1).step_by(2).collect();
        for pair in holes.windows(2) {
            assert!(pair[1].iter().all(|p| pair[0].contains_point(p)));
        }
    }

    #[test]
    fn test_minimal_length_reached_or_capped() {
        let outline = vec![rect(0, 0, 1_000, 1_000)];

        let reached = RingOffsetGenerator::new(400).generate_primary_skirt_brim_lines(0, 1, 50_000, &outline);
        assert!(reached.total_length >= 50_000);
        assert!(reached.line_count > 1);
        assert!(!reached.capped);

        let capped = RingOffsetGenerator::new(400)
            .with_max_rings(3)
            .generate_primary_skirt_brim_lines(0, 1, 50_000, &outline);
        assert!(capped.capped);
        assert_eq!(capped.line_count, 3);
        assert!(capped.total_length < 50_000);
    }

    #[test]
    fn test_empty_first_layer_produces_nothing() {
        let mut store = FirstLayerStore::new(2);
        let config = config(0, 3, 250_000).support_brim(true, 5).shields(true, true);

        generate(&mut store, &config);

        assert_eq!(store.skirt_brim_length(), 0);
        assert!(store.support_brim.is_empty());
        assert!(store.shield_brim.is_empty());

        assert!(get_first_layer_outline(&mut store, &config, Extruders::All).is_empty());
        let rings = generate_primary_skirt_brim_lines(&config, 500, 3, 250_000, &[]);
        assert_eq!(rings.line_count, 3);
        assert_eq!(rings.last_offset, 500);
        assert!(rings.is_empty());
    }

    #[test]
    fn test_fully_covered_shield_gets_no_brim() {
        let mut store = FirstLayerStore::new(1)
            .with_part(0, rect(0, 0, 10_000, 10_000))
            .with_shield(ShieldKind::Draft, vec![rect(-5_000, -5_000, 15_000, 15_000)]);
        let config = config(0, 2, 0).shields(true, true);

        let covered = CoveredArea::new().with_area(&[rect(-50_000, -50_000, 50_000, 50_000)]);
        let before = covered.total_area();
        let result = generate_shield_brim(&mut store, &config, covered);

        assert!(result.lines.is_empty());
        assert!(store.shield_brim_lines(ShieldKind::Draft).is_empty());
        assert!(result.covered.total_area() >= before);
    }

    #[test]
    fn test_shield_passes_thread_coverage() {
        let mut store = FirstLayerStore::new(1)
            .with_part(0, rect(0, 0, 10_000, 10_000))
            .with_shield(ShieldKind::Ooze, vec![rect(-10_000, -10_000, 20_000, 20_000)])
            .with_shield(ShieldKind::Draft, vec![rect(-10_000, -10_000, 20_000, 20_000)]);
        let config = config(0, 2, 0).shields(true, true);

        let result = generate_shield_brim(&mut store, &config, CoveredArea::new());
        assert_eq!(result.lines.len(), 2);

        // Every shield's lines end up in the returned coverage
        for shield in &result.lines {
            let swept = line_coverage(&shield.lines, 400);
            assert!(total_area(&difference(&swept, result.covered.area())) < 1.0);
        }

        // A further pass with that coverage does not line the same area again
        let again = generate_shield_brim(&mut store, &config, result.covered.clone());
        for shield in &again.lines {
            let swept = line_coverage(&shield.lines, 400);
            let overlap = total_area(&intersection(&swept, result.covered.area()));
            assert!(overlap < 0.01 * result.covered.total_area());
        }
        assert!(again.covered.total_area() >= result.covered.total_area());
    }

    #[test]
    fn test_accumulate_and_subtract() {
        let ring = Polygon::rectangle(Point::new(0, 0), Point::new(10_000, 10_000));
        let covered = accumulate(&[], &[ring.clone()], 400);
        assert!(total_area(&covered) > 0.0);

        let grown = accumulate(&covered, &[ring], 400);
        assert!((total_area(&grown) - total_area(&covered)).abs() < 1.0);

        let rest = subtract_covered(&[rect(-1_000, -1_000, 11_000, 11_000)], &covered);
        assert_eq!(rest.len(), 2);
    }
}
