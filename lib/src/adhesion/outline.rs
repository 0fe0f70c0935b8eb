//! First-layer reference outline collection.
//!
//! The reference outline is what skirt/brim rings are offset from. For a
//! skirt it is the convex hull of everything on the plate. For a brim it is
//! the model footprint of the selected extruders, optionally with support
//! folded in.
//!
//! When support is folded into a brim outline and the model brim is meant to
//! replace support, the support under the model brim is trimmed away. That
//! adjusted support is returned next to the outline so the caller decides
//! whether to commit it.

use crate::clipper::{closing, convex_hull, difference, grow, union_ex, OffsetJoinType};
use crate::config::SkirtBrimConfig;
use crate::geometry::{
    simplify_polygon, ExPolygon, ExPolygons, Polygon, LARGEST_ERROR_OF_REMOVED_POINT,
    SMALLEST_LINE_LENGTH,
};
use crate::store::{Extruders, FirstLayerStore, SupportLayer};
use crate::Coord;
use log::{debug, warn};

/// Parts closer than twice this distance are merged into one outline.
const JOIN_DISTANCE: Coord = 20;

/// What to gather into a reference outline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutlineRequest {
    /// Extruders whose model parts are included.
    pub extruders: Extruders,
    /// Fold first-layer support into the outline.
    pub include_support: bool,
    /// Fold the prime tower into the outline.
    pub include_prime_tower: bool,
    /// Fill holes that contain no other part.
    pub outside_only: bool,
    /// Replace the outline by its convex hull.
    pub convex_hull: bool,
    /// Rings the model brim will get, used to clear support beneath it.
    pub brim_line_count: usize,
    /// Line width of those rings.
    pub brim_line_width: Coord,
    /// Trim support beneath the model brim.
    pub brim_replaces_support: bool,
}

impl OutlineRequest {
    /// Skirt outline: everything on the plate, convex hull.
    pub fn skirt() -> Self {
        Self {
            extruders: Extruders::All,
            include_support: true,
            include_prime_tower: true,
            outside_only: true,
            convex_hull: true,
            brim_line_count: 0,
            brim_line_width: 0,
            brim_replaces_support: false,
        }
    }

    /// Brim outline for some extruders, model parts only.
    pub fn brim(extruders: Extruders) -> Self {
        Self {
            extruders,
            include_support: false,
            include_prime_tower: false,
            outside_only: false,
            convex_hull: false,
            brim_line_count: 0,
            brim_line_width: 0,
            brim_replaces_support: false,
        }
    }

    /// The request the configuration implies for an extruder selection.
    ///
    /// Support and the prime tower are only folded into the outline of the
    /// adhesion extruder or of all extruders combined.
    pub fn from_config(config: &SkirtBrimConfig, extruders: Extruders) -> Self {
        if config.is_skirt() {
            return Self::skirt();
        }
        let primary = match extruders {
            Extruders::All => true,
            Extruders::Single(nr) => nr == config.adhesion_extruder,
        };
        Self {
            include_support: primary,
            include_prime_tower: primary,
            outside_only: config.brim_outside_only,
            brim_line_count: config.line_count,
            brim_line_width: config.line_width(config.adhesion_extruder),
            brim_replaces_support: config.brim_replaces_support,
            ..Self::brim(extruders)
        }
    }

    /// Width of the band around the model that support must leave free.
    /// An odd ring count is rounded up to keep lines paired.
    fn support_clearance(&self) -> Coord {
        let count = self.brim_line_count + self.brim_line_count % 2;
        self.brim_line_width * count as Coord
    }
}

/// A reference outline and the support it was built with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutlineCollection {
    /// The reference outline. Empty when there is nothing on the first layer.
    pub outline: ExPolygons,
    /// First-layer support, trimmed under the model brim when that applies.
    /// `None` when the store has no support.
    pub support: Option<SupportLayer>,
    /// Whether `support` differs from the store's support.
    pub support_adjusted: bool,
    /// Holes of the model that contain no other part.
    pub empty_holes: ExPolygons,
}

/// Assemble the reference outline described by `request` without touching the store.
pub fn collect_first_layer_outline(
    store: &FirstLayerStore,
    request: &OutlineRequest,
) -> OutlineCollection {
    let mut collection = OutlineCollection {
        support: store.support.clone().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    let model = union_ex(&store.part_outlines(request.extruders));

    let mut areas = if request.convex_hull {
        model
    } else if request.outside_only {
        let (filled, empty_holes) = fill_empty_holes(&model);
        collection.empty_holes = empty_holes;
        filled
    } else {
        model
    };

    if request.include_support {
        if let Some(support) = collection.support.as_mut() {
            if !request.convex_hull
                && request.brim_replaces_support
                && request.brim_line_count > 0
                && !areas.is_empty()
            {
                let mut claimed = grow(&areas, request.support_clearance(), OffsetJoinType::Round);
                claimed.extend(collection.empty_holes.iter().cloned());
                support.infill_parts = difference(&support.infill_parts, &claimed);
                support.roof = difference(&support.roof, &claimed);
                collection.support_adjusted = true;
                debug!(
                    "Cleared support within {} of the model brim",
                    request.support_clearance()
                );
            }
            areas.extend(support.all_areas());
        }
    }

    if request.include_prime_tower {
        if let Some(tower) = &store.prime_tower {
            areas.push(tower.clone());
        }
    }

    let merged = if request.convex_hull {
        convex_hull(&areas)
    } else {
        closing(&union_ex(&areas), JOIN_DISTANCE, OffsetJoinType::Miter)
    };
    collection.outline = simplify_outline(&merged);

    if collection.outline.is_empty() {
        warn!(
            "Couldn't generate skirt/brim: no polygons on first layer for {:?}",
            request.extruders
        );
    }
    collection
}

/// Reference outline for an extruder selection, using the configuration's rules.
///
/// Support in the store is replaced by its adjusted version when the model
/// brim claims part of it.
pub fn get_first_layer_outline(
    store: &mut FirstLayerStore,
    config: &SkirtBrimConfig,
    extruders: Extruders,
) -> ExPolygons {
    let request = OutlineRequest::from_config(config, extruders);
    let collection = collect_first_layer_outline(store, &request);
    if collection.support_adjusted {
        store.support = collection.support;
    }
    collection.outline
}

/// Fill holes that contain no other part. Returns the filled outline and the
/// filled holes as areas.
fn fill_empty_holes(outline: &[ExPolygon]) -> (ExPolygons, ExPolygons) {
    let mut filled = Vec::with_capacity(outline.len());
    let mut empty_holes = Vec::new();

    for (i, expoly) in outline.iter().enumerate() {
        let mut kept = Vec::new();
        for hole in &expoly.holes {
            let occupied = outline.iter().enumerate().any(|(j, other)| {
                j != i
                    && other
                        .contour
                        .first()
                        .is_some_and(|p| hole.contains_point(p))
            });
            if occupied {
                kept.push(hole.clone());
            } else {
                empty_holes.push(ExPolygon::new(hole.clone()));
            }
        }
        filled.push(ExPolygon::with_holes(expoly.contour.clone(), kept));
    }
    (filled, empty_holes)
}

fn simplify_outline(outline: &[ExPolygon]) -> ExPolygons {
    let simplify =
        |p: &Polygon| simplify_polygon(p, SMALLEST_LINE_LENGTH, LARGEST_ERROR_OF_REMOVED_POINT);

    outline
        .iter()
        .map(|expoly| {
            ExPolygon::with_holes(
                simplify(&expoly.contour),
                expoly
                    .holes
                    .iter()
                    .map(simplify)
                    .filter(Polygon::is_valid)
                    .collect(),
            )
        })
        .filter(|expoly| !expoly.is_empty() && expoly.area() > 0.0)
        .collect()
}
