//! Skirt/brim orchestration.
//!
//! A run goes through these stages, each one writing its lines into the store:
//!
//! 1. Primary rings of the adhesion extruder around the reference outline
//! 2. Rings of every other used extruder, outside the primary rings
//! 3. Support brim along the edge of first-layer support
//! 4. Brim along ooze and draft shields
//!
//! The area swept by committed lines is threaded through the stages in a
//! [`CoveredArea`] so later stages do not line the same area again. In a
//! per-extruder brim each extruder's rings are also cut open where they would
//! run over another extruder's parts or over lines already laid.

use super::coverage::CoveredArea;
use super::outline::{collect_first_layer_outline, OutlineRequest};
use super::rings::{RingOffsetGenerator, RingSet};
use crate::clipper::{difference, grow, shrink, union_ex, OffsetJoinType};
use crate::config::SkirtBrimConfig;
use crate::geometry::{polygons_length, ExPolygon, ExPolygons, Polygons};
use crate::store::{Extruders, FirstLayerStore, ShieldBrimLines, ShieldKind};
use crate::{unscale, Coord};
use log::{debug, info};
use std::fmt;

/// Kind of first-layer adhesion a configuration asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdhesionMode {
    /// Rings at a stand-off distance around everything on the plate.
    Skirt,
    /// Rings hugging each extruder's own outline.
    Brim,
}

impl AdhesionMode {
    /// A positive distance with exactly one line is a skirt, anything else a brim.
    pub fn from_config(config: &SkirtBrimConfig) -> Self {
        if config.is_skirt() {
            AdhesionMode::Skirt
        } else {
            AdhesionMode::Brim
        }
    }
}

impl fmt::Display for AdhesionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdhesionMode::Skirt => write!(f, "skirt"),
            AdhesionMode::Brim => write!(f, "brim"),
        }
    }
}

/// Outcome of support brim generation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SupportBrimResult {
    /// Support brim lines, also written to the store.
    pub lines: Polygons,
    /// Inward steps generated.
    pub rings_generated: usize,
    /// Whether the lines went into the support extruder's skirt/brim set.
    pub merged: bool,
}

/// Outcome of shield brim generation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShieldBrimResult {
    /// Lines per shield that received brim, also written to the store.
    pub lines: Vec<ShieldBrimLines>,
    /// Covered area including the new shield brim.
    pub covered: CoveredArea,
}

/// Generate all skirt/brim lines of the first layer into `store`.
///
/// Previously generated line sets in the store are replaced. Stages without
/// geometry produce no lines and the run carries on.
pub fn generate(store: &mut FirstLayerStore, config: &SkirtBrimConfig) {
    store.clear_generated();

    let mode = AdhesionMode::from_config(config);
    let primary = config.adhesion_extruder;
    info!(
        "Generating {} for extruder {}: {} lines at {:.2}mm",
        mode,
        primary,
        config.line_count,
        unscale(config.distance)
    );

    let extruders = if mode == AdhesionMode::Brim && config.per_extruder_skirt_brim {
        Extruders::Single(primary)
    } else {
        Extruders::All
    };
    let collection = collect_first_layer_outline(store, &OutlineRequest::from_config(config, extruders));
    if collection.support_adjusted {
        store.support = collection.support;
    }
    let reference = collection.outline;

    let mut generator = RingOffsetGenerator::from_config(config, primary);
    if extruders != Extruders::All {
        let exclusion = brim_exclusion(store, primary, generator.line_width(), &CoveredArea::new());
        generator = generator.with_exclusion(exclusion);
    }
    let rings = generator.generate_primary_skirt_brim_lines(
        config.distance,
        config.line_count,
        config.extruder(primary).minimal_length,
        &reference,
    );
    if rings.line_count != config.line_count {
        info!(
            "Raised {} line count from {} to {} for minimal length",
            mode, config.line_count, rings.line_count
        );
    }
    debug!(
        "Extruder {}: {} rings, {:.1}mm",
        primary,
        rings.rings_generated,
        unscale(rings.total_length)
    );

    let mut covered = commit_rings(store, primary, &rings, generator.line_width(), CoveredArea::new());

    if config.per_extruder_skirt_brim {
        covered = generate_secondary_skirt_brim(store, config, mode, &reference, &rings, covered);
    }

    if config.allow_helpers && config.support_brim_enable {
        let support = generate_support_brim(store, config, mode == AdhesionMode::Brim);
        covered = covered.with_lines(&support.lines, config.line_width(config.support_extruder));
    }

    if config.allow_helpers && mode == AdhesionMode::Brim {
        covered = generate_shield_brim(store, config, covered).covered;
    }

    debug!(
        "Skirt/brim done: {:.1}mm of lines over {:.2}mm²",
        unscale(store.skirt_brim_length()),
        covered.total_area() / 1e6
    );
}

/// Where `extruder`'s brim may not run: over other extruders' parts or over
/// area already covered. Grown by half a line width so printed lines only
/// touch them.
fn brim_exclusion(
    store: &FirstLayerStore,
    extruder: usize,
    line_width: Coord,
    covered: &CoveredArea,
) -> ExPolygons {
    let mut blocked: ExPolygons = store
        .parts
        .iter()
        .filter(|part| part.extruder != extruder)
        .map(|part| part.outline.clone())
        .collect();
    blocked.extend_from_slice(covered.area());
    if blocked.is_empty() {
        return blocked;
    }
    // One unit short, so a line exactly one width away is kept
    grow(&union_ex(&blocked), (line_width / 2 - 1).max(0), OffsetJoinType::Round)
}

/// Store a ring sequence as `extruder`'s skirt/brim and add it to `covered`.
fn commit_rings(
    store: &mut FirstLayerStore,
    extruder: usize,
    rings: &RingSet,
    line_width: Coord,
    covered: CoveredArea,
) -> CoveredArea {
    store.skirt_brim_mut(extruder).extend(rings.lines.iter().cloned());
    store
        .skirt_brim_open_mut(extruder)
        .extend(rings.open_lines.iter().cloned());
    covered
        .with_lines(&rings.lines, line_width)
        .with_polylines(&rings.open_lines, line_width)
}

/// Area swept by every skirt/brim line in the store.
fn store_coverage(store: &FirstLayerStore, config: &SkirtBrimConfig) -> CoveredArea {
    let extruders = store.skirt_brim.len().max(store.skirt_brim_open.len());
    (0..extruders).fold(CoveredArea::new(), |covered, nr| {
        let width = config.line_width(nr);
        covered
            .with_lines(store.skirt_brim_lines(nr), width)
            .with_polylines(store.skirt_brim_open_lines(nr), width)
    })
}

/// Rings of the extruders other than the adhesion extruder.
///
/// Each sequence starts one line width (half of each neighbour) beyond the
/// last ring laid so far. A skirt offsets from the shared outline. A brim
/// offsets from the extruder's own parts and is cut open over other parts and
/// over the covered area.
fn generate_secondary_skirt_brim(
    store: &mut FirstLayerStore,
    config: &SkirtBrimConfig,
    mode: AdhesionMode,
    shared_outline: &[ExPolygon],
    primary: &RingSet,
    mut covered: CoveredArea,
) -> CoveredArea {
    let used = store.extruders_used();
    let mut offset = primary.last_offset;
    let mut last_width = config.line_width(config.adhesion_extruder);
    let mut has_rings = !primary.is_empty();

    for extruder in 0..store.extruder_count {
        if extruder == config.adhesion_extruder || !used.get(extruder).copied().unwrap_or(false) {
            continue;
        }

        let settings = config.extruder(extruder);
        let mut generator = RingOffsetGenerator::from_config(config, extruder);
        let width = generator.line_width();
        if mode == AdhesionMode::Brim {
            generator = generator.with_exclusion(brim_exclusion(store, extruder, width, &covered));
        }

        let own_outline;
        let reference = match mode {
            AdhesionMode::Skirt => shared_outline,
            AdhesionMode::Brim => {
                let request = OutlineRequest::from_config(config, Extruders::Single(extruder));
                own_outline = collect_first_layer_outline(store, &request).outline;
                own_outline.as_slice()
            }
        };

        let start = if has_rings {
            offset + last_width / 2 + width / 2
        } else {
            offset
        };
        let rings = generator.generate_primary_skirt_brim_lines(
            start,
            settings.line_count,
            settings.minimal_length,
            reference,
        );
        if rings.is_empty() {
            debug!("Extruder {}: no {} lines", extruder, mode);
            continue;
        }

        debug!(
            "Extruder {}: {} rings from {:.2}mm, {:.1}mm",
            extruder,
            rings.rings_generated,
            unscale(start),
            unscale(rings.total_length)
        );
        covered = commit_rings(store, extruder, &rings, width, covered);
        offset = rings.last_offset;
        last_width = width;
        has_rings = true;
    }
    covered
}

/// Lay brim along the edge of first-layer support.
///
/// Area already lined by skirt/brim in the store is left out. The band taken
/// by the support brim is removed from the support infill. With
/// `merge_with_model` the lines are put in front of the support extruder's
/// skirt/brim lines, otherwise they are kept as a separate support brim set.
/// Only the support extruder's own skirt/brim counts towards its minimal
/// length.
pub fn generate_support_brim(
    store: &mut FirstLayerStore,
    config: &SkirtBrimConfig,
    merge_with_model: bool,
) -> SupportBrimResult {
    let mut result = SupportBrimResult {
        merged: merge_with_model,
        ..Default::default()
    };
    let Some(mut support) = store.support.clone().filter(|s| !s.infill_parts.is_empty()) else {
        debug!("No first-layer support infill to put brim around");
        return result;
    };
    if config.support_brim_line_count == 0 {
        return result;
    }

    let extruder = config.support_extruder;
    let generator = RingOffsetGenerator::from_config(config, extruder);
    let width = generator.line_width();

    let covered = store_coverage(store, config);
    let region = covered.subtract_from(&union_ex(&support.infill_parts));
    if region.is_empty() {
        debug!("Support is entirely covered by skirt/brim");
        return result;
    }

    let rings = generator.generate_inward_lines(
        &region,
        config.support_brim_line_count,
        config.extruder(extruder).minimal_length,
        store.extruder_skirt_brim_length(extruder),
    );
    if rings.is_empty() {
        debug!("Support too narrow for support brim");
        return result;
    }

    let brim_width = width * rings.rings_generated as Coord;
    let brim_area = difference(&region, &shrink(&region, brim_width, generator.join_type()));
    support.infill_parts = difference(&support.infill_parts, &brim_area);
    store.support = Some(support);

    if merge_with_model {
        let lines = store.skirt_brim_mut(extruder);
        let model_lines = std::mem::replace(lines, rings.lines.clone());
        lines.extend(model_lines);
    } else {
        store.support_brim = rings.lines.clone();
    }

    info!(
        "Support brim: {} lines, {:.1}mm{}",
        rings.lines.len(),
        unscale(polygons_length(&rings.lines)),
        if merge_with_model { ", merged with model brim" } else { "" }
    );
    result.lines = rings.lines;
    result.rings_generated = rings.rings_generated;
    result
}

/// Lay brim along the enabled ooze and draft shields.
///
/// An ooze shield gets brim on its inner side, a draft shield on its outer
/// side, each as wide as the model brim plus one line. `covered` and the model
/// footprint are subtracted first. The shield's lines are added to the covered
/// area before the next shield, and the grown coverage is returned.
pub fn generate_shield_brim(
    store: &mut FirstLayerStore,
    config: &SkirtBrimConfig,
    covered: CoveredArea,
) -> ShieldBrimResult {
    let mut result = ShieldBrimResult {
        covered,
        ..Default::default()
    };

    let generator = RingOffsetGenerator::from_config(config, config.adhesion_extruder);
    let width = generator.line_width();
    let count = config.line_count + config.line_count % 2;
    let band_width = width * count as Coord + width;
    let model = union_ex(&store.part_outlines(Extruders::All));

    for (kind, settings) in [
        (ShieldKind::Ooze, config.ooze_shield),
        (ShieldKind::Draft, config.draft_shield),
    ] {
        if !settings.enabled {
            continue;
        }
        let Some(shield) = store.shield(kind) else {
            debug!("No {} on the first layer", kind);
            continue;
        };

        let outline = union_ex(&shield.outline);
        let band = match kind {
            ShieldKind::Ooze => difference(&outline, &shrink(&outline, band_width, generator.join_type())),
            ShieldKind::Draft => difference(&grow(&outline, band_width, generator.join_type()), &outline),
        };
        let candidate = difference(&result.covered.subtract_from(&band), &model);

        store.shield_brim.retain(|s| s.kind != kind);
        let rings = generator.fill_region(&candidate);
        if rings.is_empty() {
            debug!("{} brim area is already covered", kind);
            continue;
        }

        info!(
            "{} brim: {} lines, {:.1}mm",
            kind,
            rings.lines.len(),
            unscale(rings.total_length)
        );
        result.covered = std::mem::take(&mut result.covered).with_lines(&rings.lines, width);
        let lines = ShieldBrimLines {
            kind,
            lines: rings.lines,
        };
        store.shield_brim.push(lines.clone());
        result.lines.push(lines);
    }
    result
}
