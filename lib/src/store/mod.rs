//! First-layer data store.
//!
//! This is the slice of the print that skirt/brim generation reads from and
//! writes into: model parts per extruder, first-layer support, the prime tower
//! and shields on the input side; skirt/brim, support brim and shield brim
//! line sets on the output side.
//!
//! Line sets are stored as closed [`Polygon`] loops, one per printed ring.
//! Brim rings cut open where they would cross another extruder's parts are
//! kept apart as [`Polyline`]s.

use crate::geometry::{
    polygons_length, polylines_length, ExPolygon, ExPolygons, Polygon, Polygons, Polyline,
    Polylines,
};
use crate::{Coord, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which extruders an outline query covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Extruders {
    /// Every extruder combined.
    All,
    /// One extruder.
    Single(usize),
}

impl Extruders {
    /// Whether an extruder is selected.
    #[inline]
    pub fn includes(&self, extruder: usize) -> bool {
        match self {
            Extruders::All => true,
            Extruders::Single(nr) => *nr == extruder,
        }
    }
}

/// A sliced model part on the first layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerPart {
    /// Extruder printing this part.
    pub extruder: usize,
    /// Outline of the part.
    pub outline: ExPolygon,
}

impl LayerPart {
    pub fn new(extruder: usize, outline: ExPolygon) -> Self {
        Self { extruder, outline }
    }
}

/// First-layer support geometry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportLayer {
    /// Outlines of the support infill parts.
    pub infill_parts: ExPolygons,
    /// Support roof (interface) areas.
    pub roof: ExPolygons,
    /// Support bottom (interface) areas.
    pub bottom: ExPolygons,
}

impl SupportLayer {
    /// Whether there is any support geometry at all.
    pub fn is_empty(&self) -> bool {
        self.infill_parts.is_empty() && self.roof.is_empty() && self.bottom.is_empty()
    }

    /// Every support area, unmerged.
    pub fn all_areas(&self) -> ExPolygons {
        let mut areas = self.infill_parts.clone();
        areas.extend(self.bottom.iter().cloned());
        areas.extend(self.roof.iter().cloned());
        areas
    }
}

/// Kind of auxiliary shield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShieldKind {
    /// Wall around the model that catches oozing from idle nozzles.
    Ooze,
    /// Tall wall around the model that keeps drafts off the print.
    Draft,
}

impl fmt::Display for ShieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShieldKind::Ooze => write!(f, "ooze shield"),
            ShieldKind::Draft => write!(f, "draft shield"),
        }
    }
}

/// A shield present on the first layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shield {
    pub kind: ShieldKind,
    /// Region enclosed by the shield. The shield wall runs along its boundary.
    pub outline: ExPolygons,
}

/// Brim lines generated for one shield.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShieldBrimLines {
    pub kind: ShieldKind,
    pub lines: Polygons,
}

/// The first-layer store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirstLayerStore {
    /// Number of extruders in the machine.
    pub extruder_count: usize,
    /// Sliced model parts.
    pub parts: Vec<LayerPart>,
    /// First-layer support, if generated.
    pub support: Option<SupportLayer>,
    /// Prime tower outline, if enabled.
    pub prime_tower: Option<ExPolygon>,
    /// Shields present on the first layer.
    pub shields: Vec<Shield>,

    // === Generated ===
    /// Skirt/brim lines, indexed by extruder.
    pub skirt_brim: Vec<Polygons>,
    /// Open skirt/brim pieces, indexed by extruder.
    pub skirt_brim_open: Vec<Polylines>,
    /// Support brim lines when they are kept apart from the model skirt/brim.
    pub support_brim: Polygons,
    /// Shield brim lines, one entry per shield that got brim.
    pub shield_brim: Vec<ShieldBrimLines>,
}

impl FirstLayerStore {
    /// Create an empty store for a machine with `extruder_count` extruders.
    pub fn new(extruder_count: usize) -> Self {
        Self {
            extruder_count,
            ..Default::default()
        }
    }

    /// Builder method: add a model part.
    pub fn with_part(mut self, extruder: usize, outline: ExPolygon) -> Self {
        self.add_part(extruder, outline);
        self
    }

    /// Builder method: set the first-layer support.
    pub fn with_support(mut self, support: SupportLayer) -> Self {
        self.support = Some(support);
        self
    }

    /// Builder method: add a shield.
    pub fn with_shield(mut self, kind: ShieldKind, outline: ExPolygons) -> Self {
        self.shields.push(Shield { kind, outline });
        self
    }

    /// Builder method: set the prime tower outline.
    pub fn with_prime_tower(mut self, outline: ExPolygon) -> Self {
        self.prime_tower = Some(outline);
        self
    }

    /// Add a model part, growing the extruder count if needed.
    pub fn add_part(&mut self, extruder: usize, outline: ExPolygon) {
        self.extruder_count = self.extruder_count.max(extruder + 1);
        self.parts.push(LayerPart::new(extruder, outline));
    }

    /// Outlines of the parts printed by the selected extruders.
    pub fn part_outlines(&self, extruders: Extruders) -> ExPolygons {
        self.parts
            .iter()
            .filter(|part| extruders.includes(part.extruder))
            .map(|part| part.outline.clone())
            .collect()
    }

    /// Which extruders print model parts on the first layer.
    pub fn extruders_used(&self) -> Vec<bool> {
        let mut used = vec![false; self.extruder_count];
        for part in &self.parts {
            if let Some(slot) = used.get_mut(part.extruder) {
                *slot = true;
            }
        }
        used
    }

    /// Whether there is first-layer support geometry.
    pub fn has_support(&self) -> bool {
        self.support.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// Shield of a given kind, if present with geometry.
    pub fn shield(&self, kind: ShieldKind) -> Option<&Shield> {
        self.shields
            .iter()
            .find(|s| s.kind == kind && !s.outline.is_empty())
    }

    /// Skirt/brim lines of an extruder.
    pub fn skirt_brim_lines(&self, extruder: usize) -> &[Polygon] {
        self.skirt_brim
            .get(extruder)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Mutable skirt/brim line set of an extruder, created on demand.
    pub fn skirt_brim_mut(&mut self, extruder: usize) -> &mut Polygons {
        if self.skirt_brim.len() <= extruder {
            self.skirt_brim.resize_with(extruder + 1, Vec::new);
        }
        &mut self.skirt_brim[extruder]
    }

    /// Open skirt/brim pieces of an extruder.
    pub fn skirt_brim_open_lines(&self, extruder: usize) -> &[Polyline] {
        self.skirt_brim_open
            .get(extruder)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn skirt_brim_open_mut(&mut self, extruder: usize) -> &mut Polylines {
        if self.skirt_brim_open.len() <= extruder {
            self.skirt_brim_open.resize_with(extruder + 1, Vec::new);
        }
        &mut self.skirt_brim_open[extruder]
    }

    /// Length of one extruder's skirt/brim, open pieces included.
    pub fn extruder_skirt_brim_length(&self, extruder: usize) -> Coord {
        polygons_length(self.skirt_brim_lines(extruder))
            + polylines_length(self.skirt_brim_open_lines(extruder))
    }

    /// Brim lines generated for a shield.
    pub fn shield_brim_lines(&self, kind: ShieldKind) -> &[Polygon] {
        self.shield_brim
            .iter()
            .find(|s| s.kind == kind)
            .map(|s| s.lines.as_slice())
            .unwrap_or(&[])
    }

    /// Total length of all skirt/brim lines over all extruders.
    pub fn skirt_brim_length(&self) -> Coord {
        let extruders = self.skirt_brim.len().max(self.skirt_brim_open.len());
        (0..extruders)
            .map(|extruder| self.extruder_skirt_brim_length(extruder))
            .sum()
    }

    /// Drop every generated line set.
    pub fn clear_generated(&mut self) {
        self.skirt_brim.clear();
        self.skirt_brim_open.clear();
        self.support_brim.clear();
        self.shield_brim.clear();
    }

    /// Load a store from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut store: Self = serde_json::from_str(json)?;
        let highest = store.parts.iter().map(|p| p.extruder + 1).max().unwrap_or(0);
        store.extruder_count = store.extruder_count.max(highest);
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn square(x: Coord, size: Coord) -> ExPolygon {
        Polygon::rectangle(Point::new(x, 0), Point::new(x + size, size)).into()
    }

    #[test]
    fn test_part_selection() {
        let store = FirstLayerStore::new(2)
            .with_part(0, square(0, 1_000))
            .with_part(1, square(5_000, 1_000))
            .with_part(0, square(10_000, 1_000));

        assert_eq!(store.part_outlines(Extruders::All).len(), 3);
        assert_eq!(store.part_outlines(Extruders::Single(0)).len(), 2);
        assert_eq!(store.part_outlines(Extruders::Single(1)).len(), 1);
        assert!(store.part_outlines(Extruders::Single(2)).is_empty());
        assert_eq!(store.extruders_used(), vec![true, true]);
    }

    #[test]
    fn test_add_part_grows_extruder_count() {
        let store = FirstLayerStore::new(1).with_part(3, square(0, 10));
        assert_eq!(store.extruder_count, 4);
        assert_eq!(store.extruders_used(), vec![false, false, false, true]);
    }

    #[test]
    fn test_skirt_brim_slots() {
        let mut store = FirstLayerStore::new(1);
        assert!(store.skirt_brim_lines(2).is_empty());

        store
            .skirt_brim_mut(2)
            .push(Polygon::rectangle(Point::new(0, 0), Point::new(100, 100)));
        assert_eq!(store.skirt_brim.len(), 3);
        assert_eq!(store.skirt_brim_length(), 400);

        store
            .skirt_brim_open_mut(1)
            .push(Polyline::from(vec![Point::new(0, 0), Point::new(0, 250)]));
        assert_eq!(store.extruder_skirt_brim_length(1), 250);
        assert_eq!(store.extruder_skirt_brim_length(2), 400);
        assert_eq!(store.skirt_brim_length(), 650);

        store.clear_generated();
        assert_eq!(store.skirt_brim_length(), 0);
        assert!(store.skirt_brim_open_lines(1).is_empty());
    }

    #[test]
    fn test_support_presence() {
        let store = FirstLayerStore::new(1).with_support(SupportLayer::default());
        assert!(!store.has_support());

        let store = store.with_support(SupportLayer {
            infill_parts: vec![square(0, 100)],
            ..Default::default()
        });
        assert!(store.has_support());
    }

    #[test]
    fn test_json_round_trip_keeps_geometry() {
        let store = FirstLayerStore::new(1)
            .with_part(0, square(0, 1_000))
            .with_shield(ShieldKind::Draft, vec![square(-5_000, 500)]);

        let json = serde_json::to_string(&store).unwrap();
        let loaded = FirstLayerStore::from_json_str(&json).unwrap();
        assert_eq!(loaded, store);
        assert!(loaded.shield(ShieldKind::Draft).is_some());
        assert!(loaded.shield(ShieldKind::Ooze).is_none());
    }

    #[test]
    fn test_json_infers_extruder_count() {
        let json = r#"{ "parts": [ { "extruder": 1, "outline": { "contour":
            [ {"x": 0, "y": 0}, {"x": 10, "y": 0}, {"x": 10, "y": 10} ] } } ] }"#;
        let store = FirstLayerStore::from_json_str(json).unwrap();
        assert_eq!(store.extruder_count, 2);
    }
}
