//! Skirt/brim configuration types.
//!
//! All distances are in scaled units (1 unit = 1 micrometer) so that ring
//! offsets stay integral and reproducible.

use crate::clipper::OffsetJoinType;
use crate::{Coord, CoordF, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Hard cap on the number of rings a single ring sequence may produce.
///
/// Guarantees termination when the minimal-length requirement cannot be met,
/// e.g. for near-zero perimeter outlines.
pub const MAX_RING_COUNT: usize = 1000;

/// Holes smaller than this many `line_width²` are removed from rings.
pub const HOLE_REMOVAL_MULTIPLIER: u32 = 100;

/// Per-extruder skirt/brim settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtruderSettings {
    /// Skirt/brim line width (scaled units).
    pub line_width: Coord,
    /// Multiplier applied to line widths on the first layer.
    pub initial_layer_line_width_factor: CoordF,
    /// Minimal total length of this extruder's skirt/brim lines (scaled units).
    pub minimal_length: Coord,
    /// Ring count for this extruder when it is not the adhesion extruder.
    /// Zero means "as many as `minimal_length` needs".
    pub line_count: usize,
}

impl Default for ExtruderSettings {
    fn default() -> Self {
        Self {
            line_width: 400,
            initial_layer_line_width_factor: 1.0,
            minimal_length: 250_000,
            line_count: 0,
        }
    }
}

impl ExtruderSettings {
    /// Create settings with the given line width and no minimal length.
    pub fn new(line_width: Coord) -> Self {
        Self {
            line_width,
            minimal_length: 0,
            ..Default::default()
        }
    }

    /// Builder method: set the minimal total line length.
    pub fn minimal_length(mut self, length: Coord) -> Self {
        self.minimal_length = length;
        self
    }

    /// Builder method: set the first-layer line width factor.
    pub fn initial_layer_line_width_factor(mut self, factor: CoordF) -> Self {
        self.initial_layer_line_width_factor = factor;
        self
    }

    /// Builder method: set the secondary ring count.
    pub fn line_count(mut self, count: usize) -> Self {
        self.line_count = count;
        self
    }

    /// Line width actually printed on the first layer.
    pub fn first_layer_line_width(&self) -> Coord {
        (self.line_width as CoordF * self.initial_layer_line_width_factor).round() as Coord
    }
}

/// Settings for an ooze or draft shield.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldSettings {
    /// Whether the shield receives its own brim.
    pub enabled: bool,
}

/// Skirt/brim generation settings.
///
/// When `distance > 0` and `line_count == 1` the run is a skirt, otherwise a brim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkirtBrimConfig {
    // === Primary rings ===
    /// Gap between the reference outline and the first ring (scaled units).
    pub distance: Coord,
    /// Number of rings of the adhesion extruder.
    pub line_count: usize,
    /// Extruder that prints the primary skirt/brim.
    pub adhesion_extruder: usize,
    /// Settings per extruder, indexed by extruder number.
    pub extruders: Vec<ExtruderSettings>,
    /// Give every other used extruder its own rings outside the primary ones.
    pub per_extruder_skirt_brim: bool,

    // === Brim shape ===
    /// Do not put brim inside empty holes of the model.
    pub brim_outside_only: bool,
    /// Remove first-layer support where the model brim goes.
    pub brim_replaces_support: bool,

    // === Helper structures ===
    /// Master switch for support and shield brim.
    pub allow_helpers: bool,
    /// Lay brim along the edge of first-layer support.
    pub support_brim_enable: bool,
    /// Number of support brim lines.
    pub support_brim_line_count: usize,
    /// Extruder printing the support infill.
    pub support_extruder: usize,
    /// Ooze shield brim settings.
    pub ooze_shield: ShieldSettings,
    /// Draft shield brim settings.
    pub draft_shield: ShieldSettings,

    // === Offsetting ===
    /// Corner style of offset rings.
    pub join_type: OffsetJoinType,
    /// Safety cap on rings per sequence.
    pub max_ring_count: usize,
    /// Offset holes below `multiplier * line_width²` are dropped from rings.
    pub hole_removal_multiplier: u32,
}

impl SkirtBrimConfig {
    /// Create a new SkirtBrimConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the distance of the first ring.
    pub fn distance(mut self, distance: Coord) -> Self {
        self.distance = distance;
        self
    }

    /// Builder method: set the primary ring count.
    pub fn line_count(mut self, count: usize) -> Self {
        self.line_count = count;
        self
    }

    /// Builder method: set the adhesion extruder.
    pub fn adhesion_extruder(mut self, extruder: usize) -> Self {
        self.adhesion_extruder = extruder;
        self
    }

    /// Builder method: replace the per-extruder settings.
    pub fn extruders(mut self, extruders: Vec<ExtruderSettings>) -> Self {
        self.extruders = extruders;
        self
    }

    /// Builder method: set the corner style of rings.
    pub fn join_type(mut self, join_type: OffsetJoinType) -> Self {
        self.join_type = join_type;
        self
    }

    /// Builder method: set the ring safety cap.
    pub fn max_ring_count(mut self, count: usize) -> Self {
        self.max_ring_count = count;
        self
    }

    /// Builder method: enable/disable support brim.
    pub fn support_brim(mut self, enabled: bool, line_count: usize) -> Self {
        self.support_brim_enable = enabled;
        self.support_brim_line_count = line_count;
        self
    }

    /// Builder method: enable/disable shield brim.
    pub fn shields(mut self, ooze: bool, draft: bool) -> Self {
        self.ooze_shield.enabled = ooze;
        self.draft_shield.enabled = draft;
        self
    }

    /// Whether these settings describe a skirt rather than a brim.
    pub fn is_skirt(&self) -> bool {
        self.distance > 0 && self.line_count == 1
    }

    /// Settings of an extruder, falling back to defaults for unknown indices.
    pub fn extruder(&self, extruder: usize) -> ExtruderSettings {
        self.extruders.get(extruder).cloned().unwrap_or_default()
    }

    /// First-layer line width of an extruder.
    pub fn line_width(&self, extruder: usize) -> Coord {
        self.extruder(extruder).first_layer_line_width()
    }

    /// Area below which offset holes are dropped, for a given line width.
    pub fn hole_area_threshold(&self, line_width: Coord) -> CoordF {
        line_width as CoordF * line_width as CoordF * self.hole_removal_multiplier as CoordF
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.distance < 0 {
            return Err(Error::Config("Skirt/brim distance must not be negative".into()));
        }
        if self.extruders.get(self.adhesion_extruder).is_none() {
            return Err(Error::Config(format!(
                "Adhesion extruder {} has no settings ({} extruders configured)",
                self.adhesion_extruder,
                self.extruders.len()
            )));
        }
        for (nr, extruder) in self.extruders.iter().enumerate() {
            if extruder.line_width <= 0 {
                return Err(Error::Config(format!(
                    "Extruder {}: line width must be positive",
                    nr
                )));
            }
            if extruder.initial_layer_line_width_factor <= 0.0 {
                return Err(Error::Config(format!(
                    "Extruder {}: initial layer line width factor must be positive",
                    nr
                )));
            }
            if extruder.minimal_length < 0 {
                return Err(Error::Config(format!(
                    "Extruder {}: minimal length must not be negative",
                    nr
                )));
            }
        }
        if self.max_ring_count == 0 {
            return Err(Error::Config("Maximum ring count must be positive".into()));
        }
        Ok(())
    }

    /// Parse and validate a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

impl Default for SkirtBrimConfig {
    fn default() -> Self {
        Self {
            // Primary rings
            distance: 3_000,
            line_count: 1,
            adhesion_extruder: 0,
            extruders: vec![ExtruderSettings::default()],
            per_extruder_skirt_brim: true,

            // Brim shape
            brim_outside_only: true,
            brim_replaces_support: true,

            // Helpers
            allow_helpers: true,
            support_brim_enable: false,
            support_brim_line_count: 20,
            support_extruder: 0,
            ooze_shield: ShieldSettings::default(),
            draft_shield: ShieldSettings::default(),

            // Offsetting
            join_type: OffsetJoinType::Round,
            max_ring_count: MAX_RING_COUNT,
            hole_removal_multiplier: HOLE_REMOVAL_MULTIPLIER,
        }
    }
}

impl fmt::Display for SkirtBrimConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SkirtBrimConfig({}, distance={}, lines={}, extruder={})",
            if self.is_skirt() { "skirt" } else { "brim" },
            self.distance,
            self.line_count,
            self.adhesion_extruder
        )
    }
}
