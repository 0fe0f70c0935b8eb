//! # Skirt/Brim
//!
//! First-layer adhesion geometry for a 3D printing slicer.
//!
//! This library computes the extra contour lines printed on the first layer:
//! - A **skirt**: one ring at a fixed stand-off distance around everything on
//!   the build plate, used to prime the nozzle.
//! - A **brim**: nested rings hugging the model outline, used for bed adhesion.
//! - Support brim and ooze/draft shield brim, laid out so that the different
//!   sources never line the same area twice.
//!
//! ## Example
//!
//! ```rust,ignore
//! use skirt_brim::{generate, FirstLayerStore, SkirtBrimConfig};
//!
//! let mut store: FirstLayerStore = serde_json::from_str(&layer_json)?;
//! let config = SkirtBrimConfig::default().line_count(5).distance(0);
//! generate(&mut store, &config);
//! let brim = store.skirt_brim_lines(config.adhesion_extruder);
//! ```

// Core modules
pub mod adhesion;
pub mod clipper;
pub mod config;
pub mod geometry;
pub mod store;

pub use adhesion::{
    accumulate, collect_first_layer_outline, generate, generate_primary_skirt_brim_lines,
    generate_shield_brim, generate_support_brim, get_first_layer_outline, line_coverage,
    subtract_covered, AdhesionMode, CoveredArea, OutlineCollection, OutlineRequest, RingOffsetGenerator,
    RingSet, ShieldBrimResult, SupportBrimResult,
};
pub use clipper::{
    clip_loops, closing, convex_hull, difference, grow, intersection, offset_expolygons,
    offset_polygons, offset_polylines, remove_small_holes, shrink, total_area, union, union_ex,
    OffsetJoinType,
};
pub use config::{ExtruderSettings, ShieldSettings, SkirtBrimConfig, MAX_RING_COUNT};
pub use geometry::{
    BoundingBox, ExPolygon, ExPolygons, Line, Point, Polygon, Polygons, Polyline, Polylines,
};
pub use store::{Extruders, FirstLayerStore, LayerPart, Shield, ShieldKind, SupportLayer};

/// Coordinate type used throughout the crate.
/// Integer coordinates (scaled by SCALING_FACTOR) keep ring offsets reproducible.
pub type Coord = i64;

/// Floating-point coordinate type for unscaled values.
pub type CoordF = f64;

/// Scaling factor: coordinates are stored as integers scaled by this factor.
/// 1 unit = 1 micrometer, so 1mm = 1_000 units.
pub const SCALING_FACTOR: f64 = 1_000.0;

/// Scale a floating-point coordinate (mm) to integer units.
#[inline]
pub fn scale(v: CoordF) -> Coord {
    (v * SCALING_FACTOR).round() as Coord
}

/// Unscale an integer coordinate to floating-point (mm).
#[inline]
pub fn unscale(v: Coord) -> CoordF {
    v as CoordF / SCALING_FACTOR
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for skirt/brim operations.
///
/// Geometry generation itself never fails; degenerate input just yields fewer
/// lines. Errors come from loading and validating configuration and jobs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
