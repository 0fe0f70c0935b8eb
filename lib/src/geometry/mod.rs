//! Planar geometry in scaled integer coordinates.
//!
//! One unit is a micrometre (`SCALING_FACTOR` = 1000 per mm), so ring offsets
//! land on exact grid points. [`Polygon`]s are closed loops whose winding tells
//! contours (counter-clockwise) from holes (clockwise). An [`ExPolygon`] is one
//! contour with its holes, the shape of a printed island. [`Polyline`]s are
//! open paths, left over where a ring was cut.

mod bounding_box;
mod expolygon;
mod line;
mod point;
mod polygon;
mod polyline;
pub mod simplify;

pub use bounding_box::BoundingBox;
pub use expolygon::{get_extents, to_polygons, ExPolygon, ExPolygons};
pub use line::{Line, Lines};
pub use point::{Point, Points};
pub use polygon::{polygons_length, Polygon, Polygons};
pub use polyline::{polylines_length, Polyline, Polylines};
pub use simplify::{
    douglas_peucker, douglas_peucker_polygon, remove_short_segments, simplify_polygon,
    LARGEST_ERROR_OF_REMOVED_POINT, SMALLEST_LINE_LENGTH,
};
