//! Pure geometry on a spherical earth: containment, distances and
//! editor helpers. Nothing here holds state.

pub mod containment;
pub mod distance;
pub mod editor;
pub mod geohash;

pub use containment::{contains_point, distance_to_boundary};
pub use distance::{EARTH_RADIUS_M, haversine_distance, initial_bearing};
pub use editor::{BoundingBox, area, bounding_box, centroid};
