//! Value Objects - Immutable, identity-less domain primitives

mod bounding_box;
mod coordinate;
mod waypoint;

pub use bounding_box::BoundingBox;
pub use coordinate::Coordinate;
pub use waypoint::{Waypoint, WaypointId};
