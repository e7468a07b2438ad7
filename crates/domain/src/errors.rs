//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Coordinate outside of the WGS84 range
    #[error("Invalid coordinate: lon={lon}, lat={lat}")]
    InvalidCoordinate { lon: f64, lat: f64 },

    /// Bounding box corners are in the wrong order
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),
}
