//! Geographic coordinate value object

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DomainError;

/// A WGS84 position, longitude first as routing engines and GeoJSON expect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Longitude in degrees (-180 to 180)
    lon: f64,
    /// Latitude in degrees (-90 to 90)
    lat: f64,
}

impl Coordinate {
    /// Create a new coordinate with range validation
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCoordinate` if latitude is not in [-90, 90]
    /// or longitude is not in [-180, 180]
    pub fn new(lon: f64, lat: f64) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(DomainError::InvalidCoordinate { lon, lat });
        }
        Ok(Self { lon, lat })
    }

    /// Create a coordinate without validation (for engine output)
    #[must_use]
    pub const fn new_unchecked(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Get the longitude
    #[must_use]
    pub const fn lon(&self) -> f64 {
        self.lon
    }

    /// Get the latitude
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// `[lon, lat]` pair as used in GeoJSON geometries
    #[must_use]
    pub const fn to_array(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Great-circle distance to another coordinate in meters (Haversine)
    #[must_use]
    pub fn distance_m(&self, other: &Self) -> f64 {
        const EARTH_RADIUS_M: f64 = 6_371_000.0;

        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let a = (lat1_rad.cos() * lat2_rad.cos()).mul_add(
            (delta_lon / 2.0).sin().powi(2),
            (delta_lat / 2.0).sin().powi(2),
        )
        .min(1.0);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self::new_unchecked(lon, lat)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lon, self.lat)
    }
}
