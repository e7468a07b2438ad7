//! Rectangular geographic filter (viewbox)

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// A longitude/latitude rectangle used to restrict forward searches
///
/// Corner order is not checked on construction; callers that want a local
/// failure for swapped corners call [`BoundingBox::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Build a box from the `[minLat, maxLat, minLon, maxLon]` order that
    /// geocoding engines use in their `boundingbox` field
    #[must_use]
    pub const fn from_engine(bbox: [f64; 4]) -> Self {
        Self::new(bbox[2], bbox[0], bbox[3], bbox[1])
    }

    /// Engine `viewbox` parameter value: `minLon,minLat,maxLon,maxLat`
    #[must_use]
    pub fn to_viewbox(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }

    /// Check that the minimum corner does not exceed the maximum corner
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBoundingBox` naming the offending axis.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.min_lon > self.max_lon {
            return Err(DomainError::InvalidBoundingBox(format!(
                "minLon {} > maxLon {}",
                self.min_lon, self.max_lon
            )));
        }
        if self.min_lat > self.max_lat {
            return Err(DomainError::InvalidBoundingBox(format!(
                "minLat {} > maxLat {}",
                self.min_lat, self.max_lat
            )));
        }
        Ok(())
    }
}
