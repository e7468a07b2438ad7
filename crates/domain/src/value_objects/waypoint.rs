//! Tour waypoint and its identifier

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Coordinate;

/// A unique waypoint identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaypointId(Uuid);

impl WaypointId {
    /// Create a new random waypoint ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a waypoint ID from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for WaypointId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WaypointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stop on a tour, in visiting order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub id: WaypointId,
    pub coordinate: Coordinate,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Position in the tour, 0-based
    pub order: u32,
    /// Planned stay at this waypoint in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_duration: Option<u32>,
}

impl Waypoint {
    /// Create a waypoint with a fresh identifier
    #[must_use]
    pub fn new(coordinate: Coordinate, name: impl Into<String>, order: u32) -> Self {
        Self {
            id: WaypointId::new(),
            coordinate,
            name: name.into(),
            description: None,
            order,
            stop_duration: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub const fn with_stop_duration(mut self, minutes: u32) -> Self {
        self.stop_duration = Some(minutes);
        self
    }
}
