//! Routing request, wire response and display models

use std::fmt;

use domain::Coordinate;
use serde::{Deserialize, Serialize};

use crate::maneuver::{Instruction, format_distance};

/// A route calculation request
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    /// Ordered stops, at least two
    pub waypoints: Vec<Coordinate>,
    /// Travel profile (e.g. "foot"); the configured default when `None`
    pub profile: Option<String>,
    /// Engine port; the configured default when `None`
    pub port: Option<u16>,
}

impl RouteRequest {
    #[must_use]
    pub const fn new(waypoints: Vec<Coordinate>) -> Self {
        Self {
            waypoints,
            profile: None,
            port: None,
        }
    }

    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Semicolon-joined `lon,lat` list used in the request path
    #[must_use]
    pub fn coordinate_path(&self) -> String {
        self.waypoints
            .iter()
            .map(|c| format!("{},{}", c.lon(), c.lat()))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Raw routing engine response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    /// `"Ok"` on success, otherwise an engine error code
    pub code: String,
    /// Human-readable explanation accompanying error codes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Meters
    pub distance: f64,
    /// Seconds
    pub duration: f64,
    /// Encoded polyline of the full overview
    pub geometry: String,
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteLeg {
    #[serde(default)]
    pub steps: Vec<RouteStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStep {
    pub maneuver: Maneuver,
    /// Street name, empty for unnamed ways
    #[serde(default)]
    pub name: String,
    /// Meters
    #[serde(default)]
    pub distance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Maneuver {
    #[serde(rename = "type")]
    pub maneuver_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<String>,
}

/// A successfully calculated route ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRoute {
    /// Total distance in meters
    pub distance_m: f64,
    /// Total duration in seconds
    pub duration_s: f64,
    /// Decoded geometry, `[lon, lat]` order
    pub path: Vec<Coordinate>,
    /// Turn-by-turn instructions ending with the arrival entry
    pub instructions: Vec<Instruction>,
}

impl DisplayRoute {
    /// Format as a compact one-line summary, e.g. `2.35 km, 28 min`
    #[must_use]
    pub fn format_summary(&self) -> String {
        format!(
            "{}, {}",
            format_distance(self.distance_m),
            format_duration(self.duration_s)
        )
    }
}

impl fmt::Display for DisplayRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_summary())
    }
}

/// Format seconds as `N min` or `H h M min`
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_duration(seconds: f64) -> String {
    let total_minutes = (seconds.max(0.0) / 60.0).round() as u64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{hours} h {minutes} min")
    } else {
        format!("{minutes} min")
    }
}
