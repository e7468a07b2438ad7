//! GeoJSON export and import of waypoints and routes
//!
//! Waypoints are written as `Point` features carrying `name`, `description`,
//! `order` and `stopDuration` properties. A route is written as a single
//! `LineString` feature. Import keeps `Point` features only and takes their
//! order from the file, never from the `order` property.

use domain::{Coordinate, Waypoint};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::routing::DisplayRoute;

/// Errors raised while reading or writing GeoJSON
///
/// A well-formed collection without points is not an error; it imports as an
/// empty list.
#[derive(Debug, Error)]
pub enum GeoJsonError {
    /// Input is not valid JSON or does not have the collection shape
    #[error("Malformed GeoJSON: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Top-level `type` is not `FeatureCollection`
    #[error("Expected a FeatureCollection, found {found:?}")]
    WrongType {
        /// The `type` found in the document, empty when missing
        found: String,
    },

    /// A point feature carries unusable coordinates
    #[error("Invalid feature #{index}: {reason}")]
    InvalidFeature {
        /// Position of the feature in the collection
        index: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Serialization failed
    #[error("Failed to serialize GeoJSON: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Feature geometry, `[lon, lat]` positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point([f64; 2]),
    LineString(Vec<[f64; 2]>),
}

/// A GeoJSON feature with typed properties
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature<P> {
    #[serde(rename = "type")]
    kind: &'static str,
    pub geometry: Geometry,
    pub properties: P,
}

impl<P> Feature<P> {
    pub const fn new(geometry: Geometry, properties: P) -> Self {
        Self {
            kind: "Feature",
            geometry,
            properties,
        }
    }
}

/// A GeoJSON feature collection with typed properties
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCollection<P> {
    #[serde(rename = "type")]
    kind: &'static str,
    pub features: Vec<Feature<P>>,
}

impl<P> FeatureCollection<P> {
    pub const fn new(features: Vec<Feature<P>>) -> Self {
        Self {
            kind: "FeatureCollection",
            features,
        }
    }
}

/// Properties written for each waypoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointProperties {
    pub name: String,
    pub description: Option<String>,
    pub order: u32,
    pub stop_duration: Option<u32>,
}

impl From<&Waypoint> for WaypointProperties {
    fn from(waypoint: &Waypoint) -> Self {
        Self {
            name: waypoint.name.clone(),
            description: waypoint.description.clone(),
            order: waypoint.order,
            stop_duration: waypoint.stop_duration,
        }
    }
}

/// Properties written for a route line
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteProperties {
    /// Meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// Build a collection of `Point` features, one per waypoint, in slice order
pub fn waypoints_to_feature_collection(
    waypoints: &[Waypoint],
) -> FeatureCollection<WaypointProperties> {
    FeatureCollection::new(
        waypoints
            .iter()
            .map(|wp| Feature::new(Geometry::Point(wp.coordinate.to_array()), wp.into()))
            .collect(),
    )
}

/// Build a collection holding a single `LineString` feature for a route path
pub fn route_to_feature_collection(
    path: &[Coordinate],
    properties: RouteProperties,
) -> FeatureCollection<RouteProperties> {
    let line = Geometry::LineString(path.iter().map(Coordinate::to_array).collect());
    FeatureCollection::new(vec![Feature::new(line, properties)])
}

/// Serialize waypoints as a pretty-printed GeoJSON document
pub fn export_waypoints(waypoints: &[Waypoint]) -> Result<String, GeoJsonError> {
    serde_json::to_string_pretty(&waypoints_to_feature_collection(waypoints))
        .map_err(GeoJsonError::Serialize)
}

/// Serialize a calculated route as a pretty-printed GeoJSON document
pub fn export_route(route: &DisplayRoute) -> Result<String, GeoJsonError> {
    let properties = RouteProperties {
        distance: Some(route.distance_m),
        duration: Some(route.duration_s),
    };
    serde_json::to_string_pretty(&route_to_feature_collection(&route.path, properties))
        .map_err(GeoJsonError::Serialize)
}

#[derive(Debug, Deserialize)]
struct ImportCollection {
    #[serde(default)]
    features: Vec<ImportFeature>,
}

#[derive(Debug, Deserialize)]
struct ImportFeature {
    #[serde(default)]
    geometry: Option<ImportGeometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct ImportGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// Read waypoints from a GeoJSON `FeatureCollection`
///
/// Only `Point` features are kept, in file order. Every waypoint gets a fresh
/// identifier and its `order` is its position among the kept points. Points
/// without a name are called `Punkt {n}`, counting from 1.
pub fn import_waypoints(input: &str) -> Result<Vec<Waypoint>, GeoJsonError> {
    let document: Value = serde_json::from_str(input).map_err(GeoJsonError::Malformed)?;

    let found = document.get("type").and_then(Value::as_str).unwrap_or_default();
    if found != "FeatureCollection" {
        return Err(GeoJsonError::WrongType {
            found: found.to_string(),
        });
    }

    let collection: ImportCollection =
        serde_json::from_value(document).map_err(GeoJsonError::Malformed)?;

    let mut waypoints = Vec::new();
    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry.filter(|g| g.kind == "Point") else {
            continue;
        };
        let coordinate = point_coordinate(&geometry.coordinates)
            .map_err(|reason| GeoJsonError::InvalidFeature { index, reason })?;

        let order = u32::try_from(waypoints.len()).unwrap_or(u32::MAX);
        let properties = feature.properties.unwrap_or_default();
        waypoints.push(waypoint_from_properties(coordinate, &properties, order));
    }

    debug!(count = waypoints.len(), "Imported waypoints");
    Ok(waypoints)
}

fn point_coordinate(coordinates: &Value) -> Result<Coordinate, String> {
    let position = coordinates
        .as_array()
        .ok_or_else(|| "point coordinates must be an array".to_string())?;
    // Altitude and other extra members are ignored
    match position.as_slice() {
        [lon, lat, ..] => {
            let (Some(lon), Some(lat)) = (lon.as_f64(), lat.as_f64()) else {
                return Err("point coordinates must be numbers".to_string());
            };
            Coordinate::new(lon, lat).map_err(|e| e.to_string())
        },
        _ => Err("point needs at least longitude and latitude".to_string()),
    }
}

fn waypoint_from_properties(
    coordinate: Coordinate,
    properties: &Map<String, Value>,
    order: u32,
) -> Waypoint {
    let name = properties
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .map_or_else(|| format!("Punkt {}", order + 1), str::to_string);

    let mut waypoint = Waypoint::new(coordinate, name, order);
    if let Some(description) = properties.get("description").and_then(Value::as_str) {
        waypoint = waypoint.with_description(description);
    }
    if let Some(minutes) = properties
        .get("stopDuration")
        .and_then(Value::as_u64)
        .and_then(|m| u32::try_from(m).ok())
    {
        waypoint = waypoint.with_stop_duration(minutes);
    }
    waypoint
}
