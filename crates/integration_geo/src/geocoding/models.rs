//! Geocoding result models and raw Nominatim payloads

use domain::BoundingBox;
use serde::{Deserialize, Serialize};

use super::address::{AddressComponents, format_polish_address};
use crate::GeocodingError;

/// Options for a forward search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    /// Restrict results to this box
    pub bounding_box: Option<BoundingBox>,
    /// Maximum number of results; the configured default when `None`
    pub limit: Option<u32>,
}

impl SearchOptions {
    #[must_use]
    pub const fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A place found by forward search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodingResult {
    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
    /// Engine place type (e.g. "attraction", "house")
    #[serde(rename = "type")]
    pub place_type: String,
    /// Engine relevance score, clamped to [0, 1]
    pub importance: f64,
    /// `[minLat, maxLat, minLon, maxLon]`
    pub bounding_box: [f64; 4],
}

impl GeocodingResult {
    /// The result's extent as a viewbox for follow-up searches
    #[must_use]
    pub const fn extent(&self) -> BoundingBox {
        BoundingBox::from_engine(self.bounding_box)
    }
}

/// An address found by reverse lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseGeocodingResult {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poi_name: Option<String>,
    /// Derived with [`format_polish_address`]
    pub formatted_address: String,
}

/// Raw Nominatim search hit
#[derive(Debug, Deserialize)]
pub(crate) struct RawSearchResult {
    display_name: String,
    lat: String,
    lon: String,
    #[serde(rename = "type", default)]
    place_type: String,
    #[serde(default)]
    importance: Option<f64>,
    #[serde(default)]
    boundingbox: Vec<String>,
}

impl RawSearchResult {
    pub(crate) fn into_result(self) -> Result<GeocodingResult, GeocodingError> {
        let lat = parse_coordinate(&self.lat, "latitude")?;
        let lon = parse_coordinate(&self.lon, "longitude")?;

        let bounding_box = match self.boundingbox.as_slice() {
            [min_lat, max_lat, min_lon, max_lon] => [
                parse_coordinate(min_lat, "bounding box")?,
                parse_coordinate(max_lat, "bounding box")?,
                parse_coordinate(min_lon, "bounding box")?,
                parse_coordinate(max_lon, "bounding box")?,
            ],
            _ => [lat, lat, lon, lon],
        };

        Ok(GeocodingResult {
            display_name: self.display_name,
            lat,
            lon,
            place_type: self.place_type,
            importance: self.importance.unwrap_or(0.0).clamp(0.0, 1.0),
            bounding_box,
        })
    }
}

fn parse_coordinate(value: &str, what: &str) -> Result<f64, GeocodingError> {
    value
        .trim()
        .parse()
        .map_err(|_| GeocodingError::Parse(format!("Invalid {what}: {value}")))
}

/// Raw Nominatim reverse lookup payload
#[derive(Debug, Deserialize)]
pub(crate) struct RawReverseResult {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: Option<RawAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAddress {
    road: Option<String>,
    pedestrian: Option<String>,
    house_number: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    country: Option<String>,
    tourism: Option<String>,
    amenity: Option<String>,
    historic: Option<String>,
    shop: Option<String>,
    leisure: Option<String>,
}

impl RawAddress {
    fn poi_name(&self) -> Option<&String> {
        [
            &self.tourism,
            &self.amenity,
            &self.historic,
            &self.shop,
            &self.leisure,
        ]
        .into_iter()
        .find_map(Option::as_ref)
    }
}

impl RawReverseResult {
    /// `None` when the engine reports an error or has no address
    pub(crate) fn into_result(self) -> Option<ReverseGeocodingResult> {
        if self.error.is_some() {
            return None;
        }
        let display_name = self.display_name?;
        let address = self.address.unwrap_or_default();

        let poi_name = address
            .poi_name()
            .cloned()
            .or_else(|| self.name.filter(|n| !n.trim().is_empty()));
        let street = address.road.clone().or_else(|| address.pedestrian.clone());
        let city = address
            .city
            .clone()
            .or_else(|| address.town.clone())
            .or_else(|| address.village.clone());

        let formatted_address = format_polish_address(&AddressComponents {
            poi_name: poi_name.clone(),
            street: street.clone(),
            house_number: address.house_number.clone(),
            display_name: display_name.clone(),
        });

        Some(ReverseGeocodingResult {
            display_name,
            street,
            house_number: address.house_number,
            city,
            country: address.country,
            poi_name,
            formatted_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_parsing() {
        let json = r#"[{
            "display_name": "Sukiennice, Rynek Główny, Kraków",
            "lat": "50.0617",
            "lon": "19.9373",
            "type": "attraction",
            "importance": 0.62,
            "boundingbox": ["50.0612", "50.0622", "19.9366", "19.9381"]
        }]"#;
        let raw: Vec<RawSearchResult> = serde_json::from_str(json).unwrap();
        let result = raw.into_iter().next().unwrap().into_result().unwrap();
        assert!((result.lat - 50.0617).abs() < 1e-9);
        assert!((result.lon - 19.9373).abs() < 1e-9);
        assert_eq!(result.place_type, "attraction");
        assert_eq!(result.bounding_box, [50.0612, 50.0622, 19.9366, 19.9381]);
        assert_eq!(result.extent(), BoundingBox::new(19.9366, 50.0612, 19.9381, 50.0622));
    }

    #[test]
    fn test_importance_is_clamped_and_defaulted() {
        let json = r#"[
            { "display_name": "A", "lat": "1", "lon": "2", "importance": 1.7 },
            { "display_name": "B", "lat": "1", "lon": "2" }
        ]"#;
        let raw: Vec<RawSearchResult> = serde_json::from_str(json).unwrap();
        let results: Vec<_> = raw
            .into_iter()
            .map(|r| r.into_result().unwrap())
            .collect();
        assert!((results[0].importance - 1.0).abs() < f64::EPSILON);
        assert!(results[1].importance.abs() < f64::EPSILON);
        assert_eq!(results[1].bounding_box, [1.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_invalid_latitude_is_parse_error() {
        let json = r#"{ "display_name": "A", "lat": "north", "lon": "2" }"#;
        let raw: RawSearchResult = serde_json::from_str(json).unwrap();
        assert!(matches!(raw.into_result(), Err(GeocodingError::Parse(_))));
    }

    #[test]
    fn test_reverse_with_street_and_number() {
        let json = r#"{
            "display_name": "15, Floriańska, Stare Miasto, Kraków, Polska",
            "address": {
                "road": "Floriańska",
                "house_number": "15",
                "city": "Kraków",
                "country": "Polska"
            }
        }"#;
        let raw: RawReverseResult = serde_json::from_str(json).unwrap();
        let result = raw.into_result().unwrap();
        assert_eq!(result.formatted_address, "ul. Floriańska 15");
        assert_eq!(result.city.as_deref(), Some("Kraków"));
        assert!(result.poi_name.is_none());
    }

    #[test]
    fn test_reverse_prefers_poi_tag() {
        let json = r#"{
            "display_name": "Sukiennice, Rynek Główny, Kraków",
            "address": { "tourism": "Sukiennice", "road": "Rynek Główny", "town": "Kraków" }
        }"#;
        let raw: RawReverseResult = serde_json::from_str(json).unwrap();
        let result = raw.into_result().unwrap();
        assert_eq!(result.formatted_address, "Sukiennice");
        assert_eq!(result.poi_name.as_deref(), Some("Sukiennice"));
        assert_eq!(result.city.as_deref(), Some("Kraków"));
    }

    #[test]
    fn test_reverse_error_field_maps_to_none() {
        let json = r#"{ "error": "Unable to geocode" }"#;
        let raw: RawReverseResult = serde_json::from_str(json).unwrap();
        assert!(raw.into_result().is_none());
    }

    #[test]
    fn test_reverse_without_address_uses_display_name() {
        let json = r#"{ "display_name": "Wisła" }"#;
        let raw: RawReverseResult = serde_json::from_str(json).unwrap();
        assert_eq!(raw.into_result().unwrap().formatted_address, "Wisła");
    }
}
