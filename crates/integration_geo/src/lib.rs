//! Geocoding and routing integration for Waymark
//!
//! Provides place search and reverse geocoding via
//! [Nominatim/OpenStreetMap](https://nominatim.openstreetmap.org) and
//! turn-by-turn routing via an [OSRM](https://project-osrm.org) engine, plus
//! GeoJSON export/import of waypoints and routes.
//!
//! # Architecture
//!
//! Both engines sit behind client traits: [`GeocodingClient`] is implemented
//! by [`NominatimGeocodingClient`] (rate-limited queue and result cache) and
//! [`RoutingClient`] by [`OsrmRoutingClient`]. Per-consumer state lives in
//! [`SearchSession`] (debounced search) and [`RoutePlanner`] (displayed route,
//! stale responses discarded).
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_geo::{GeocodingClient, GeocodingConfig, NominatimGeocodingClient, SearchOptions};
//!
//! let client = NominatimGeocodingClient::new(&GeocodingConfig::default())?;
//! let places = client
//!     .search_address("Rynek Główny, Kraków", &SearchOptions::default())
//!     .await?;
//! ```

mod config;
mod debounce;
mod error;
pub mod geocoding;
pub mod geojson;
pub mod maneuver;
pub mod polyline;
pub mod routing;
mod session;

pub use config::{GeoConfig, GeocodingConfig, RoutingConfig};
pub use debounce::{Debouncer, ScheduledTask};
pub use error::{GeocodingError, RoutingError};
pub use geocoding::{
    GeocodingClient, GeocodingResult, NominatimGeocodingClient, ReverseGeocodingResult,
    SearchOptions,
};
pub use geojson::GeoJsonError;
pub use maneuver::{Instruction, ManeuverIcon};
pub use polyline::PolylineError;
pub use routing::{DisplayRoute, OsrmRoutingClient, RouteRequest, RoutePlanner, RoutingClient};
pub use session::{SearchSession, SearchState};
