//! OSRM routing client
//!
//! Calculates routes through an [OSRM](https://project-osrm.org) HTTP engine,
//! decodes the overview geometry and turns the step list into display
//! instructions. Routes are not cached: every call hits the engine.

pub mod models;
mod planner;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};
use url::Url;

pub use models::{DisplayRoute, RouteRequest, RouteResponse, format_duration};
pub use planner::RoutePlanner;

use crate::config::RoutingConfig;
use crate::error::RoutingError;
use crate::maneuver::build_instructions;
use crate::polyline;

/// Trait for routing engine clients
#[async_trait]
pub trait RoutingClient: Send + Sync {
    /// Calculate a route through the request's waypoints, in order
    async fn calculate_route(&self, request: &RouteRequest) -> Result<DisplayRoute, RoutingError>;
}

/// OSRM-backed routing client
#[derive(Debug)]
pub struct OsrmRoutingClient {
    client: Client,
    config: RoutingConfig,
}

impl OsrmRoutingClient {
    /// Create a new OSRM routing client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &RoutingConfig) -> Result<Self, RoutingError> {
        config.validate().map_err(RoutingError::Configuration)?;
        Url::parse(&config.base_url)
            .map_err(|e| RoutingError::Configuration(format!("base_url: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| RoutingError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Build `{base}:{port}/route/v1/{profile}/{coords}?overview=full&steps=true`
    pub fn route_url(&self, request: &RouteRequest) -> Result<Url, RoutingError> {
        if request.waypoints.len() < 2 {
            return Err(RoutingError::InvalidRequest(format!(
                "at least two waypoints are required, got {}",
                request.waypoints.len()
            )));
        }

        let profile = request
            .profile
            .as_deref()
            .unwrap_or(&self.config.default_profile);
        if profile.trim().is_empty() || profile.contains('/') {
            return Err(RoutingError::InvalidRequest(format!(
                "invalid profile: {profile:?}"
            )));
        }

        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| RoutingError::Configuration(format!("base_url: {e}")))?;
        url.set_port(Some(request.port.unwrap_or(self.config.default_port)))
            .map_err(|()| RoutingError::Configuration("base_url cannot carry a port".to_string()))?;

        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!(
            "{prefix}/route/v1/{profile}/{}",
            request.coordinate_path()
        ));
        url.set_query(Some("overview=full&steps=true"));
        Ok(url)
    }

    /// Interpret a decoded engine response
    fn interpret(response: RouteResponse) -> Result<DisplayRoute, RoutingError> {
        if response.code != "Ok" {
            warn!(code = %response.code, message = ?response.message, "Routing engine reported failure");
            return Err(RoutingError::from_engine_code(&response.code, response.message));
        }

        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RoutingError::Parse("response contains no routes".to_string()))?;

        let path = polyline::decode(&route.geometry)?;
        let instructions = build_instructions(&route.legs);

        Ok(DisplayRoute {
            distance_m: route.distance,
            duration_s: route.duration,
            path,
            instructions,
        })
    }

    fn parse_response(body: &str) -> Result<RouteResponse, RoutingError> {
        serde_json::from_str(body).map_err(|e| RoutingError::Parse(e.to_string()))
    }
}

#[async_trait]
impl RoutingClient for OsrmRoutingClient {
    #[instrument(skip(self, request), fields(waypoints = request.waypoints.len()))]
    async fn calculate_route(&self, request: &RouteRequest) -> Result<DisplayRoute, RoutingError> {
        let url = self.route_url(request)?;
        debug!(%url, "Calculating route");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Engines report NoRoute/NoSegment with a 4xx status and a JSON body
            if let Ok(parsed) = Self::parse_response(&body) {
                if parsed.code != "Ok" {
                    return Self::interpret(parsed);
                }
            }
            return Err(RoutingError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let route = Self::interpret(Self::parse_response(&body)?)?;
        debug!(
            distance_m = route.distance_m,
            duration_s = route.duration_s,
            points = route.path.len(),
            "Route calculated"
        );
        Ok(route)
    }
}
