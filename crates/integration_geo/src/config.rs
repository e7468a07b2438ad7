//! Geocoding and routing engine configuration

use serde::{Deserialize, Serialize};

const DEFAULT_USER_AGENT: &str = concat!("Waymark/", env!("CARGO_PKG_VERSION"));

/// Configuration for the geocoding engine (Nominatim API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL for the geocoding API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_geocoding_timeout_secs")]
    pub timeout_secs: u64,

    /// Identifying `User-Agent` sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Result limit used when a search does not specify one
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Minimum pause between two consecutive engine calls in milliseconds
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Quiet period for debounced searches in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Maximum number of cached responses (`None` keeps everything until cleared)
    #[serde(default)]
    pub cache_capacity: Option<u64>,

    /// Preferred result language (`accept-language` parameter)
    #[serde(default = "default_accept_language")]
    pub accept_language: Option<String>,
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

const fn default_geocoding_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

const fn default_limit() -> u32 {
    10
}

const fn default_min_interval_ms() -> u64 {
    1000
}

const fn default_debounce_ms() -> u64 {
    300
}

#[allow(clippy::unnecessary_wraps)] // serde default must match the field type
fn default_accept_language() -> Option<String> {
    Some("pl".to_string())
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            timeout_secs: default_geocoding_timeout_secs(),
            user_agent: default_user_agent(),
            default_limit: default_limit(),
            min_interval_ms: default_min_interval_ms(),
            debounce_ms: default_debounce_ms(),
            cache_capacity: None,
            accept_language: default_accept_language(),
        }
    }
}

impl GeocodingConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            min_interval_ms: 0,
            debounce_ms: 50,
            accept_language: None,
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("geocoding.base_url must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("geocoding.timeout_secs must be greater than 0".to_string());
        }

        if self.user_agent.trim().is_empty() {
            return Err("geocoding.user_agent must identify the application".to_string());
        }

        if self.default_limit == 0 {
            return Err("geocoding.default_limit must be greater than 0".to_string());
        }

        if self.cache_capacity == Some(0) {
            return Err("geocoding.cache_capacity must be greater than 0 when set".to_string());
        }

        Ok(())
    }
}

/// Configuration for the routing engine (OSRM HTTP API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Scheme and host of the routing engine, without port
    #[serde(default = "default_routing_base_url")]
    pub base_url: String,

    /// Port used when a request does not name one
    #[serde(default = "default_port")]
    pub default_port: u16,

    /// Travel profile used when a request does not name one
    #[serde(default = "default_profile")]
    pub default_profile: String,

    /// Request timeout in seconds
    #[serde(default = "default_routing_timeout_secs")]
    pub timeout_secs: u64,

    /// `User-Agent` sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_routing_base_url() -> String {
    "http://localhost".to_string()
}

const fn default_port() -> u16 {
    5000
}

fn default_profile() -> String {
    "foot".to_string()
}

const fn default_routing_timeout_secs() -> u64 {
    15
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: default_routing_base_url(),
            default_port: default_port(),
            default_profile: default_profile(),
            timeout_secs: default_routing_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl RoutingConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            base_url: "http://127.0.0.1".to_string(),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("routing.base_url must not be empty".to_string());
        }

        if self.default_port == 0 {
            return Err("routing.default_port must be greater than 0".to_string());
        }

        if self.default_profile.trim().is_empty() {
            return Err("routing.default_profile must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("routing.timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Combined configuration, one section per engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoConfig {
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    #[serde(default)]
    pub routing: RoutingConfig,
}

impl GeoConfig {
    /// Validate both sections
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn validate(&self) -> Result<(), String> {
        self.geocoding.validate()?;
        self.routing.validate()
    }
}
