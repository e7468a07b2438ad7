//! Geocoding and routing error types

use thiserror::Error;

use crate::polyline::PolylineError;

/// Errors that can occur during geocoding
///
/// "Nothing found" is not an error: forward search returns an empty list and
/// reverse lookup returns `None`.
#[derive(Debug, Error)]
pub enum GeocodingError {
    /// The engine answered with a non-success HTTP status
    #[error("Geocoding API error: {status} {status_text}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase for the status
        status_text: String,
    },

    /// No response at all (offline, DNS, timeout)
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Failed to parse geocoding response
    #[error("Geocoding parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Geocoding configuration error: {0}")]
    Configuration(String),
}

impl GeocodingError {
    /// Returns true if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Parse(_) | Self::Configuration(_) => false,
        }
    }
}

/// Errors that can occur while calculating a route
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Request rejected locally, nothing was sent
    #[error("Invalid route request: {0}")]
    InvalidRequest(String),

    /// The engine answered with a non-success HTTP status
    #[error("Routing API error: {status} {status_text}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase for the status
        status_text: String,
    },

    /// No response at all (offline, DNS, timeout)
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// No path exists between the points for this profile
    #[error("No route found: {message}")]
    NoRoute {
        /// Message reported by the engine
        message: String,
    },

    /// A point is too far from any routable way
    #[error("Point not reachable from the road network: {message}")]
    NoSegment {
        /// Message reported by the engine
        message: String,
    },

    /// Any other engine status code
    #[error("Routing failed ({code}): {message}")]
    Engine {
        /// Status code reported by the engine
        code: String,
        /// Message reported by the engine
        message: String,
    },

    /// Route geometry could not be decoded
    #[error("Invalid route geometry: {0}")]
    Geometry(#[from] PolylineError),

    /// Failed to parse routing response
    #[error("Routing parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Routing configuration error: {0}")]
    Configuration(String),
}

impl RoutingError {
    /// Build the error for a non-`Ok` engine status code
    pub fn from_engine_code(code: &str, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| code.to_string());
        match code {
            "NoRoute" => Self::NoRoute { message },
            "NoSegment" => Self::NoSegment { message },
            _ => Self::Engine {
                code: code.to_string(),
                message,
            },
        }
    }

    /// Engine status code for semantic failures
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::NoRoute { .. } => Some("NoRoute"),
            Self::NoSegment { .. } => Some("NoSegment"),
            Self::Engine { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Returns true if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
