//! Nominatim geocoding client
//!
//! Converts free-form queries to places and coordinates to addresses using
//! the [Nominatim](https://nominatim.openstreetmap.org) API (OpenStreetMap).
//!
//! Every engine call goes through a [`RateLimitedQueue`] so that at most one
//! request is in flight, and successful responses are kept in a
//! [`ResultCache`] until it is explicitly cleared.

mod address;
mod cache;
mod models;
mod queue;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, instrument};

pub use address::{AddressComponents, format_polish_address};
pub use cache::{CacheKey, ResultCache, normalize_query};
pub use models::{GeocodingResult, ReverseGeocodingResult, SearchOptions};
pub use queue::RateLimitedQueue;

use crate::config::GeocodingConfig;
use crate::error::GeocodingError;
use models::{RawReverseResult, RawSearchResult};

/// Trait for geocoding clients
#[async_trait]
pub trait GeocodingClient: Send + Sync {
    /// Search places matching a free-form query
    ///
    /// A blank query returns an empty list without touching the engine.
    async fn search_address(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<GeocodingResult>, GeocodingError>;

    /// Resolve coordinates to an address, `None` when the engine has none
    async fn get_address_from_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<Option<ReverseGeocodingResult>, GeocodingError>;

    /// Drop all cached responses
    async fn clear_cache(&self);

    /// Reset pacing state so the next call is issued immediately
    async fn reset_state(&self);
}

/// Nominatim-based geocoding client with request serialization and caching
#[derive(Debug)]
pub struct NominatimGeocodingClient {
    client: Client,
    config: GeocodingConfig,
    cache: ResultCache,
    queue: RateLimitedQueue,
}

impl NominatimGeocodingClient {
    /// Create a new Nominatim geocoding client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodingError> {
        config.validate().map_err(GeocodingError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GeocodingError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
            cache: ResultCache::new(config.cache_capacity),
            queue: RateLimitedQueue::new(Duration::from_millis(config.min_interval_ms)),
        })
    }

    /// Create a shareable client wrapped in Arc
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new_shared(config: &GeocodingConfig) -> Result<Arc<Self>, GeocodingError> {
        Ok(Arc::new(Self::new(config)?))
    }

    /// The response cache
    #[must_use]
    pub const fn cache(&self) -> &ResultCache {
        &self.cache
    }

    fn common_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("format", "json".to_string()),
            ("addressdetails", "1".to_string()),
        ];
        if let Some(language) = &self.config.accept_language {
            params.push(("accept-language", language.clone()));
        }
        params
    }

    /// Issue one GET through the queue and return the body of a 2xx response
    async fn fetch(&self, path: &str, params: &[(&str, String)]) -> Result<String, GeocodingError> {
        let url = format!("{}/{path}", self.config.base_url.trim_end_matches('/'));
        self.queue.run(|| self.send(&url, params)).await
    }

    async fn send(&self, url: &str, params: &[(&str, String)]) -> Result<String, GeocodingError> {
        let response = self.client.get(url).query(params).send().await?;
        Self::read_body(response).await
    }

    async fn read_body(response: Response) -> Result<String, GeocodingError> {
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodingError::Api {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }
        Ok(response.text().await?)
    }

    fn parse_search_response(body: &str) -> Result<Vec<GeocodingResult>, GeocodingError> {
        let raw: Vec<RawSearchResult> =
            serde_json::from_str(body).map_err(|e| GeocodingError::Parse(e.to_string()))?;
        raw.into_iter().map(RawSearchResult::into_result).collect()
    }

    fn parse_reverse_response(body: &str) -> Result<Option<ReverseGeocodingResult>, GeocodingError> {
        let raw: RawReverseResult =
            serde_json::from_str(body).map_err(|e| GeocodingError::Parse(e.to_string()))?;
        Ok(raw.into_result())
    }
}

#[async_trait]
impl GeocodingClient for NominatimGeocodingClient {
    #[instrument(skip(self, options))]
    async fn search_address(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<GeocodingResult>, GeocodingError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let limit = options.limit.unwrap_or(self.config.default_limit);
        let key = CacheKey::search(query, options.bounding_box.as_ref(), limit);
        if let Some(results) = self.cache.get_search(&key).await {
            debug!(%query, "Geocoding cache hit");
            return Ok(Vec::clone(&results));
        }

        let mut params = vec![("q", query.to_string()), ("limit", limit.to_string())];
        params.extend(self.common_params());
        if let Some(bbox) = &options.bounding_box {
            params.push(("viewbox", bbox.to_viewbox()));
            params.push(("bounded", "1".to_string()));
        }

        debug!(%query, limit, "Searching address");
        let epoch = self.cache.epoch();
        let body = self.fetch("search", &params).await?;
        let results = Self::parse_search_response(&body)?;

        debug!(%query, count = results.len(), "Address search finished");
        if !self
            .cache
            .insert_search(key, Arc::new(results.clone()), epoch)
            .await
        {
            debug!(%query, "Cache cleared during search, result not stored");
        }
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn get_address_from_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<Option<ReverseGeocodingResult>, GeocodingError> {
        let key = CacheKey::reverse(lat, lon);
        if let Some(cached) = self.cache.get_reverse(&key).await {
            debug!(%lat, %lon, "Reverse geocoding cache hit");
            return Ok(cached.map(|r| ReverseGeocodingResult::clone(&r)));
        }

        let mut params = vec![("lat", lat.to_string()), ("lon", lon.to_string())];
        params.extend(self.common_params());

        debug!(%lat, %lon, "Reverse geocoding");
        let epoch = self.cache.epoch();
        let body = self.fetch("reverse", &params).await?;
        let result = Self::parse_reverse_response(&body)?;

        if result.is_none() {
            debug!(%lat, %lon, "No address at coordinates");
        }
        if !self
            .cache
            .insert_reverse(key, result.clone().map(Arc::new), epoch)
            .await
        {
            debug!(%lat, %lon, "Cache cleared during lookup, result not stored");
        }
        Ok(result)
    }

    async fn clear_cache(&self) {
        debug!("Clearing geocoding cache");
        self.cache.clear();
    }

    async fn reset_state(&self) {
        self.queue.reset().await;
    }
}
