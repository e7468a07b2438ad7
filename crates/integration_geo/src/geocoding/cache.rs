//! In-memory result cache keyed by request fingerprint

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use domain::BoundingBox;
use moka::future::Cache;
use serde_json::json;

use super::models::{GeocodingResult, ReverseGeocodingResult};

/// Stable fingerprint of a geocoding request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a forward search
    #[must_use]
    pub fn search(query: &str, bounding_box: Option<&BoundingBox>, limit: u32) -> Self {
        Self(json!(["search", normalize_query(query), bounding_box, limit]).to_string())
    }

    /// Key for a reverse lookup
    #[must_use]
    pub fn reverse(lat: f64, lon: f64) -> Self {
        Self(json!(["reverse", lat, lon]).to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Trim, collapse inner whitespace and lowercase a query
#[must_use]
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone)]
enum CachedValue {
    Search(Arc<Vec<GeocodingResult>>),
    Reverse(Option<Arc<ReverseGeocodingResult>>),
}

/// Response cache without time-based expiry
///
/// Entries stay until [`ResultCache::clear`] unless a capacity bound is
/// configured. Every clear starts a new epoch; a response fetched under an
/// older epoch is not stored, so a clear cannot be undone by a request that
/// was already in flight.
#[derive(Debug, Clone)]
pub struct ResultCache {
    inner: Cache<CacheKey, CachedValue>,
    epoch: Arc<AtomicU64>,
}

impl ResultCache {
    #[must_use]
    pub fn new(capacity: Option<u64>) -> Self {
        let builder = Cache::builder();
        let inner = match capacity {
            Some(max) => builder.max_capacity(max).build(),
            None => builder.build(),
        };
        Self {
            inner,
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current epoch, to be taken before fetching a value for [`Self::insert_search`]
    /// or [`Self::insert_reverse`]
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    async fn insert(&self, key: CacheKey, value: CachedValue, epoch: u64) -> bool {
        if self.epoch() != epoch {
            return false;
        }
        self.inner.insert(key.clone(), value).await;
        // A clear may have slipped in between the check and the insert
        if self.epoch() != epoch {
            self.inner.invalidate(&key).await;
            return false;
        }
        true
    }

    pub async fn get_search(&self, key: &CacheKey) -> Option<Arc<Vec<GeocodingResult>>> {
        match self.inner.get(key).await? {
            CachedValue::Search(results) => Some(results),
            CachedValue::Reverse(_) => None,
        }
    }

    /// Store search results fetched under `epoch`; returns false if a clear intervened
    pub async fn insert_search(
        &self,
        key: CacheKey,
        results: Arc<Vec<GeocodingResult>>,
        epoch: u64,
    ) -> bool {
        self.insert(key, CachedValue::Search(results), epoch).await
    }

    /// Outer `None` is a miss, inner `None` a cached "no address"
    pub async fn get_reverse(
        &self,
        key: &CacheKey,
    ) -> Option<Option<Arc<ReverseGeocodingResult>>> {
        match self.inner.get(key).await? {
            CachedValue::Reverse(result) => Some(result),
            CachedValue::Search(_) => None,
        }
    }

    /// Store a reverse lookup fetched under `epoch`; returns false if a clear intervened
    pub async fn insert_reverse(
        &self,
        key: CacheKey,
        result: Option<Arc<ReverseGeocodingResult>>,
        epoch: u64,
    ) -> bool {
        self.insert(key, CachedValue::Reverse(result), epoch).await
    }

    /// Drop every entry, forward and reverse
    pub fn clear(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.inner.invalidate_all();
    }

    /// Number of live entries after pending maintenance has run
    pub async fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(None)
    }
}
