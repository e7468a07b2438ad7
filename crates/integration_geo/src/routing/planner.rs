//! Holds the displayed route of one consumer
//!
//! Route calculations are not queued, so two calls may settle out of order.
//! Each call takes a generation number and only the newest one may replace
//! the displayed route. Failures never touch it.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{DisplayRoute, RouteRequest, RoutingClient};
use crate::error::RoutingError;

/// Route state for one consumer over a shared [`RoutingClient`]
pub struct RoutePlanner {
    client: Arc<dyn RoutingClient>,
    generation: AtomicU64,
    current: RwLock<Option<Arc<DisplayRoute>>>,
}

impl fmt::Debug for RoutePlanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutePlanner")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl RoutePlanner {
    pub fn new(client: Arc<dyn RoutingClient>) -> Self {
        Self {
            client,
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    /// Calculate a route and display it unless a newer request was issued meanwhile
    ///
    /// Returns `Ok(None)` when the result was superseded and discarded.
    /// On error the displayed route is left as it was.
    pub async fn plan(&self, request: &RouteRequest) -> Result<Option<Arc<DisplayRoute>>, RoutingError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let route = Arc::new(self.client.calculate_route(request).await?);

        let mut current = self.current.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            warn!(generation, "Discarding stale route response");
            return Ok(None);
        }

        debug!(generation, summary = %route, "Displaying new route");
        *current = Some(Arc::clone(&route));
        Ok(Some(route))
    }

    /// The route currently displayed
    pub async fn current(&self) -> Option<Arc<DisplayRoute>> {
        self.current.read().await.clone()
    }

    /// Remove the displayed route and discard in-flight results
    pub async fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.current.write().await = None;
    }
}
