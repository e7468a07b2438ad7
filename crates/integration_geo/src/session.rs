//! Per-consumer search state with debounced input
//!
//! A [`SearchSession`] belongs to one consumer (e.g. one UI session). It owns
//! its debounce timer and result state; the geocoding client and its cache can
//! be shared between sessions.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use crate::config::GeocodingConfig;
use crate::debounce::Debouncer;
use crate::geocoding::{GeocodingClient, GeocodingResult, SearchOptions};

/// Observable state of a search session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// Query the current results belong to
    pub query: String,
    pub results: Vec<GeocodingResult>,
    /// A search has fired and not settled yet
    pub loading: bool,
    /// Message of the last failed search
    pub error: Option<String>,
}

/// Debounced search front-end over a [`GeocodingClient`]
pub struct SearchSession {
    client: Arc<dyn GeocodingClient>,
    options: SearchOptions,
    debouncer: Debouncer,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<SearchState>>,
}

impl fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchSession")
            .field("options", &self.options)
            .field("debouncer", &self.debouncer)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl SearchSession {
    pub fn new(client: Arc<dyn GeocodingClient>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            client,
            options: SearchOptions::default(),
            debouncer: Debouncer::new(debounce),
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
        }
    }

    /// Build a session with the configured debounce delay and result limit
    pub fn from_config(client: Arc<dyn GeocodingClient>, config: &GeocodingConfig) -> Self {
        Self::new(client, Duration::from_millis(config.debounce_ms))
            .with_options(SearchOptions::default().with_limit(config.default_limit))
    }

    /// Options applied to every search of this session
    #[must_use]
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Schedule a search for `query` after the debounce delay
    ///
    /// Earlier pending searches are cancelled. A blank query clears the
    /// results immediately without scheduling anything.
    pub fn debounced_search(&self, query: &str) {
        if query.trim().is_empty() {
            self.clear_results();
            return;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.to_string();
        let client = Arc::clone(&self.client);
        let options = self.options.clone();
        let latest = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);

        debug!(%query, delay = ?self.debouncer.delay(), "Scheduling debounced search");
        self.debouncer.call(async move {
            state.send_modify(|s| s.loading = true);
            let outcome = client.search_address(&query, &options).await;

            if latest.load(Ordering::SeqCst) != generation {
                debug!(%query, "Dropping results of superseded search");
                return;
            }

            state.send_modify(|s| {
                s.loading = false;
                match outcome {
                    Ok(results) => {
                        s.results = results;
                        s.error = None;
                    },
                    Err(e) => {
                        s.results.clear();
                        s.error = Some(e.to_string());
                    },
                }
                s.query = query;
            });
        });
    }

    /// Cancel any pending search and empty the results
    ///
    /// A search already sent to the engine still completes (and fills the
    /// client's cache) but its results no longer reach this session.
    pub fn clear_results(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.debouncer.cancel();
        self.state.send_replace(SearchState::default());
    }

    /// Clear timer and pacing state, keeping the client's cache
    pub async fn reset_state(&self) {
        self.clear_results();
        self.client.reset_state().await;
    }

    /// Snapshot of the current state
    #[must_use]
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Current results
    #[must_use]
    pub fn results(&self) -> Vec<GeocodingResult> {
        self.state.borrow().results.clone()
    }

    /// Receiver notified on every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// True while a debounced search is waiting to fire
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.debouncer.has_pending()
    }
}
