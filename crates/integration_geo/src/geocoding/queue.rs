//! Sequential request gate for the geocoding engine
//!
//! Nominatim's usage policy forbids parallel bursts, so every engine call runs
//! while holding a single async lock. Waiters are served in FIFO order and a
//! minimum pause is kept between the end of one call and the start of the next.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Serializes outbound calls: at most one in flight at any instant
#[derive(Debug)]
pub struct RateLimitedQueue {
    last_settled: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimitedQueue {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_settled: Mutex::new(None),
            min_interval,
        }
    }

    /// Run `call` once every earlier call has settled and the pacing interval has passed
    pub async fn run<F, Fut, T>(&self, call: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if self.is_busy() {
            debug!("Waiting for in-flight geocoding request");
        }
        let mut last = self.last_settled.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval.saturating_sub(elapsed);
                debug!(?wait, "Pacing geocoding request");
                tokio::time::sleep(wait).await;
            }
        }

        let output = call().await;
        *last = Some(Instant::now());
        output
    }

    /// True while a call holds the queue
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.last_settled.try_lock().is_err()
    }

    /// Forget pacing history so the next call starts immediately
    pub async fn reset(&self) {
        *self.last_settled.lock().await = None;
    }
}
