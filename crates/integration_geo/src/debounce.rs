//! Cancellable delayed tasks and a debouncer built on them

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

/// Handle to work scheduled to run after a delay
///
/// Cancelling only stops work that has not started yet. Once the delay has
/// elapsed the work runs to completion. Dropping the handle cancels too.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
    cancel: oneshot::Sender<()>,
}

impl ScheduledTask {
    /// Spawn `work` to run once `delay` has elapsed
    pub fn schedule<F>(delay: Duration, work: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (cancel, mut cancelled) = oneshot::channel();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = &mut cancelled => return,
                () = tokio::time::sleep(delay) => {},
            }
            work.await;
        });
        Self { handle, cancel }
    }

    /// Prevent the work from starting; work already running is left alone
    pub fn cancel(self) {
        // Nobody listens any more once the delay has elapsed
        let _ = self.cancel.send(());
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Runs only the most recent of a burst of calls
///
/// Each call replaces the pending task and cancels the previous one.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<ScheduledTask>>,
}

impl Debouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `work`, cancelling whatever was pending
    pub fn call<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let task = ScheduledTask::schedule(self.delay, work);
        if let Some(previous) = self.pending.lock().replace(task) {
            previous.cancel();
            debug!("Replaced pending debounced call");
        }
    }

    /// Cancel the pending task, if any
    pub fn cancel(&self) {
        if let Some(task) = self.pending.lock().take() {
            task.cancel();
            debug!("Cancelled pending debounced call");
        }
    }

    /// True if a scheduled task has not completed yet
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}
