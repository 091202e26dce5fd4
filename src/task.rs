//! Cancellable repeating task.
//!
//! [`ScheduledTask::spawn`] runs a [`Tick`] job on a fixed cadence in a
//! tokio task. Ticks never overlap: the next wait starts only after the
//! current tick finishes, and a tick that overruns the period delays the
//! schedule instead of queueing a burst of catch-up ticks.
//!
//! Stopping is cooperative. Cancellation is observed both while waiting and
//! while a tick is running; a running tick's future is dropped, so nothing it
//! would have done after its pending `.await` ever happens.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A job run once per period by a [`ScheduledTask`].
pub trait Tick: Send + 'static {
    /// Run one tick.
    fn tick(&mut self) -> impl Future<Output = ()> + Send;

    /// Called on the task once the loop has exited.
    fn stopped(&mut self) {}
}

/// Handle to a running repeating task.
///
/// Dropping the handle stops the task.
#[derive(Debug)]
pub struct ScheduledTask {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// Spawn `job` on the current runtime, first ticking one `period` from now.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero or if called outside a tokio runtime.
    pub fn spawn<T: Tick>(period: Duration, mut job: T) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = job.tick() => {}
                }
            }

            job.stopped();
            debug!("scheduled task stopped");
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Stop the task. Later ticks never start. Calling this again is a no-op.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop the task and wait for its loop to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "scheduled task ended abnormally");
            }
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
