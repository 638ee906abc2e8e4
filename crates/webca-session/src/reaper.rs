//! Background eviction of idle sessions.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::registry::SessionRegistry;

/// Shortest interval between sweeps; zero intervals are raised to this.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Periodic sweep task over a [`SessionRegistry`].
///
/// The first sweep runs one full interval after spawning. The task runs
/// until its token is cancelled.
pub struct Reaper {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Reaper {
    /// Spawn a reaper on the current tokio runtime.
    ///
    /// A zero `interval` is raised to [`MIN_SWEEP_INTERVAL`].
    pub fn spawn(registry: SessionRegistry, interval: Duration, token: CancellationToken) -> Self {
        let interval = if interval.is_zero() {
            warn!(
                min_secs = MIN_SWEEP_INTERVAL.as_secs_f64(),
                "Zero sweep interval, using minimum"
            );
            MIN_SWEEP_INTERVAL
        } else {
            interval
        };
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(interval_secs = interval.as_secs_f64(), "Session reaper started");
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => {
                        debug!("Session reaper cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        registry.sweep().await;
                    }
                }
            }
        });

        Self { token, handle }
    }

    /// Token that stops the reaper when cancelled.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Whether the reaper task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the reaper and wait for it to exit.
    ///
    /// A panic inside the task (a stored record without a last-used stamp)
    /// is re-raised here. Under `panic = "abort"`, as in the release profile,
    /// such a panic aborts the process before this can run.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await
            && e.is_panic()
        {
            std::panic::resume_unwind(e.into_panic());
        }
    }
}

impl SessionRegistry {
    /// Spawn a [`Reaper`] using the configured cleanup interval.
    pub fn spawn_reaper(&self, token: CancellationToken) -> Reaper {
        Reaper::spawn(self.clone(), self.config().cleanup_interval, token)
    }
}
