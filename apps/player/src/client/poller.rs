use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{ClientInner, GameClient};

/// Handle to a running poll timer. Dropping it stops the timer.
pub(crate) struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollTask {
    /// Spawns a timer that polls immediately and then every `period`.
    ///
    /// The task holds only a weak reference to the client, so it ends on its
    /// own once every `GameClient` handle is gone.
    pub(crate) fn spawn(inner: Weak<ClientInner>, period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(inner, period, cancel.clone()));
        Self { cancel, handle }
    }

    /// Cancels the timer and any poll it started that is still in flight.
    pub(crate) fn stop(&self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(inner: Weak<ClientInner>, period: Duration, cancel: CancellationToken) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let Some(inner) = inner.upgrade() else {
            break;
        };
        let client = GameClient { inner };
        let cancel = cancel.clone();

        // Each tick runs on its own task so a slow request never delays the
        // next tick; the sequence guard in `poll_state` orders the results.
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {}
                _ = client.poll_state() => {}
            }
        });
    }

    debug!("poll timer stopped");
}
