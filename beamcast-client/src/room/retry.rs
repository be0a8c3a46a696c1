use crate::signaling::SignalingChannel;
use beamcast_core::SignalMessage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Viewer-side `need-offer` requester. Transmits immediately on arming,
/// then on a fixed cadence until stopped. There is no retry cap: presenter
/// arrival time is unbounded and an idle retransmission costs next to
/// nothing.
pub struct NeedOfferRetry {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl NeedOfferRetry {
    /// Spawn the retry task. Dependencies come in as parameters so the
    /// task's lifecycle is independent of any outer scope.
    pub fn arm(signaling: Arc<dyn SignalingChannel>, interval: Duration) -> Self {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        debug!("requesting offer");
                        if signaling.send(SignalMessage::NeedOffer).await.is_err() {
                            break;
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }
        });
        Self { stop_tx, task }
    }

    /// Cancel the task. Safe to call any number of times, including after
    /// the task has already finished.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }
}

impl Drop for NeedOfferRetry {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(true);
        self.task.abort();
    }
}
