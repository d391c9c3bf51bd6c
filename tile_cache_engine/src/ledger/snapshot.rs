use std::time::Duration;

use log::*;
use tokio::{
    sync::watch,
    time::{interval, MissedTickBehavior},
};

use super::LedgerClient;
use crate::db::traits::ProcessStateManagement;

/// A read-only view of the latest block height known to this process. `None` until the first successful refresh (or a
/// restore from the process state record).
#[derive(Clone, Debug)]
pub struct BlockHeightWatch {
    receiver: watch::Receiver<Option<i64>>,
}

impl BlockHeightWatch {
    /// Copies the current snapshot out of the watch. The value is immutable once read.
    pub fn current(&self) -> Option<i64> {
        *self.receiver.borrow()
    }

    /// A watch that never changes. Handy for tests and for driving reconcilers by hand.
    pub fn fixed(height: Option<i64>) -> Self {
        let (sender, receiver) = watch::channel(height);
        // The receiver keeps returning the last value after the sender is gone.
        drop(sender);
        Self { receiver }
    }
}

/// Owns the process-wide block-height snapshot.
pub struct LedgerSnapshotTracker<L, B> {
    ledger: L,
    db: B,
    sender: watch::Sender<Option<i64>>,
}

impl<L, B> LedgerSnapshotTracker<L, B>
where
    L: LedgerClient,
    B: ProcessStateManagement,
{
    pub fn new(ledger: L, db: B) -> Self {
        let (sender, _) = watch::channel(None);
        Self { ledger, db, sender }
    }

    pub fn watch(&self) -> BlockHeightWatch {
        BlockHeightWatch { receiver: self.sender.subscribe() }
    }

    pub fn current(&self) -> Option<i64> {
        *self.sender.borrow()
    }

    /// Seeds the snapshot from the persisted process state, if no height has been published yet. This lets a restarted
    /// process validate orders before the ledger node answers.
    pub async fn restore(&self) -> Option<i64> {
        if let Some(height) = self.current() {
            return Some(height);
        }
        match self.db.fetch_process_state().await {
            Ok(Some(state)) => {
                info!("🕰️ Restored block height {} (recorded at {})", state.latest_block_height, state.updated_at);
                self.sender.send_replace(Some(state.latest_block_height));
                Some(state.latest_block_height)
            },
            Ok(None) => {
                debug!("🕰️ No block height has been recorded yet");
                None
            },
            Err(e) => {
                warn!("🕰️ Could not read the persisted block height. {e}");
                None
            },
        }
    }

    /// Fetches the current block height from the ledger, publishes it and persists it. On failure the previous value
    /// stays in place and the failure is logged. Returns the height that was published, if any.
    pub async fn refresh(&self) -> Option<i64> {
        let height = match self.ledger.block_height().await {
            Ok(h) => h,
            Err(e) => {
                warn!("🕰️ Could not fetch the block height from the ledger. The previous value will be kept. {e}");
                return None;
            },
        };
        self.sender.send_replace(Some(height));
        trace!("🕰️ Block height is now {height}");
        if let Err(e) = self.db.upsert_latest_block_height(height).await {
            warn!("🕰️ Block height {height} could not be persisted. {e}");
        }
        Some(height)
    }

    /// Refreshes the snapshot every `period` until `shutdown` flips to `true` or its sender is dropped. A failed refresh
    /// is simply retried on the next tick.
    pub async fn run(self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("🕰️ Block height tracker started. Refreshing every {}s", period.as_secs_f64());
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = timer.tick() => {
                    self.refresh().await;
                },
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                },
            }
        }
        info!("🕰️ Block height tracker stopped");
    }
}
