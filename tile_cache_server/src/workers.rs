//! Background workers. Each one is a spawned task that runs until the shutdown signal fires. Await the returned
//! handles only after sending the signal.
use std::time::Duration;

use log::*;
use tile_cache_engine::{
    helpers::CollectionRegistry,
    ledger::{BlockHeightWatch, JsonRpcLedgerClient, LedgerSnapshotTracker},
    scheduler::{OrderBookPass, OwnershipPass, SchedulerConfig, SchedulerStats, StalenessScheduler},
    SqliteDatabase,
};
use tokio::{sync::watch, task::JoinHandle};

pub fn start_block_height_worker(
    tracker: LedgerSnapshotTracker<JsonRpcLedgerClient, SqliteDatabase>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(tracker.run(interval, shutdown))
}

pub fn start_order_book_worker(
    db: SqliteDatabase,
    collections: CollectionRegistry,
    block_height: BlockHeightWatch,
    config: SchedulerConfig,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<SchedulerStats> {
    let pass = OrderBookPass::new(db, collections, block_height, config);
    info!("📝️ Order book worker starting. Staleness window: {}s", config.staleness_window.as_secs());
    tokio::spawn(StalenessScheduler::new(pass, config).run(shutdown))
}

pub fn start_ownership_worker(
    db: SqliteDatabase,
    collections: CollectionRegistry,
    config: SchedulerConfig,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<SchedulerStats> {
    let pass = OwnershipPass::new(db, collections, config);
    info!("🪪️ Ownership worker starting. Staleness window: {}s", config.staleness_window.as_secs());
    tokio::spawn(StalenessScheduler::new(pass, config).run(shutdown))
}
