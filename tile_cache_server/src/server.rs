use std::future::Future;

use log::*;
use tile_cache_engine::{
    ledger::{JsonRpcLedgerClient, LedgerSnapshotTracker},
    SqliteDatabase,
    TileCacheDatabase,
};
use tokio::sync::watch;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    workers::{start_block_height_worker, start_order_book_worker, start_ownership_worker},
};

/// Starts the reconciliation workers and runs until Ctrl-C is received. The workers are then asked to stop, and each
/// is allowed to finish the pass it is in.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    run_server_until(config, tokio::signal::ctrl_c()).await
}

/// As [`run_server`], but stops when `signal` resolves. The workers are stopped and the database closed even when
/// `signal` fails; its error is returned afterwards.
pub async fn run_server_until<F>(config: ServerConfig, signal: F) -> Result<(), ServerError>
where F: Future<Output = std::io::Result<()>> {
    config.validate()?;
    let mut db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections).await?;
    db.run_migrations().await?;
    for (collection, contract) in config.collections.collections() {
        info!("🚀️ Tracking collection {collection} at {contract}");
    }

    let ledger = JsonRpcLedgerClient::new(config.ledger_rpc_url.clone(), config.ledger_timeout)?;
    let tracker = LedgerSnapshotTracker::new(ledger, db.clone());
    let block_height = tracker.watch();
    tracker.restore().await;
    match tracker.refresh().await {
        Some(height) => info!("🚀️ Current block height is {height}"),
        None => warn!("🚀️ The ledger is not reachable yet. Orders will be validated once a block height is known."),
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let tracker_handle = start_block_height_worker(tracker, config.block_height_interval, shutdown_rx.clone());
    let order_handle = config.poll_orders.then(|| {
        start_order_book_worker(
            db.clone(),
            config.collections.clone(),
            block_height.clone(),
            config.scheduler,
            shutdown_rx.clone(),
        )
    });
    if order_handle.is_none() {
        info!("🚀️ Order book polling is disabled");
    }
    let balance_handle = config.poll_balances.then(|| {
        start_ownership_worker(db.clone(), config.collections.clone(), config.scheduler, shutdown_rx.clone())
    });
    if balance_handle.is_none() {
        info!("🚀️ Balance polling is disabled");
    }

    let signal = signal.await;
    match &signal {
        Ok(()) => info!("🚀️ Shutdown requested. Waiting for the workers to finish their current pass."),
        Err(e) => error!("🚀️ Could not listen for the shutdown signal. {e}. Stopping the workers."),
    }
    // The receivers also stop when the sender is dropped, so a failed send needs no handling.
    let _ = shutdown_tx.send(true);
    for (name, handle) in [("order book", order_handle), ("ownership", balance_handle)] {
        if let Some(handle) = handle {
            match handle.await {
                Ok(stats) => info!("🚀️ The {name} worker processed {} records", stats.processed),
                Err(e) => error!("🚀️ The {name} worker did not shut down cleanly. {e}"),
            }
        }
    }
    if let Err(e) = tracker_handle.await {
        error!("🚀️ The block height worker did not shut down cleanly. {e}");
    }
    db.close().await?;
    signal?;
    Ok(())
}
