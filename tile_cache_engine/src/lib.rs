//! Tile Cache Engine
//!
//! The tile cache is a denormalized, queryable view of an NFT marketplace: one entry per token, recording who owns it
//! and the cheapest valid sale offer for it. This library keeps that view consistent with two upstream sources. One is
//! the order book of signed buy and sell offers. The other is ledger state: the block height, ownership balances and
//! revoked nonces.
//!
//! The library is divided into four sections:
//! 1. Storage ([`mod@db`]). The reconcilers are written against the traits in [`db::traits`]. SQLite is the supported
//!    backend. The data types that flow through the traits live in [`db_types`] and are public.
//! 2. Ledger state ([`ledger`]). The block-height snapshot, and the client used to refresh it.
//! 3. Reconciliation ([`mod@tcm_api`]). Order validation, tile price aggregation and ownership propagation. Each API
//!    handles exactly one record per call.
//! 4. Scheduling ([`scheduler`]). Long-running loops that pick the stalest record and hand it to the reconcilers.
//!
//! Writing to the order book, the balance records and the nonce list is the business of external indexers. The
//! [`IndexerFeed`] trait exists so that those records can be seeded in tests and tooling.
mod db;

pub mod db_types;
pub mod helpers;
pub mod ledger;
pub mod scheduler;
mod tcm_api;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{SqliteDatabase, SqliteDatabaseError};
pub use db::traits::{
    IndexerFeed,
    OrderBookManagement,
    OwnershipManagement,
    ProcessStateManagement,
    TileCacheDatabase,
    TileManagement,
};
pub use tcm_api::{
    errors::ReconcileError,
    order_validation_api::{compute_order_status, OrderValidationApi, ValidationOutcome},
    ownership_api::{BalanceOutcome, OwnershipApi},
    tile_price_api::{decide_price_update, PriceDecision, PriceOutcome, TilePriceApi},
};
