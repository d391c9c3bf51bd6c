//! #  Storage interfaces for the tile cache.
//!
//! The reconcilers never talk to a database driver directly. They are written against the traits in this module, and
//! a backend (currently only SQLite) implements them.
//!
//! * [`TileCacheDatabase`] is the super-trait every backend implements. It carries the error type and connection
//!   lifecycle.
//! * [`OrderBookManagement`] selects stale order-book entries and records their validated status.
//! * [`TileManagement`] reads tiles and performs the single-record price and owner writes.
//! * [`OwnershipManagement`] selects stale ownership balances.
//! * [`ProcessStateManagement`] persists the shared block-height snapshot.
//! * [`IndexerFeed`] is the write surface of the *external* writers (order-book ingestion, the ledger indexer and the
//!   tile seeding job). The reconciliation engine never calls it, but tools and tests use it to populate a store.
//!
//! None of the methods span more than one record. The reconciliation protocol is designed to converge without
//! multi-record transactions.
mod indexer_feed;
mod order_book_management;
mod ownership_management;
mod process_state_management;
mod tile_cache_database;
mod tile_management;

pub use indexer_feed::IndexerFeed;
pub use order_book_management::OrderBookManagement;
pub use ownership_management::OwnershipManagement;
pub use process_state_management::ProcessStateManagement;
pub use tile_cache_database::TileCacheDatabase;
pub use tile_management::TileManagement;
