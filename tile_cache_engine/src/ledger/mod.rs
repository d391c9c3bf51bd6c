//! # Ledger state
//!
//! The reconcilers need exactly one live fact from the ledger: the current block height. Ownership balances and nonce
//! revocations arrive through the indexer feed and are read from the store.
//!
//! * [`LedgerClient`] is the interface to a ledger node. [`JsonRpcLedgerClient`] implements it over JSON-RPC.
//! * [`LedgerSnapshotTracker`] owns the block-height snapshot. It refreshes it on an interval, persists it to the
//!   process state record and publishes it to [`BlockHeightWatch`] readers. Each validation pass copies one immutable
//!   value out of the watch.
mod client;
mod errors;
mod snapshot;

pub use client::{JsonRpcLedgerClient, LedgerClient};
pub use errors::LedgerClientError;
pub use snapshot::{BlockHeightWatch, LedgerSnapshotTracker};
