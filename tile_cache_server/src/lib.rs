//! # Tile cache server
//! This crate hosts the daemon that keeps the tile cache reconciled. It is responsible for:
//! * Refreshing the block-height snapshot from a ledger node on a fixed interval.
//! * Running the order-book reconciliation loop, which validates orders and maintains tile prices.
//! * Running the ownership reconciliation loop, which propagates ownership balances to tile owners.
//!
//! The server exposes no network API. Everything it does is visible in the shared store and in the logs.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
pub mod cli;
pub mod config;
pub mod errors;
pub mod server;
pub mod workers;
