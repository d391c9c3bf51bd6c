//! # Tile cache reconciliation API
//!
//! Each API is created by supplying a database backend that implements the storage traits it needs, plus the
//! [`CollectionRegistry`](crate::helpers::CollectionRegistry) that maps contract addresses to collection ids.
//!
//! * [`order_validation_api`] derives an order's status from the block height, the tile owner and the revoked nonces.
//! * [`tile_price_api`] keeps each tile's lowest sale price consistent with the orders that have been validated.
//! * [`ownership_api`] propagates balance records to tile owners.
//!
//! ```rust,ignore
//! use tile_cache_engine::{helpers::CollectionRegistry, OrderValidationApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/tile_cache.db", 5).await?;
//! let collections = CollectionRegistry::parse("tiles=0x3a0b60a4fa4e2f3e2b0cbe5e3d7b2fd1c2a0e6f1")?;
//! let api = OrderValidationApi::new(db, collections);
//! let outcome = api.validate_order(&order, Some(18_000_000)).await?;
//! ```
pub mod errors;
pub mod order_validation_api;
pub mod ownership_api;
pub mod tile_price_api;
