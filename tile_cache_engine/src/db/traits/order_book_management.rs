use chrono::{DateTime, Utc};

use super::TileCacheDatabase;
use crate::db_types::{Nonce, OrderBookEntry, OrderStatus};

/// The `OrderBookManagement` trait defines the behaviour for reading order-book entries and recording the results of
/// validating them.
#[allow(async_fn_in_trait)]
pub trait OrderBookManagement: TileCacheDatabase {
    /// Fetches one order that has never been reconciled, or was last reconciled before `stale_before`.
    ///
    /// Never-reconciled orders are returned first, then the stalest.
    async fn fetch_next_stale_order(&self, stale_before: DateTime<Utc>) -> Result<Option<OrderBookEntry>, Self::Error>;

    async fn fetch_order(&self, id: i64) -> Result<Option<OrderBookEntry>, Self::Error>;

    /// Overwrites the status of the order. Nothing else about the order is changed.
    async fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<(), Self::Error>;

    /// Sets the order's `last_reconciled_at` field.
    async fn mark_order_reconciled(&self, id: i64, at: DateTime<Utc>) -> Result<(), Self::Error>;

    /// Returns true if the ledger indexer has recorded a revocation for `nonce`.
    async fn is_nonce_revoked(&self, nonce: &Nonce) -> Result<bool, Self::Error>;
}
