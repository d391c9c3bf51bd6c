use super::TileCacheDatabase;
use crate::db_types::{NewOrderBookEntry, NewOwnershipBalance, NewTileCacheEntry, Nonce};

/// The write surface used by the systems that *feed* the tile cache: the order-book writer, the ledger indexer and
/// the tile seeding job.
#[allow(async_fn_in_trait)]
pub trait IndexerFeed: TileCacheDatabase {
    /// Inserts a new order-book entry. It starts out unvalidated and never reconciled. Returns the new order id.
    async fn insert_order(&self, order: NewOrderBookEntry) -> Result<i64, Self::Error>;

    /// Creates or replaces the balance for the (contract, account) pair. Replacing a balance's token set makes it
    /// stale again. Returns the balance id.
    async fn upsert_balance(&self, balance: NewOwnershipBalance) -> Result<i64, Self::Error>;

    /// Inserts a tile for (collection, token). If one already exists, its id is returned and nothing is changed.
    async fn insert_tile(&self, tile: NewTileCacheEntry) -> Result<i64, Self::Error>;

    /// Records a nonce revocation. Returns false if the nonce was already revoked.
    async fn revoke_nonce(&self, nonce: &Nonce) -> Result<bool, Self::Error>;
}
