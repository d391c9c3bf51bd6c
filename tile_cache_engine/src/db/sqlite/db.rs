use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqlitePool;

use super::{balances, new_pool, nonces, orders, process_state, tiles, SqliteDatabaseError};
use crate::{
    db::traits::{
        IndexerFeed,
        OrderBookManagement,
        OwnershipManagement,
        ProcessStateManagement,
        TileCacheDatabase,
        TileManagement,
    },
    db_types::{
        CollectionId,
        NewOrderBookEntry,
        NewOwnershipBalance,
        NewTileCacheEntry,
        Nonce,
        OrderBookEntry,
        OrderStatus,
        OwnershipBalance,
        ProcessState,
        TileCacheEntry,
        TilePrice,
        TokenId,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl TileCacheDatabase for SqliteDatabase {
    type Error = SqliteDatabaseError;

    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        self.pool.close().await;
        Ok(())
    }
}

impl OrderBookManagement for SqliteDatabase {
    async fn fetch_next_stale_order(&self, stale_before: DateTime<Utc>) -> Result<Option<OrderBookEntry>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_next_stale_order(stale_before, &mut conn).await
    }

    async fn fetch_order(&self, id: i64) -> Result<Option<OrderBookEntry>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order(id, &mut conn).await
    }

    async fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<(), Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::update_order_status(id, status, &mut conn).await?;
        trace!("🗃️ Order #{id} status set to {status}");
        Ok(())
    }

    async fn mark_order_reconciled(&self, id: i64, at: DateTime<Utc>) -> Result<(), Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::mark_reconciled(id, at, &mut conn).await
    }

    async fn is_nonce_revoked(&self, nonce: &Nonce) -> Result<bool, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        nonces::is_revoked(nonce, &mut conn).await
    }
}

impl TileManagement for SqliteDatabase {
    async fn fetch_tile(
        &self,
        collection_id: &CollectionId,
        token_id: &TokenId,
    ) -> Result<Option<TileCacheEntry>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        tiles::fetch_tile(collection_id, token_id, &mut conn).await
    }

    async fn set_tile_price(
        &self,
        tile_id: i64,
        expected_setter: Option<i64>,
        price: TilePrice,
    ) -> Result<bool, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        let applied = tiles::set_price(tile_id, expected_setter, price, &mut conn).await?;
        if applied {
            trace!("🗃️ Tile #{tile_id} price set to {} by order #{}", price.price, price.order_id);
        }
        Ok(applied)
    }

    async fn clear_tile_price(&self, tile_id: i64, order_id: i64) -> Result<bool, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        tiles::clear_price(tile_id, order_id, &mut conn).await
    }

    async fn update_tile_owner(&self, tile_id: i64, owner_address: &str) -> Result<(), Self::Error> {
        let mut conn = self.pool.acquire().await?;
        tiles::update_owner(tile_id, owner_address, &mut conn).await
    }
}

impl OwnershipManagement for SqliteDatabase {
    async fn fetch_next_stale_balance(
        &self,
        stale_before: DateTime<Utc>,
    ) -> Result<Option<OwnershipBalance>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        balances::fetch_next_stale_balance(stale_before, &mut conn).await
    }

    async fn mark_balance_reconciled(&self, id: i64, at: DateTime<Utc>) -> Result<(), Self::Error> {
        let mut conn = self.pool.acquire().await?;
        balances::mark_reconciled(id, at, &mut conn).await
    }
}

impl ProcessStateManagement for SqliteDatabase {
    async fn upsert_latest_block_height(&self, height: i64) -> Result<(), Self::Error> {
        let mut conn = self.pool.acquire().await?;
        process_state::upsert_latest_block_height(height, &mut conn).await
    }

    async fn fetch_process_state(&self) -> Result<Option<ProcessState>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        process_state::fetch_process_state(&mut conn).await
    }
}

impl IndexerFeed for SqliteDatabase {
    async fn insert_order(&self, order: NewOrderBookEntry) -> Result<i64, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        let id = orders::insert_order(order, &mut conn).await?;
        debug!("🗃️ Order #{id} has been saved in the DB");
        Ok(id)
    }

    async fn upsert_balance(&self, balance: NewOwnershipBalance) -> Result<i64, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        balances::upsert_balance(balance, &mut conn).await
    }

    async fn insert_tile(&self, tile: NewTileCacheEntry) -> Result<i64, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        tiles::idempotent_insert(tile, &mut conn).await
    }

    async fn revoke_nonce(&self, nonce: &Nonce) -> Result<bool, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        nonces::revoke(nonce, &mut conn).await
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn run_migrations(&self) -> Result<(), SqliteDatabaseError> {
        sqlx::migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }
}
