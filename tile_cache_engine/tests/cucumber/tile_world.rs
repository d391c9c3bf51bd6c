use std::collections::HashMap;

use cucumber::World;
use log::*;
use tile_cache_engine::{
    helpers::CollectionRegistry,
    test_utils::{prepare_test_env, random_db_path},
    OrderBookManagement,
    OrderValidationApi,
    OwnershipApi,
    SqliteDatabase,
    TileManagement,
    TilePriceApi,
};

/// The people who appear in the feature files, with their (checksummed) addresses.
pub const ACCOUNTS: [(&str, &str); 3] = [
    ("Alice", "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"),
    ("Bob", "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB"),
    ("Carol", "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb"),
];

#[derive(Default, Debug, World)]
pub struct TileCacheWorld {
    pub system: Option<TileCacheSystem>,
}

#[derive(Debug)]
pub struct TileCacheSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub collection: String,
    pub contract: String,
    pub validation: OrderValidationApi<SqliteDatabase>,
    pub prices: TilePriceApi<SqliteDatabase>,
    pub ownership: OwnershipApi<SqliteDatabase>,
    pub block_height: Option<i64>,
    /// Feature-file order names to database ids
    pub orders: HashMap<String, i64>,
    /// Token ids of the tiles seeded by the scenario
    pub tokens: Vec<String>,
}

impl TileCacheWorld {
    pub fn system(&self) -> &TileCacheSystem {
        self.system.as_ref().expect("Tile cache not initialised")
    }

    pub fn system_mut(&mut self) -> &mut TileCacheSystem {
        self.system.as_mut().expect("Tile cache not initialised")
    }

    pub fn order_id(&self, name: &str) -> i64 {
        *self.system().orders.get(name).unwrap_or_else(|| panic!("No order called {name}"))
    }
}

impl TileCacheSystem {
    pub async fn new(collection: &str, contract: &str) -> Self {
        let db_path = random_db_path();
        let db = prepare_test_env(&db_path).await;
        debug!("Created database: {db_path}");
        let collections = CollectionRegistry::new().with_collection(collection, contract);
        Self {
            validation: OrderValidationApi::new(db.clone(), collections.clone()),
            prices: TilePriceApi::new(db.clone(), collections.clone()),
            ownership: OwnershipApi::new(db.clone(), collections),
            db,
            db_path,
            collection: collection.to_string(),
            contract: contract.to_string(),
            block_height: None,
            orders: HashMap::new(),
            tokens: Vec::new(),
        }
    }

    /// Logs the cached tiles and the named orders, so that a failed scenario can be diagnosed from the test output.
    pub async fn log_state(&self) {
        for token_id in &self.tokens {
            match self.db.fetch_tile(&self.collection.as_str().into(), &token_id.as_str().into()).await {
                Ok(Some(tile)) => info!(
                    "🧱️ Tile {token_id}: owner {:?}, price {:?} set by order {:?}",
                    tile.owner_address, tile.lowest_sale_price, tile.lowest_sale_price_order_id
                ),
                Ok(None) => info!("🧱️ Tile {token_id} is missing"),
                Err(e) => warn!("🧱️ Could not read tile {token_id}. {e}"),
            }
        }
        for (name, id) in &self.orders {
            match self.db.fetch_order(*id).await {
                Ok(Some(order)) => info!("📝️ Order {name} (#{id}): status {:?}", order.status),
                Ok(None) => info!("📝️ Order {name} (#{id}) is missing"),
                Err(e) => warn!("📝️ Could not read order {name} (#{id}). {e}"),
            }
        }
    }
}

pub fn address_of(name: &str) -> &'static str {
    ACCOUNTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, address)| *address)
        .unwrap_or_else(|| panic!("Unknown account {name}"))
}
