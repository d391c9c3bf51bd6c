use cucumber::{then, when};
use tile_cache_engine::{
    db_types::{NewOrderBookEntry, NewOwnershipBalance, OrderStatus, TileCacheEntry, WeiAmount},
    IndexerFeed,
    OrderBookManagement,
    OwnershipManagement,
    TileManagement,
};

use crate::cucumber::{tile_world::address_of, TileCacheWorld};

async fn add_order(world: &mut TileCacheWorld, name: String, order: NewOrderBookEntry) {
    let id = world.system().db.insert_order(order).await.expect("Error inserting order");
    world.system_mut().orders.insert(name, id);
}

#[when(expr = "{word} lists tile {word} for {int} wei until block {int} as order {word}")]
async fn list_tile(world: &mut TileCacheWorld, seller: String, token_id: String, price: u64, expiry: i64, name: String) {
    let contract = world.system().contract.clone();
    let order = NewOrderBookEntry::sell(&contract, &token_id, address_of(&seller), WeiAmount::from(price), expiry)
        .with_nonce(format!("nonce-{name}"));
    add_order(world, name, order).await;
}

#[when(expr = "{word} bids {int} wei on tile {word} until block {int} as order {word}")]
async fn bid_on_tile(world: &mut TileCacheWorld, buyer: String, price: u64, token_id: String, expiry: i64, name: String) {
    let contract = world.system().contract.clone();
    let order = NewOrderBookEntry::buy(&contract, &token_id, address_of(&buyer), WeiAmount::from(price), expiry)
        .with_nonce(format!("nonce-{name}"));
    add_order(world, name, order).await;
}

#[when(expr = "the nonce of order {word} is revoked")]
async fn revoke_nonce(world: &mut TileCacheWorld, name: String) {
    let id = world.order_id(&name);
    let db = &world.system().db;
    let order = db.fetch_order(id).await.expect("Error fetching order").expect("Order not found");
    db.revoke_nonce(&order.nonce).await.expect("Error revoking nonce");
}

#[when(expr = "the block height moves to {int}")]
async fn move_block_height(world: &mut TileCacheWorld, height: i64) {
    world.system_mut().block_height = Some(height);
}

#[when(expr = "order {word} is reconciled")]
async fn reconcile_order(world: &mut TileCacheWorld, name: String) {
    let id = world.order_id(&name);
    let sys = world.system();
    let order = sys.db.fetch_order(id).await.expect("Error fetching order").expect("Order not found");
    sys.validation.validate_order(&order, sys.block_height).await.expect("Error validating order");
    let order = sys.db.fetch_order(id).await.expect("Error fetching order").expect("Order not found");
    sys.prices.reconcile_order(&order).await.expect("Error reconciling price");
}

#[when(expr = "the indexer reports that {word} holds tiles {string}")]
async fn report_balance(world: &mut TileCacheWorld, owner: String, tokens: String) {
    let sys = world.system();
    let token_ids = tokens.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    let balance = NewOwnershipBalance::new(&sys.contract, address_of(&owner), token_ids);
    sys.db.upsert_balance(balance).await.expect("Error upserting balance");
}

#[when("the next stale balance is reconciled")]
async fn reconcile_balance(world: &mut TileCacheWorld) {
    let sys = world.system();
    let balance = sys
        .db
        .fetch_next_stale_balance(chrono::Utc::now())
        .await
        .expect("Error fetching balance")
        .expect("No stale balance");
    sys.ownership.reconcile_balance(&balance).await.expect("Error reconciling balance");
    sys.db.mark_balance_reconciled(balance.id, chrono::Utc::now()).await.expect("Error marking balance");
}

async fn fetch_tile(world: &TileCacheWorld, token_id: &str) -> TileCacheEntry {
    let sys = world.system();
    sys.db
        .fetch_tile(&sys.collection.as_str().into(), &token_id.into())
        .await
        .expect("Error fetching tile")
        .expect("Tile not found")
}

#[then(expr = "order {word} has status {word}")]
async fn order_status(world: &mut TileCacheWorld, name: String, status: String) {
    let id = world.order_id(&name);
    let order = world.system().db.fetch_order(id).await.expect("Error fetching order").expect("Order not found");
    let expected = status.parse::<OrderStatus>().expect("Unknown order status");
    assert_eq!(order.status, Some(expected));
}

#[then(expr = "order {word} has not been validated")]
async fn order_not_validated(world: &mut TileCacheWorld, name: String) {
    let id = world.order_id(&name);
    let order = world.system().db.fetch_order(id).await.expect("Error fetching order").expect("Order not found");
    assert_eq!(order.status, None);
}

#[then(expr = "tile {word} is priced at {int} wei by order {word}")]
async fn tile_price(world: &mut TileCacheWorld, token_id: String, price: u64, name: String) {
    let id = world.order_id(&name);
    let tile = fetch_tile(world, &token_id).await;
    let current = tile.current_price().expect("Tile has no price");
    assert_eq!(current.price, WeiAmount::from(price));
    assert_eq!(current.order_id, id);
    #[allow(clippy::cast_precision_loss)]
    let expected_key = -(price as f64);
    assert_eq!(tile.price_sort_key, Some(expected_key));
}

#[then(expr = "tile {word} has no price")]
async fn tile_has_no_price(world: &mut TileCacheWorld, token_id: String) {
    let tile = fetch_tile(world, &token_id).await;
    assert_eq!(tile.lowest_sale_price, None);
    assert_eq!(tile.lowest_sale_price_order_id, None);
    assert_eq!(tile.price_sort_key, None);
}

#[then(expr = "tile {word} is owned by {word}")]
async fn tile_owner(world: &mut TileCacheWorld, token_id: String, owner: String) {
    let tile = fetch_tile(world, &token_id).await;
    assert_eq!(tile.owner_address.as_deref(), Some(address_of(&owner)));
}
