use cucumber::given;
use tile_cache_engine::{db_types::NewTileCacheEntry, IndexerFeed};

use crate::cucumber::{
    tile_world::{address_of, TileCacheSystem},
    TileCacheWorld,
};

#[given(expr = "a fresh tile cache tracking collection {word} at {word}")]
async fn fresh_database(world: &mut TileCacheWorld, collection: String, contract: String) {
    let system = TileCacheSystem::new(&collection, &contract).await;
    world.system = Some(system);
}

#[given(expr = "tile {word} owned by {word}")]
async fn tile_with_owner(world: &mut TileCacheWorld, token_id: String, owner: String) {
    let sys = world.system_mut();
    let tile = NewTileCacheEntry::new(&sys.collection, &token_id).with_owner(address_of(&owner));
    sys.db.insert_tile(tile).await.expect("Error inserting tile");
    sys.tokens.push(token_id);
}

#[given(expr = "tile {word} with no known owner")]
async fn tile_without_owner(world: &mut TileCacheWorld, token_id: String) {
    let sys = world.system_mut();
    sys.db.insert_tile(NewTileCacheEntry::new(&sys.collection, &token_id)).await.expect("Error inserting tile");
    sys.tokens.push(token_id);
}

#[given(expr = "the block height is {int}")]
async fn block_height(world: &mut TileCacheWorld, height: i64) {
    world.system_mut().block_height = Some(height);
}

#[given("the block height is unknown")]
async fn no_block_height(world: &mut TileCacheWorld) {
    world.system_mut().block_height = None;
}
