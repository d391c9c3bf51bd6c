mod setups;
mod steps;
mod tile_world;

pub use tile_world::TileCacheWorld;
