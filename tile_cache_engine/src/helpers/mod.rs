mod address;
mod collections;

pub use address::{same_address, to_checksum_address};
pub use collections::{CollectionRegistry, CollectionRegistryError};
