mod helpers;
mod secret;
mod wei;

pub use helpers::parse_boolean_flag;
pub use secret::Secret;
pub use wei::{WeiAmount, WeiConversionError};
