//! Store key handling and frame encryption.

mod frame;
mod keys;

pub use frame::{open, seal, NONCE_LEN};
pub use keys::{EnvKey, KeyProvider, StaticKey, StoreKey, SwappableKey};
