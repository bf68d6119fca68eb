//! Persistent store interface and the identity keys kept in it.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use traits::PersistentStore;

/// Store key holding the provisioned account id.
pub const ACCOUNT_ID_KEY: &str = "accId";

/// Store key holding the provisioned account's public key.
pub const PUBLIC_KEY_KEY: &str = "pubKey";
