//! Platform interface for persisting identity fields.

use std::time::Duration;

use super::error::StorageResult;

/// Key-value store with optional per-entry expiry.
///
/// Hosts supply this (cookies, keychain-backed preferences, a JSON file...).
/// Entries whose expiry has passed must behave exactly like missing entries.
#[cfg_attr(feature = "ffi", uniffi::export(with_foreign))]
pub trait PersistentStore: Send + Sync {
    /// Reads the value stored under `key`, if present and not expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get(&self, key: String) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// With `expires_in` set, the entry disappears once that much time has
    /// elapsed; `None` keeps it until removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set(
        &self,
        key: String,
        value: String,
        expires_in: Option<Duration>,
    ) -> StorageResult<()>;

    /// Removes the entry under `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn remove(&self, key: String) -> StorageResult<()>;
}
