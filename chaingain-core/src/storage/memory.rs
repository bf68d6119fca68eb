//! In-process store, used by tests and by hosts without durable storage.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::error::{StorageError, StorageResult};
use super::traits::PersistentStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

/// A [`PersistentStore`] that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> StorageResult<std::sync::MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Lock("mutex poisoned".to_string()))
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: String) -> StorageResult<Option<String>> {
        let now = Instant::now();
        let mut entries = self.lock()?;
        match entries.get(&key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(&key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(
        &self,
        key: String,
        value: String,
        expires_in: Option<Duration>,
    ) -> StorageResult<()> {
        // A deadline past what `Instant` can represent never arrives.
        let expires_at = expires_in.and_then(|ttl| Instant::now().checked_add(ttl));
        self.lock()?.insert(key, Entry { value, expires_at });
        Ok(())
    }

    fn remove(&self, key: String) -> StorageResult<()> {
        self.lock()?.remove(&key);
        Ok(())
    }
}
