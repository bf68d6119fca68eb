//! Common test utilities shared across integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chaingain_core::storage::{MemoryStore, PersistentStore, StorageResult};
use chaingain_core::{ChainGain, ClientConfig};

/// A [`MemoryStore`] that counts writes.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl PersistentStore for CountingStore {
    fn get(&self, key: String) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(
        &self,
        key: String,
        value: String,
        expires_in: Option<Duration>,
    ) -> StorageResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, expires_in)
    }

    fn remove(&self, key: String) -> StorageResult<()> {
        self.inner.remove(key)
    }
}

pub fn client(url: &str, store: Arc<CountingStore>) -> ChainGain {
    let config = ClientConfig::default()
        .with_base_url(url)
        .with_allow_insecure(true);
    ChainGain::new(config, store).expect("valid config")
}
