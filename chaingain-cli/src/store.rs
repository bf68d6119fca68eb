//! On-disk [`PersistentStore`] backed by a single JSON file.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chaingain_core::storage::{PersistentStore, StorageError, StorageResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    value: String,
    /// Unix time in milliseconds after which the entry is gone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at_ms: Option<u64>,
}

impl Entry {
    fn is_live(&self, now: u64) -> bool {
        self.expires_at_ms.is_none_or(|deadline| now < deadline)
    }
}

type Entries = BTreeMap<String, Entry>;

/// Key-value store persisted as a JSON object.
///
/// Every write replaces the whole file through a temporary sibling and a
/// rename, so a crash never leaves a half-written store behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Creates a store backed by the file at `path`; nothing is read yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StorageResult<Entries> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(err) => {
                return Err(StorageError::Read(format!(
                    "{}: {err}",
                    self.path.display()
                )))
            }
        };
        serde_json::from_str(&contents).map_err(|err| {
            StorageError::Serialization(format!("{}: {err}", self.path.display()))
        })
    }

    fn save(&self, entries: &Entries) -> StorageResult<()> {
        let write_err = |err: std::io::Error| {
            StorageError::Write(format!("{}: {err}", self.path.display()))
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)
    }

    fn guard(&self) -> StorageResult<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| StorageError::Lock("file store mutex poisoned".to_string()))
    }
}

fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, saturating_millis)
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl PersistentStore for FileStore {
    fn get(&self, key: String) -> StorageResult<Option<String>> {
        let _guard = self.guard()?;
        let entries = self.load()?;
        Ok(entries
            .get(&key)
            .filter(|entry| entry.is_live(unix_now_ms()))
            .map(|entry| entry.value.clone()))
    }

    fn set(
        &self,
        key: String,
        value: String,
        expires_in: Option<Duration>,
    ) -> StorageResult<()> {
        let _guard = self.guard()?;
        let mut entries = self.load()?;
        let now = unix_now_ms();
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key,
            Entry {
                value,
                expires_at_ms: expires_in.map(|ttl| now.saturating_add(saturating_millis(ttl))),
            },
        );
        self.save(&entries)
    }

    fn remove(&self, key: String) -> StorageResult<()> {
        let _guard = self.guard()?;
        let mut entries = self.load()?;
        if entries.remove(&key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}
