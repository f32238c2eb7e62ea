use crate::asyncable::{setter, Asyncable, AsyncValue, GetterResult};
use crate::error::{Result, StoreError};
use crate::store::{Readable, Subscriber, Subscription, Writable};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// String key-value storage.
pub trait Storage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir`, creating it if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::Storage(format!("invalid storage key {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        // Write-then-rename so readers never see a torn file.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

fn load_or<T: DeserializeOwned>(storage: &dyn Storage, key: &str, default: T) -> Result<T> {
    match storage.read(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map_err(|e| StoreError::Deserialization(format!("{key}: {e}"))),
        None => {
            debug!(key, "nothing stored yet; using default");
            Ok(default)
        }
    }
}

fn save<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    storage.write(key, &raw)?;
    debug!(key, bytes = raw.len(), "persisted");
    Ok(())
}

/// A writable store persisted as JSON under one storage key.
pub struct LocalStore<T> {
    key: String,
    storage: Arc<dyn Storage>,
    store: Writable<T>,
}

impl<T> LocalStore<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Open the store, starting from the stored value or `default`.
    pub fn open(storage: Arc<dyn Storage>, key: impl Into<String>, default: T) -> Result<Self> {
        let key = key.into();
        let initial = load_or(storage.as_ref(), &key, default)?;
        Ok(Self {
            key,
            storage,
            store: Writable::new(initial),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> T {
        self.store.peek()
    }

    /// Persist `value`, then publish it. Nothing changes if persisting fails.
    pub fn set(&self, value: T) -> Result<()> {
        save(self.storage.as_ref(), &self.key, &value)?;
        self.store.set(value);
        Ok(())
    }

    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut T),
    {
        let mut value = self.value();
        f(&mut value);
        self.set(value)
    }
}

impl<T> Readable<T> for LocalStore<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn subscribe_boxed(&self, callback: Subscriber<T>) -> Subscription {
        self.store.subscribe_boxed(callback)
    }
}

impl<T> Clone for LocalStore<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            storage: Arc::clone(&self.storage),
            store: self.store.clone(),
        }
    }
}

/// An [`Asyncable`] backed by storage.
///
/// The getter reads `key` (falling back to `default`) and the setter writes
/// it, so a failed write is rolled back in the store. Inside a Tokio runtime
/// the write runs on the blocking pool; elsewhere it runs inline.
pub fn persisted<T>(storage: Arc<dyn Storage>, key: impl Into<String>, default: T) -> Asyncable<T>
where
    T: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let key: Arc<str> = key.into().into();

    let read_storage = Arc::clone(&storage);
    let read_key = Arc::clone(&key);
    let getter = move || -> GetterResult<T> {
        let value = load_or(read_storage.as_ref(), &read_key, default.clone());
        Ok(Some(match value {
            Ok(value) => AsyncValue::ready(value),
            Err(err) => AsyncValue::failed(err),
        }))
    };

    let write = setter(move |new: T, _old: Option<T>| {
        let storage = Arc::clone(&storage);
        let key = Arc::clone(&key);
        async move {
            let written = match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let key = Arc::clone(&key);
                    handle
                        .spawn_blocking(move || save(storage.as_ref(), &key, &new))
                        .await
                        .unwrap_or_else(|err| {
                            Err(StoreError::Storage(format!("write task failed: {err}")))
                        })
                }
                Err(_) => save(storage.as_ref(), &key, &new),
            };
            written.map_err(|err| {
                warn!(key = %key, error = %err, "persisting write failed");
                StoreError::setter(err)
            })
        }
    });

    Asyncable::new(getter, Some(write))
}
