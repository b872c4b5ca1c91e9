//! Key-value durable storage backing the session and favorites managers.
//!
//! Values are whole JSON documents. A `set` always replaces the previous value
//! in one step, so readers never observe a half-written entry.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::StoreError;

pub const USER_KEY: &str = "user";
pub const FAVORITES_KEY: &str = "favorites";

pub trait DurableStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read and decode a JSON value. A missing key is `Ok(None)`; a value that
/// does not decode is a `StoreError::Serialization`.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn DurableStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn DurableStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        lock(&self.entries)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }
}

#[cfg(feature = "native")]
pub use file::FileStore;

#[cfg(feature = "native")]
mod file {
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::{Path, PathBuf};

    use tracing::{debug, warn};

    use super::*;

    /// All keys live in one JSON object on disk. Every write rewrites the
    /// file through a temporary sibling and a rename.
    #[derive(Debug)]
    pub struct FileStore {
        path: PathBuf,
        entries: Mutex<BTreeMap<String, String>>,
    }

    impl FileStore {
        /// Opens (or lazily creates) the store at `path`. An unreadable or
        /// corrupt file is logged and replaced by an empty store on the next
        /// write.
        pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
            let path = path.as_ref().to_path_buf();
            let entries = match fs::read_to_string(&path) {
                Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                    Ok(entries) => entries,
                    Err(e) => {
                        warn!("Discarding corrupt store file {}: {}", path.display(), e);
                        BTreeMap::new()
                    }
                },
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("No store file at {}, starting empty", path.display());
                    BTreeMap::new()
                }
                Err(e) => return Err(e.into()),
            };

            Ok(Self {
                path,
                entries: Mutex::new(entries),
            })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let tmp = self.path.with_extension("tmp");
            fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
            fs::rename(&tmp, &self.path)?;
            Ok(())
        }
    }

    impl DurableStore for FileStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            Ok(lock(&self.entries)?.get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            let mut entries = lock(&self.entries)?;
            let mut next = entries.clone();
            next.insert(key.to_string(), value.to_string());
            self.flush(&next)?;
            *entries = next;
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            let mut entries = lock(&self.entries)?;
            if !entries.contains_key(key) {
                return Ok(());
            }
            let mut next = entries.clone();
            next.remove(key);
            self.flush(&next)?;
            *entries = next;
            Ok(())
        }
    }
}

#[cfg(feature = "hydrate")]
pub use browser::LocalStorageStore;

#[cfg(feature = "hydrate")]
mod browser {
    use wasm_bindgen::JsValue;

    use super::*;

    /// `window.localStorage`. The handle is looked up per call so the store
    /// itself holds no JS values.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct LocalStorageStore;

    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .ok_or_else(|| StoreError::Unavailable("no window".to_string()))?
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| StoreError::Unavailable("localStorage disabled".to_string()))
    }

    fn js_error(value: JsValue) -> StoreError {
        StoreError::Unavailable(format!("{:?}", value))
    }

    impl DurableStore for LocalStorageStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            storage()?.get_item(key).map_err(js_error)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            storage()?.set_item(key, value).map_err(js_error)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            storage()?.remove_item(key).map_err(js_error)
        }
    }
}

/// Opens the store named by the configuration.
#[cfg(feature = "native")]
pub fn open_store(
    config: &crate::config::AppConfig,
) -> Result<std::sync::Arc<dyn DurableStore>, StoreError> {
    let store = FileStore::open(&config.store_path)?;
    tracing::info!("Durable store opened at {}", store.path().display());
    Ok(std::sync::Arc::new(store))
}
