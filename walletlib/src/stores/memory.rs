//! Хранилище в памяти: коллекции лежат как JSON-строки, как в localStorage.

use crate::{
    error::{Result, WalletError},
    traits::{CollectionKey, RecordStore},
};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<CollectionKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> Result<MutexGuard<'_, HashMap<CollectionKey, String>>> {
        self.items
            .lock()
            .map_err(|_| WalletError::Storage("memory store lock poisoned".into()))
    }
}

impl RecordStore for MemoryStore {
    fn load<T: DeserializeOwned>(&self, key: CollectionKey) -> Result<Vec<T>> {
        match self.items()?.get(&key) {
            Some(raw) => Ok(serde_json::from_str(raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn save<T: Serialize>(&self, key: CollectionKey, records: &[T]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        debug!(%key, count = records.len(), "memory store save");
        self.items()?.insert(key, raw);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.items()?.clear();
        Ok(())
    }
}
