use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;

use crate::store::{LeaseStore, StoreError};

/// Process-local lease store.
///
/// Only correct for a single replica. Used by tests and by the daemon when no shared store is configured.
#[derive(Debug, Default)]
pub struct MemoryLeaseStore {
    keys: Mutex<HashSet<String>>,
}

impl MemoryLeaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys().contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    fn keys(&self) -> MutexGuard<'_, HashSet<String>> {
        self.keys.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl LeaseStore for MemoryLeaseStore {
    async fn set_if_absent(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.keys().insert(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.keys().remove(key);
        Ok(())
    }
}
