//! Capability interface over the shared key-value store used as a distributed mutex.
mod error;
pub use error::StoreError;

mod memory;
pub use memory::MemoryLeaseStore;

use async_trait::async_trait;

/// Atomic set-if-absent / delete primitives.
///
/// Implementations must make a successful [`LeaseStore::set_if_absent`] globally visible
/// before returning, across every caller and every replica.
/// No in-process lock is layered on top of this.
#[async_trait]
pub trait LeaseStore: Send + Sync + 'static {
    /// Create `key` if it does not exist. Returns `true` if this call created it.
    async fn set_if_absent(&self, key: &str) -> Result<bool, StoreError>;

    /// Delete `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
