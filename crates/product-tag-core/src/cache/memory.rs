use moka::future::Cache;

use crate::record::{ItemId, ItemRecord};

/// Process-lifetime record cache.
///
/// Built without capacity or TTL so entries are never evicted; once an id is
/// resident it stays authoritative until the process exits.
pub struct MemoryCache {
    cache: Cache<ItemId, ItemRecord>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().build(),
        }
    }

    pub async fn get(&self, id: &ItemId) -> Option<ItemRecord> {
        self.cache.get(id).await
    }

    /// Last write wins when two lookups race on the same id.
    pub async fn insert(&self, id: ItemId, record: ItemRecord) {
        self.cache.insert(id, record).await;
    }

    /// Number of resident records.
    ///
    /// Flushes moka's pending bookkeeping first so the count is exact.
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}
