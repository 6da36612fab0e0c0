mod memory;
mod disk;
mod retry;

pub use memory::MemoryCache;
pub use disk::DiskStore;
pub use retry::{RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::CatalogClient;
use crate::config::{CacheConfig, LookupOptions};
use crate::error::{Error, Result};
use crate::record::{ItemId, ItemRecord};

/// Where a lookup was answered from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Memory,
    Disk,
    Remote,
}

/// Memory, then disk, then the catalog.
///
/// One instance is meant to live for the whole build and be shared by every
/// render call. Records are never evicted from memory, and failed lookups
/// leave nothing behind in either layer.
pub struct LookupCache {
    client: Arc<dyn CatalogClient>,
    memory: MemoryCache,
    retry: RetryPolicy,
}

impl LookupCache {
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        Self {
            client,
            memory: MemoryCache::new(),
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Get the record for `id`, fetching it at most once per process in the
    /// absence of races.
    pub async fn lookup(
        &self,
        id: &ItemId,
        options: &LookupOptions,
        config: &CacheConfig,
    ) -> Result<ItemRecord> {
        self.lookup_with_source(id, options, config)
            .await
            .map(|(record, _)| record)
    }

    /// Like [`lookup`](Self::lookup), also reporting which layer answered.
    pub async fn lookup_with_source(
        &self,
        id: &ItemId,
        options: &LookupOptions,
        config: &CacheConfig,
    ) -> Result<(ItemRecord, LookupSource)> {
        if let Some(record) = self.memory.get(id).await {
            debug!("Memory cache hit for {}", id);
            return Ok((record, LookupSource::Memory));
        }

        let disk = if config.enabled {
            Some(DiskStore::open(&config.directory)?)
        } else {
            None
        };

        if let Some(ref disk) = disk
            && let Some(record) = disk.get(id)?
        {
            debug!("Disk cache hit for {}", id);
            self.memory.insert(id.clone(), record.clone()).await;
            return Ok((record, LookupSource::Disk));
        }

        info!("Looking up {} with {}", id, self.client.name());

        let client = &self.client;
        let items = self
            .retry
            .run(id, move || client.item_lookup(id, options))
            .await?;

        let Some(raw) = items.into_iter().next() else {
            return Err(Error::NotFound(id.to_string()));
        };
        let record = ItemRecord::from_raw(raw);

        self.memory.insert(id.clone(), record.clone()).await;

        // Best effort: the record is already resident in memory.
        if let Some(ref disk) = disk
            && let Err(e) = disk.put(id, &record)
        {
            warn!("Failed to persist {} to disk cache: {}", id, e);
        }

        Ok((record, LookupSource::Remote))
    }

    /// Memory-resident record for `id`, without any I/O
    pub async fn cached(&self, id: &ItemId) -> Option<ItemRecord> {
        self.memory.get(id).await
    }

    pub async fn len(&self) -> u64 {
        self.memory.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.memory.is_empty().await
    }
}
