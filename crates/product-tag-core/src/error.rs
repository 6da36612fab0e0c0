use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for product-tag-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - Render instruction parsing (unknown variant, missing or unsafe item id)
/// - Catalog lookups (transient and permanent upstream failures, empty results)
/// - Cache operations (directory creation, reading, writing)
/// - Configuration operations (loading, validation)
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Parameter Errors
    // ==========================================================================
    /// Malformed render instruction
    #[error("parameter error for product tag: {0}")]
    Parameter(String),

    /// Item id is empty or cannot be used as a cache key
    #[error("invalid item id {id:?}: {reason}")]
    InvalidItemId { id: String, reason: String },

    // ==========================================================================
    // Upstream Errors
    // ==========================================================================
    /// Catalog is temporarily unavailable (rate limited, 503, connection reset)
    #[error("catalog temporarily unavailable: {0}")]
    UpstreamTransient(String),

    /// Catalog rejected the request (bad credentials, malformed id, ...)
    #[error("catalog request failed: {0}")]
    UpstreamPermanent(String),

    /// Catalog stayed unavailable for every attempt
    #[error("catalog lookup for {item_id} failed after {attempts} attempts: {reason}")]
    UpstreamRetriesExhausted {
        item_id: String,
        attempts: u32,
        reason: String,
    },

    // ==========================================================================
    // Lookup Errors
    // ==========================================================================
    /// Lookup succeeded but the catalog returned no items
    #[error("no catalog item found for {0}")]
    NotFound(String),

    // ==========================================================================
    // Cache Errors
    // ==========================================================================
    /// Failed to create the cache directory
    #[error("failed to initialize cache: {0}")]
    CacheInit(String),

    /// Failed to read a cache entry
    #[error("failed to read from cache: {0}")]
    CacheRead(String),

    /// Cache entry exists but does not decode to a record
    #[error("corrupt cache entry {}: {reason}", .path.display())]
    CacheCorrupt { path: PathBuf, reason: String },

    /// Failed to write a cache entry
    #[error("failed to write to cache: {0}")]
    CacheWrite(String),

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },
}

impl Error {
    /// Whether retrying the same catalog request may succeed.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::UpstreamTransient(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
