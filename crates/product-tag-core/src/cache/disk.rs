use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Error, Result};
use crate::record::{ItemId, ItemRecord};

/// One JSON file per item id under a single directory.
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    /// Create the directory if absent and return a store rooted at it.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Self::ensure(dir)?;
        debug!("Opened disk cache at {}", dir.display());
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn ensure(dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir).map_err(|e| {
            Error::CacheInit(format!(
                "Failed to create cache directory {}: {}",
                dir.display(),
                e
            ))
        })
    }

    pub fn path_for(&self, id: &ItemId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Read an entry. A missing file is `None`; an unreadable or undecodable
    /// one is an error, never a miss.
    pub fn get(&self, id: &ItemId) -> Result<Option<ItemRecord>> {
        let path = self.path_for(id);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::CacheRead(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| Error::CacheCorrupt {
                path,
                reason: e.to_string(),
            })
    }

    /// Write an entry unless one already exists.
    ///
    /// The record is written to a temp file in the same directory and linked
    /// into place without clobbering, so an existing entry is never touched.
    /// Returns `false` when an entry was already present.
    pub fn put(&self, id: &ItemId, record: &ItemRecord) -> Result<bool> {
        let path = self.path_for(id);
        let bytes = serde_json::to_vec(record).map_err(|e| Error::CacheWrite(e.to_string()))?;

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| {
            Error::CacheWrite(format!(
                "Failed to create temp file in {}: {}",
                self.dir.display(),
                e
            ))
        })?;
        tmp.write_all(&bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| Error::CacheWrite(format!("Failed to write temp file: {e}")))?;

        match tmp.persist_noclobber(&path) {
            Ok(_) => {
                debug!("Wrote cache entry {}", path.display());
                Ok(true)
            }
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                debug!("Cache entry {} already exists, keeping it", path.display());
                Ok(false)
            }
            Err(e) => Err(Error::CacheWrite(format!(
                "Failed to persist {}: {}",
                path.display(),
                e.error
            ))),
        }
    }
}
