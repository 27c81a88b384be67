pub mod disk;
pub mod memory;

use crate::core::cache::KeyValueCollection;
use crate::core::error::StoreError;
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Durable store holding named collections in a single fjall keyspace.
pub struct KeyValueStore {
    keyspace: Keyspace,
}

impl KeyValueStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path).map_err(|e| {
            StoreError::Unavailable(format!("Failed to create {}: {e}", path.display()))
        })?;
        let keyspace = fjall::Config::new(path).open()?;
        debug!("Opened store at {}", path.display());
        Ok(Self { keyspace })
    }

    /// Opens the named collection, creating it if missing.
    pub fn collection(&self, name: &str) -> Result<Arc<dyn KeyValueCollection>, StoreError> {
        let partition = self
            .keyspace
            .open_partition(name, PartitionCreateOptions::default())?;
        Ok(Arc::new(DiskCollection::new(
            self.keyspace.clone(),
            partition,
        )))
    }
}
