use crate::core::cache::KeyValueCollection;
use crate::core::error::StoreError;
use async_trait::async_trait;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use tokio::sync::Mutex;
use tracing::debug;

/// A collection stored in one fjall partition. Survives process restarts.
pub struct DiskCollection {
    keyspace: Keyspace,
    partition: PartitionHandle,
    // Serializes read-check-write sequences within this process.
    write_lock: Mutex<()>,
}

impl DiskCollection {
    pub fn new(keyspace: Keyspace, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
            write_lock: Mutex::new(()),
        }
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

fn decode(key: &[u8], value: &[u8]) -> Result<String, StoreError> {
    String::from_utf8(value.to_vec()).map_err(|e| {
        StoreError::Unavailable(format!(
            "Non UTF-8 value for key {}: {e}",
            String::from_utf8_lossy(key)
        ))
    })
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.partition.get(key.as_bytes())? {
            Some(value) => {
                debug!("Cache HIT for key: {key}");
                Ok(Some(decode(key.as_bytes(), &value)?))
            }
            None => {
                debug!("Cache MISS for key: {key}");
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.partition.insert(key.as_bytes(), value.as_bytes())?;
        self.persist()?;
        debug!("Cache PUT for key: {key}");
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, value: String) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        if self.partition.contains_key(key.as_bytes())? {
            return Ok(false);
        }
        self.partition.insert(key.as_bytes(), value.as_bytes())?;
        self.persist()?;
        debug!("Cache PUT for key: {key}");
        Ok(true)
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.partition.remove(key.as_bytes())?;
        self.persist()?;
        debug!("Cache REMOVE for key: {key}");
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>, StoreError> {
        self.partition
            .prefix(prefix.as_bytes())
            .map(|item| {
                let (key, value) = item?;
                let decoded_key = decode(&key, &key)?;
                Ok((decoded_key, decode(&key, &value)?))
            })
            .collect()
    }
}
