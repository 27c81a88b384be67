//! Durable key-value abstraction the resolver and snapshot repository persist through.

use crate::core::error::StoreError;
use async_trait::async_trait;

/// A named collection of string keys mapped to JSON-serialized string values.
///
/// A missing key is a normal state and reads as `Ok(None)`.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn put(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Writes `value` only when `key` is absent. Returns `false` if the key already existed.
    async fn put_if_absent(&self, key: &str, value: String) -> Result<bool, StoreError>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// All entries whose key starts with `prefix`, ordered by key.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>, StoreError>;
}
