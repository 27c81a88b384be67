//! Per-user storage of snapshot records, unique on `(user, date)`.

use crate::core::cache::KeyValueCollection;
use crate::core::error::SnapshotError;
use crate::core::series::SnapshotRecord;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Fails with [`SnapshotError::AlreadyExists`] when the user already has a record on that date.
    ///
    /// Every operation rejects user ids that are empty or contain `/` with
    /// [`SnapshotError::InvalidUser`].
    async fn insert(&self, user: &str, record: &SnapshotRecord) -> Result<(), SnapshotError>;

    /// The user's records, ascending by date.
    async fn list(&self, user: &str) -> Result<Vec<SnapshotRecord>, SnapshotError>;

    async fn delete(&self, user: &str, date: NaiveDate) -> Result<(), SnapshotError>;
}

/// Stores each record as JSON under `{user}/{date}` in a key-value collection.
pub struct KeyValueSnapshotRepository {
    collection: Arc<dyn KeyValueCollection>,
}

impl KeyValueSnapshotRepository {
    pub fn new(collection: Arc<dyn KeyValueCollection>) -> Self {
        Self { collection }
    }
}

fn check_user(user: &str) -> Result<(), SnapshotError> {
    if user.is_empty() || user.contains('/') {
        return Err(SnapshotError::InvalidUser(user.to_string()));
    }
    Ok(())
}

fn user_prefix(user: &str) -> String {
    format!("{user}/")
}

fn record_key(user: &str, date: NaiveDate) -> String {
    // ISO dates sort lexicographically in date order.
    format!("{user}/{}", date.format("%Y-%m-%d"))
}

#[async_trait]
impl SnapshotRepository for KeyValueSnapshotRepository {
    async fn insert(&self, user: &str, record: &SnapshotRecord) -> Result<(), SnapshotError> {
        check_user(user)?;
        let key = record_key(user, record.date);
        let raw = serde_json::to_string(record).map_err(|e| SnapshotError::Corrupt {
            key: key.clone(),
            reason: e.to_string(),
        })?;

        if !self.collection.put_if_absent(&key, raw).await? {
            return Err(SnapshotError::AlreadyExists {
                user: user.to_string(),
                date: record.date,
            });
        }
        debug!(user, date = %record.date, "Stored snapshot");
        Ok(())
    }

    async fn list(&self, user: &str) -> Result<Vec<SnapshotRecord>, SnapshotError> {
        check_user(user)?;
        let prefix = user_prefix(user);
        let mut records = Vec::new();
        for (key, raw) in self.collection.scan_prefix(&prefix).await? {
            // Skip stray keys that are not `{user}/{date}`.
            let suffix = &key[prefix.len()..];
            if NaiveDate::parse_from_str(suffix, "%Y-%m-%d").is_err() {
                continue;
            }
            let record: SnapshotRecord =
                serde_json::from_str(&raw).map_err(|e| SnapshotError::Corrupt {
                    key: key.clone(),
                    reason: e.to_string(),
                })?;
            records.push(record);
        }
        records.sort_by_key(|record| record.date);
        debug!(user, count = records.len(), "Listed snapshots");
        Ok(records)
    }

    async fn delete(&self, user: &str, date: NaiveDate) -> Result<(), SnapshotError> {
        check_user(user)?;
        self.collection.remove(&record_key(user, date)).await?;
        Ok(())
    }
}
