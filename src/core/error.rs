//! Error types shared by the rate resolver, stores and snapshot repository.

use chrono::NaiveDate;
use thiserror::Error;

/// Failure of a single fetch attempt against a rate source.
///
/// Never surfaces from [`crate::core::resolver::RateResolver::resolve`]; it only
/// decides which fallback tier answers.
#[derive(Debug, Error)]
pub enum RateError {
    /// Network failure, non-success status or timeout.
    #[error("Rate source unavailable: {0}")]
    FetchUnavailable(String),
    /// Value missing, non-numeric or non-positive.
    #[error("Invalid rate payload: {0}")]
    InvalidPayload(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<fjall::Error> for StoreError {
    fn from(e: fjall::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot for user {user} on {date} already exists")]
    AlreadyExists { user: String, date: NaiveDate },
    #[error("Invalid user id {0:?}: must be non-empty and must not contain '/'")]
    InvalidUser(String),
    #[error("Corrupt snapshot record {key}: {reason}")]
    Corrupt { key: String, reason: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}
