//! Core business logic abstractions

pub mod cache;
pub mod clock;
pub mod coalesce;
pub mod config;
pub mod currency;
pub mod error;
pub mod format;
pub mod log;
pub mod resolver;
pub mod series;
pub mod snapshot;

// Re-export main types for cleaner imports
pub use cache::KeyValueCollection;
pub use currency::CurrencyRateProvider;
pub use error::{RateError, SnapshotError, StoreError};
pub use resolver::{RateOrigin, RateResolver, ResolutionResult, ResolverSettings};
pub use series::{AssetId, DateRange, SnapshotRecord};
pub use snapshot::{KeyValueSnapshotRepository, SnapshotRepository};
