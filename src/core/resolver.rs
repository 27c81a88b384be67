//! Tiered resolution of a slowly-changing external rate.
//!
//! A rate is answered from the first tier that can provide it:
//!
//! 1. the durable cache entry, while it is younger than the TTL (no network);
//! 2. a single fresh fetch, which overwrites the cache entry on success;
//! 3. the cache entry again, however old, when the fetch fails;
//! 4. the configured fallback constant when nothing was ever cached.
//!
//! Fetch and store failures only change which tier answers. `resolve` always
//! returns a usable, positive value.

use crate::core::cache::KeyValueCollection;
use crate::core::clock::{Clock, SystemClock};
use crate::core::coalesce::FetchCoalescer;
use crate::core::currency::CurrencyRateProvider;
use crate::core::error::{RateError, StoreError};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const DEFAULT_TTL_HOURS: i64 = 24;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// The persisted form of the last successfully fetched rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub value: f64,
    pub acquired_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.acquired_at
    }

    /// An entry stamped in the future (clock skew) counts as fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        self.age(now) < ttl
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateOrigin {
    Fresh,
    Cache,
    Fallback,
}

impl Display for RateOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RateOrigin::Fresh => "fresh",
                RateOrigin::Cache => "cache",
                RateOrigin::Fallback => "fallback",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolutionResult {
    pub value: f64,
    pub origin: RateOrigin,
    /// `None` only for [`RateOrigin::Fallback`].
    pub observed_at: Option<DateTime<Utc>>,
}

impl ResolutionResult {
    fn fresh(value: f64, at: DateTime<Utc>) -> Self {
        Self {
            value,
            origin: RateOrigin::Fresh,
            observed_at: Some(at),
        }
    }

    fn cached(entry: &CacheEntry) -> Self {
        Self {
            value: entry.value,
            origin: RateOrigin::Cache,
            observed_at: Some(entry.acquired_at),
        }
    }

    fn fallback(value: f64) -> Self {
        Self {
            value,
            origin: RateOrigin::Fallback,
            observed_at: None,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.observed_at.map(|at| now - at)
    }
}

#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// Logical name of the single durable slot this resolver owns.
    pub key: String,
    pub from: String,
    pub to: String,
    pub ttl: TimeDelta,
    /// Last-resort value. Must be finite and positive.
    pub fallback: f64,
    pub fetch_timeout: Duration,
}

impl ResolverSettings {
    pub fn new(from: &str, to: &str, fallback: f64) -> Self {
        Self {
            key: format!("rate_{}_{}", from.to_lowercase(), to.to_lowercase()),
            from: from.to_string(),
            to: to.to_string(),
            ttl: TimeDelta::hours(DEFAULT_TTL_HOURS),
            fallback,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Cache service for one exchange rate.
pub struct RateResolver {
    provider: Arc<dyn CurrencyRateProvider>,
    store: Arc<dyn KeyValueCollection>,
    clock: Arc<dyn Clock>,
    coalescer: Arc<FetchCoalescer<ResolutionResult>>,
    settings: ResolverSettings,
}

impl RateResolver {
    pub fn new(
        provider: Arc<dyn CurrencyRateProvider>,
        store: Arc<dyn KeyValueCollection>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            provider,
            store,
            clock: Arc::new(SystemClock),
            coalescer: Arc::new(FetchCoalescer::new()),
            settings,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Shares in-flight refreshes with other resolvers using the same coalescer.
    pub fn with_coalescer(mut self, coalescer: Arc<FetchCoalescer<ResolutionResult>>) -> Self {
        self.coalescer = coalescer;
        self
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    #[instrument(name = "RateResolve", skip(self), fields(key = %self.settings.key))]
    pub async fn resolve(&self) -> ResolutionResult {
        if let Some(entry) = self.read_entry().await {
            if entry.is_fresh(self.clock.now(), self.settings.ttl) {
                debug!(value = entry.value, "Serving rate from fresh cache");
                return ResolutionResult::cached(&entry);
            }
        }

        self.coalescer
            .run(&self.settings.key, || self.refresh())
            .await
    }

    /// Deletes the cached entry. Idempotent.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(&self.settings.key).await?;
        debug!(key = %self.settings.key, "Cleared cached rate");
        Ok(())
    }

    /// The cached entry as currently stored, without any fetch.
    pub async fn peek(&self) -> Option<CacheEntry> {
        self.read_entry().await
    }

    async fn refresh(&self) -> ResolutionResult {
        // Re-read: a refresh that finished while we waited may have filled the slot.
        let cached = self.read_entry().await;
        if let Some(entry) = cached.as_ref() {
            if entry.is_fresh(self.clock.now(), self.settings.ttl) {
                return ResolutionResult::cached(entry);
            }
        }

        match self.fetch().await {
            Ok(value) => {
                let entry = CacheEntry {
                    value,
                    acquired_at: self.clock.now(),
                };
                self.write_entry(&entry).await;
                ResolutionResult::fresh(value, entry.acquired_at)
            }
            Err(e) => match cached {
                Some(entry) => {
                    warn!(error = %e, value = entry.value, "Rate fetch failed, serving cached rate");
                    ResolutionResult::cached(&entry)
                }
                None => {
                    warn!(error = %e, value = self.settings.fallback, "Rate fetch failed, serving fallback rate");
                    ResolutionResult::fallback(self.settings.fallback)
                }
            },
        }
    }

    async fn fetch(&self) -> Result<f64, RateError> {
        let ResolverSettings {
            from,
            to,
            fetch_timeout,
            ..
        } = &self.settings;

        let value = tokio::time::timeout(*fetch_timeout, self.provider.get_rate(from, to))
            .await
            .map_err(|_| {
                RateError::FetchUnavailable(format!("No response within {fetch_timeout:?}"))
            })??;

        if !value.is_finite() || value <= 0.0 {
            return Err(RateError::InvalidPayload(format!(
                "Rate {value} for {from}/{to} is not a positive number"
            )));
        }
        debug!(value, "Fetched fresh rate");
        Ok(value)
    }

    async fn read_entry(&self) -> Option<CacheEntry> {
        let raw = match self.store.get(&self.settings.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Cache read failed, treating as empty");
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) if entry.value.is_finite() && entry.value > 0.0 => Some(entry),
            Ok(entry) => {
                warn!(value = entry.value, "Ignoring cached rate that is not positive");
                None
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    async fn write_entry(&self, entry: &CacheEntry) {
        let raw = match serde_json::to_string(entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cache entry");
                return;
            }
        };
        if let Err(e) = self.store.put(&self.settings.key, raw).await {
            warn!(error = %e, "Cache write failed, continuing with fetched rate");
        }
    }
}
