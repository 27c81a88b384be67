//! Currency conversion abstractions

use crate::core::error::RateError;
use async_trait::async_trait;

/// A remote source of exchange rates. One call is one network attempt.
#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64, RateError>;
}
