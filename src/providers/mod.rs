pub mod exchange_rate_api;
pub mod yahoo_finance;

use crate::core::config::{RateConfig, RateProviderKind};
use crate::core::currency::CurrencyRateProvider;
use exchange_rate_api::ExchangeRateApiProvider;
use std::sync::Arc;
use yahoo_finance::YahooCurrencyProvider;

/// Builds the rate source selected in the configuration.
pub fn rate_provider(config: &RateConfig) -> Arc<dyn CurrencyRateProvider> {
    match config.provider {
        RateProviderKind::Yahoo => Arc::new(YahooCurrencyProvider::new(config.base_url())),
        RateProviderKind::ExchangeRateApi => {
            Arc::new(ExchangeRateApiProvider::new(config.base_url()))
        }
    }
}
