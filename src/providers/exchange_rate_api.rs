use crate::core::currency::CurrencyRateProvider;
use crate::core::error::RateError;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Exchange rates from an exchangerate-api style `/v4/latest/{FROM}` endpoint.
pub struct ExchangeRateApiProvider {
    base_url: String,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str) -> Self {
        ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: HashMap<String, f64>,
}

#[async_trait]
impl CurrencyRateProvider for ExchangeRateApiProvider {
    #[instrument(name = "ExchangeRateApiFetch", skip(self))]
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64, RateError> {
        let from = from.to_uppercase();
        let to = to.to_uppercase();
        let url = format!("{}/v4/latest/{from}", self.base_url);
        debug!("Requesting latest rates from {}", url);

        let response = reqwest::get(&url)
            .await
            .map_err(|e| RateError::FetchUnavailable(format!("Request error: {e} for {from}")))?;

        if !response.status().is_success() {
            return Err(RateError::FetchUnavailable(format!(
                "HTTP error: {} for base currency: {from}",
                response.status()
            )));
        }

        let data: LatestRatesResponse = response.json().await.map_err(|e| {
            RateError::InvalidPayload(format!("Failed to parse rates for {from}: {e}"))
        })?;

        data.rates
            .get(&to)
            .copied()
            .ok_or_else(|| RateError::InvalidPayload(format!("No {to} rate in response for {from}")))
    }
}
