use crate::core::currency::CurrencyRateProvider;
use crate::core::error::RateError;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Exchange rates from the Yahoo Finance chart endpoint (`USDINR=X`).
pub struct YahooCurrencyProvider {
    base_url: String,
}

impl YahooCurrencyProvider {
    pub fn new(base_url: &str) -> Self {
        YahooCurrencyProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct YahooCurrencyResponse {
    chart: CurrencyChartResult,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartResult {
    result: Vec<CurrencyChartItem>,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartItem {
    meta: CurrencyChartMeta,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: f64,
}

#[async_trait]
impl CurrencyRateProvider for YahooCurrencyProvider {
    #[instrument(name = "YahooRateFetch", skip(self))]
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64, RateError> {
        let symbol = format!("{from}{to}=X");
        let url = format!("{}/v8/finance/chart/{symbol}", self.base_url);
        debug!("Requesting currency rate from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("ratefold/0.1")
            .build()
            .map_err(|e| RateError::FetchUnavailable(e.to_string()))?;

        let response = client.get(&url).send().await.map_err(|e| {
            RateError::FetchUnavailable(format!("Request error: {e} for currency pair: {symbol}"))
        })?;

        if !response.status().is_success() {
            return Err(RateError::FetchUnavailable(format!(
                "HTTP error: {} for currency pair: {}",
                response.status(),
                symbol
            )));
        }

        let text = response.text().await.map_err(|e| {
            RateError::FetchUnavailable(format!("Failed to read response for {symbol}: {e}"))
        })?;

        let data: YahooCurrencyResponse = serde_json::from_str(&text).map_err(|e| {
            RateError::InvalidPayload(format!("Failed to parse JSON response for {symbol}: {e}"))
        })?;

        let item = data.chart.result.into_iter().next().ok_or_else(|| {
            RateError::InvalidPayload(format!("No rate data found for currency pair: {symbol}"))
        })?;

        Ok(item.meta.regular_market_price)
    }
}
