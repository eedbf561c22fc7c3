use std::time::Duration;

use crate::{models::ExchangeRates, AppError, Result};

pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// Relays "latest rates" requests to the configured exchange rate provider.
/// One attempt per call, bounded by the client timeout; nothing is cached.
#[derive(Clone)]
pub struct CurrencyService {
    client: reqwest::Client,
    api_base: String,
}

impl CurrencyService {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    pub async fn latest(&self, base: Option<&str>) -> Result<ExchangeRates> {
        let base = normalize_base(base);
        let url = format!("{}/latest", self.api_base);
        tracing::info!("requesting exchange rates for {base}");
        let response = self
            .client
            .get(&url)
            .query(&[("base", base.as_str())])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("exchange rate request failed: {e:?}");
                AppError::from(e)
            })?
            .error_for_status()?;
        let body = response.json::<serde_json::Value>().await?;
        if !body.is_object() {
            return Err(AppError::Upstream(
                "exchange rate provider returned an unexpected payload".into(),
            ));
        }
        let rates = ExchangeRates::from_upstream(&body, &base);
        tracing::info!("received {} exchange rates for {}", rates.rates.len(), rates.base);
        Ok(rates)
    }
}

/// Uppercased base currency, `USD` when absent or blank
pub fn normalize_base(base: Option<&str>) -> String {
    base.map(str::trim)
        .filter(|b| !b.is_empty())
        .unwrap_or(DEFAULT_BASE_CURRENCY)
        .to_uppercase()
}
