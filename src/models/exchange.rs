use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Latest rates relayed from the exchange rate provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    pub base: String,
    pub date: Option<String>,
    pub rates: Map<String, Value>,
}

impl ExchangeRates {
    /// Reshapes a provider response, falling back to the requested base,
    /// no date and no rates for whatever is missing
    pub fn from_upstream(body: &Value, requested_base: &str) -> Self {
        Self {
            base: body
                .get("base")
                .and_then(Value::as_str)
                .unwrap_or(requested_base)
                .to_string(),
            date: body.get("date").and_then(Value::as_str).map(String::from),
            rates: body
                .get("rates")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        }
    }
}
