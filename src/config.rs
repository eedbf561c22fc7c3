use std::{net::SocketAddr, time::Duration};

use anyhow::{anyhow, Context};
use derive_builder::Builder;

pub const DEFAULT_EXCHANGE_API_BASE: &str = "https://api.exchangerate.host";

/// Runtime settings, normally read from the environment
#[derive(Debug, Clone, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Settings {
    /// Postgres connection string, `None` runs on the in-memory store
    #[builder(setter(into, strip_option), default)]
    pub database_url: Option<String>,
    #[builder(default = "5")]
    pub database_max_connections: u32,
    #[builder(default = "SocketAddr::from(([0, 0, 0, 0], 8000))")]
    pub bind_addr: SocketAddr,
    #[builder(setter(into), default = "DEFAULT_EXCHANGE_API_BASE.to_string()")]
    pub exchange_api_base: String,
    #[builder(default = "Duration::from_secs(15)")]
    pub exchange_timeout: Duration,
    #[builder(default = "Duration::from_secs(30)")]
    pub request_timeout: Duration,
}

impl SettingsBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(base) = &self.exchange_api_base {
            if base.trim().is_empty() {
                return Err("exchange api base url must not be empty".into());
            }
        }
        if self.database_max_connections == Some(0) {
            return Err("database pool needs at least one connection".into());
        }
        for timeout in [self.exchange_timeout, self.request_timeout]
            .into_iter()
            .flatten()
        {
            if timeout.is_zero() {
                return Err("timeouts must be greater than zero".into());
            }
        }
        Ok(())
    }
}

impl Settings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut builder = Self::builder();
        if let Some(url) = get("DATABASE_URL") {
            builder.database_url(url);
        }
        if let Some(max) = get("DATABASE_MAX_CONNECTIONS") {
            builder.database_max_connections(
                max.trim()
                    .parse()
                    .with_context(|| format!("DATABASE_MAX_CONNECTIONS is not a number: {max}"))?,
            );
        }
        if let Some(addr) = get("BIND_ADDR") {
            builder.bind_addr(
                addr.trim()
                    .parse()
                    .with_context(|| format!("BIND_ADDR is not a socket address: {addr}"))?,
            );
        }
        if let Some(base) = get("EXCHANGE_API_BASE") {
            builder.exchange_api_base(base.trim().trim_end_matches('/'));
        }
        if let Some(secs) = get("EXCHANGE_TIMEOUT_SECS") {
            builder.exchange_timeout(parse_secs("EXCHANGE_TIMEOUT_SECS", &secs)?);
        }
        if let Some(secs) = get("REQUEST_TIMEOUT_SECS") {
            builder.request_timeout(parse_secs("REQUEST_TIMEOUT_SECS", &secs)?);
        }
        builder.build().map_err(|e| anyhow!("invalid settings: {e}"))
    }
}

fn parse_secs(key: &str, value: &str) -> anyhow::Result<Duration> {
    let secs: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("{key} is not a whole number of seconds: {value}"))?;
    Ok(Duration::from_secs(secs))
}
