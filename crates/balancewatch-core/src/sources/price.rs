//! ETH/USD price lookup

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// Something that can quote ETH in USD
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Current ETH price in USD
    async fn eth_usd_price(&self) -> Result<f64>;
}

/// CoinGecko `simple/price` client.
///
/// Expects a body shaped like `{"ethereum": {"usd": 3012.45}}`.
pub struct CoinGeckoClient {
    client: Client,
    url: String,
}

impl CoinGeckoClient {
    /// Create a client for the given endpoint
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn eth_usd_price(&self) -> Result<f64> {
        let body: Value = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let price = extract_price(&body)?;
        debug!(price, "Fetched ETH price");
        Ok(price)
    }
}

fn extract_price(body: &Value) -> Result<f64> {
    let field = body
        .get("ethereum")
        .and_then(|eth| eth.get("usd"))
        .ok_or_else(|| Error::missing_field("price API", "ethereum.usd"))?;

    // Some mirrors quote prices as strings
    let price = match field {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| Error::InvalidPrice(field.to_string()))?;

    if !price.is_finite() || price <= 0.0 {
        return Err(Error::InvalidPrice(field.to_string()));
    }

    Ok(price)
}
