//! Upstream data sources: ETH price and on-chain balance

mod explorer;
mod price;

pub use explorer::{BalanceSource, ExplorerClient, FixedKeySelector, KeySelector, RandomKeySelector};
pub use price::{CoinGeckoClient, PriceSource};

use reqwest::Client;
use std::time::Duration;

use crate::error::Result;

/// Request timeout shared by every outbound HTTP call
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client used for price, explorer and Telegram requests
pub fn http_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    Ok(client)
}
