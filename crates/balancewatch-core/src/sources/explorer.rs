//! Block explorer balance lookup (Etherscan-compatible `account/balance`)

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// Something that can report an address's raw native balance
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Raw balance in wei as reported upstream, not yet validated
    async fn raw_balance(&self, address: &str) -> Result<String>;
}

/// Picks the API key for a single explorer request
pub trait KeySelector: Send + Sync {
    /// `None` when no key is configured
    fn select<'a>(&self, keys: &'a [String]) -> Option<&'a str>;
}

/// Uniform random choice over the configured keys
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomKeySelector;

impl KeySelector for RandomKeySelector {
    fn select<'a>(&self, keys: &'a [String]) -> Option<&'a str> {
        keys.choose(&mut rand::thread_rng()).map(String::as_str)
    }
}

/// Always the key at a fixed index (wrapping)
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedKeySelector(pub usize);

impl KeySelector for FixedKeySelector {
    fn select<'a>(&self, keys: &'a [String]) -> Option<&'a str> {
        if keys.is_empty() {
            return None;
        }
        Some(keys[self.0 % keys.len()].as_str())
    }
}

/// Etherscan-style explorer client (Blastscan by default)
pub struct ExplorerClient<K = RandomKeySelector> {
    client: Client,
    url: String,
    api_keys: Vec<String>,
    selector: K,
}

impl ExplorerClient {
    /// Create a client that rotates keys at random
    pub fn new(client: Client, url: impl Into<String>, api_keys: Vec<String>) -> Self {
        Self::with_selector(client, url, api_keys, RandomKeySelector)
    }
}

impl<K: KeySelector> ExplorerClient<K> {
    /// Create a client with an explicit key-selection strategy
    pub fn with_selector(
        client: Client,
        url: impl Into<String>,
        api_keys: Vec<String>,
        selector: K,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            api_keys,
            selector,
        }
    }
}

#[async_trait]
impl<K: KeySelector> BalanceSource for ExplorerClient<K> {
    async fn raw_balance(&self, address: &str) -> Result<String> {
        let mut request = self.client.get(&self.url).query(&[
            ("module", "account"),
            ("action", "balance"),
            ("address", address),
            ("tag", "latest"),
        ]);

        if let Some(key) = self.selector.select(&self.api_keys) {
            request = request.query(&[("apikey", key)]);
        }

        // The query string carries the API key; keep it out of error messages
        let body: Value = request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| Error::Http(e.without_url()))?
            .json()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;

        let result = match body.get("result") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => return Err(Error::missing_field("explorer API", "result")),
        };

        debug!(address, result = %result, "Fetched raw balance");
        Ok(result)
    }
}
