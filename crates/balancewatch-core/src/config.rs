//! Configuration management for BalanceWatch
//!
//! Everything comes from the process environment (optionally seeded from a
//! `.env` file). Variables are read through `config::Environment` into a flat
//! [`EnvSettings`] and then validated into the nested [`Config`].

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::Threshold;

/// Default CoinGecko ETH/USD endpoint
pub const DEFAULT_ETH_PRICE_API: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=ethereum&vs_currencies=usd";

/// Default Blastscan API endpoint
pub const DEFAULT_EXPLORER_API: &str = "https://api.blastscan.io/api";

/// Default Telegram Bot API base URL
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Redis configuration
    pub redis: RedisConfig,

    /// Telegram configuration
    pub telegram: TelegramConfig,

    /// Price API configuration
    pub price: PriceConfig,

    /// Block explorer configuration
    pub explorer: ExplorerConfig,

    /// Monitored address and thresholds
    pub monitor: MonitorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Redis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis URL
    pub url: String,
    /// Prefix for suppression keys
    pub key_prefix: String,
    /// How long an alert for a threshold stays suppressed
    pub suppression_ttl: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379/0".to_string(),
            key_prefix: "already_notified".to_string(),
            suppression_ttl: Duration::from_secs(60 * 60),
        }
    }
}

/// Telegram configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token
    pub token: String,
    /// Destination chat (numeric id or `@channel`)
    pub chat_id: String,
    /// Bot API base URL
    pub api_url: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Price API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceConfig {
    /// ETH/USD price endpoint
    pub api_url: String,
}

/// Block explorer configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Explorer API endpoint
    pub api_url: String,
    /// API keys, one picked per request
    pub api_keys: Vec<String>,
}

impl std::fmt::Debug for ExplorerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerConfig")
            .field("api_url", &self.api_url)
            .field("api_keys", &format_args!("[{} keys]", self.api_keys.len()))
            .finish()
    }
}

/// Monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Oracle admin address to watch
    pub admin_address: String,
    /// USD thresholds in evaluation order
    pub thresholds: Vec<Threshold>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (json or pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Raw environment variables, lowercased by `config::Environment`
#[derive(Debug, Clone, Deserialize)]
pub struct EnvSettings {
    /// `REDIS_URI`
    pub redis_uri: String,
    /// `REDIS_KEY`
    pub redis_key: String,
    /// `SUPPRESSION_TTL`
    pub suppression_ttl: String,
    /// `TELEGRAM_TOKEN`
    pub telegram_token: Option<String>,
    /// `TELEGRAM_CHAT_ID`
    pub telegram_chat_id: Option<String>,
    /// `TELEGRAM_API_URL`
    pub telegram_api_url: String,
    /// `ETH_PRICE_API`
    pub eth_price_api: String,
    /// `EXPLORER_API_URL`
    pub explorer_api_url: String,
    /// `ORACLE_ADMIN_ADDRESS`
    pub oracle_admin_address: Option<String>,
    /// `NOTIFICATION_THRESHOLD_USD`
    pub notification_threshold_usd: String,
    /// `BLASTSCAN_KEYS`
    pub blastscan_keys: String,
    /// `LOG_LEVEL`
    pub log_level: String,
    /// `LOG_FORMAT`
    pub log_format: String,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_environment(::config::Environment::default())
    }

    /// Load configuration from an explicit variable map instead of the process
    /// environment. Keys use the usual upper-case variable names.
    pub fn from_env_map(vars: HashMap<String, String>) -> Result<Self> {
        Self::from_environment(::config::Environment::default().source(Some(vars)))
    }

    fn from_environment(environment: ::config::Environment) -> Result<Self> {
        let redis = RedisConfig::default();
        let logging = LoggingConfig::default();

        let settings: EnvSettings = ::config::Config::builder()
            .set_default("redis_uri", redis.url)?
            .set_default("redis_key", redis.key_prefix)?
            .set_default("suppression_ttl", "1h")?
            .set_default("telegram_api_url", DEFAULT_TELEGRAM_API)?
            .set_default("eth_price_api", DEFAULT_ETH_PRICE_API)?
            .set_default("explorer_api_url", DEFAULT_EXPLORER_API)?
            .set_default("notification_threshold_usd", "10,20")?
            .set_default("blastscan_keys", "")?
            .set_default("log_level", logging.level)?
            .set_default("log_format", logging.format)?
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        Self::try_from(settings)
    }
}

impl TryFrom<EnvSettings> for Config {
    type Error = Error;

    fn try_from(env: EnvSettings) -> Result<Self> {
        let token = required(env.telegram_token, "TELEGRAM_TOKEN")?;
        let chat_id = required(env.telegram_chat_id, "TELEGRAM_CHAT_ID")?;
        let admin_address = required(env.oracle_admin_address, "ORACLE_ADMIN_ADDRESS")?;

        let suppression_ttl = humantime::parse_duration(env.suppression_ttl.trim())
            .map_err(|e| Error::config(format!("invalid SUPPRESSION_TTL: {e}")))?;
        if suppression_ttl.as_secs() == 0 {
            return Err(Error::config("SUPPRESSION_TTL must be at least one second"));
        }

        let level = env.log_level.trim().to_ascii_lowercase();
        if tracing_subscriber::EnvFilter::try_new(&level).is_err() {
            return Err(Error::config(format!(
                "LOG_LEVEL is not a valid log filter: {:?}",
                env.log_level
            )));
        }

        let format = env.log_format.trim().to_ascii_lowercase();
        if format != "json" && format != "pretty" {
            return Err(Error::config(format!(
                "LOG_FORMAT must be `json` or `pretty`, got {:?}",
                env.log_format
            )));
        }

        Ok(Self {
            redis: RedisConfig {
                url: env.redis_uri,
                key_prefix: env.redis_key,
                suppression_ttl,
            },
            telegram: TelegramConfig {
                token,
                chat_id,
                api_url: env.telegram_api_url.trim_end_matches('/').to_string(),
            },
            price: PriceConfig {
                api_url: env.eth_price_api,
            },
            explorer: ExplorerConfig {
                api_url: env.explorer_api_url,
                api_keys: split_list(&env.blastscan_keys),
            },
            monitor: MonitorConfig {
                admin_address,
                thresholds: Threshold::parse_list(&env.notification_threshold_usd)?,
            },
            logging: LoggingConfig { level, format },
        })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::config(format!("{name} must be set"))),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
