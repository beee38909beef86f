//! Error types for BalanceWatch

use thiserror::Error;

/// Result type alias using BalanceWatch's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for BalanceWatch operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream HTTP error (transport failure or non-success status)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Expected field absent from an upstream response
    #[error("{source_name} response is missing field `{field}`")]
    MissingField {
        /// Which upstream produced the response
        source_name: &'static str,
        /// Dotted path of the absent field
        field: &'static str,
    },

    /// Price API returned something that is not a usable price
    #[error("Invalid ETH price: {0}")]
    InvalidPrice(String),

    /// Explorer returned a balance that is not an integer
    #[error("Invalid balance value: {0:?}")]
    InvalidBalance(String),

    /// Notification delivery failed
    #[error("Notification error: {0}")]
    Notification(String),

    /// Redis error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Redis connection pool error
    #[error("Redis pool error: {0}")]
    Pool(String),
}

impl Error {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a notification error
    pub fn notification(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }

    /// Create a missing field error
    pub fn missing_field(source_name: &'static str, field: &'static str) -> Self {
        Self::MissingField { source_name, field }
    }

    /// Whether this is the non-fatal "cannot get balance" condition
    pub fn is_invalid_balance(&self) -> bool {
        matches!(self, Self::InvalidBalance(_))
    }
}

impl From<::config::ConfigError> for Error {
    fn from(err: ::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<deadpool_redis::PoolError> for Error {
    fn from(err: deadpool_redis::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

impl From<deadpool_redis::CreatePoolError> for Error {
    fn from(err: deadpool_redis::CreatePoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
