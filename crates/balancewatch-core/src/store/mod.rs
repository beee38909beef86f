//! Suppression store
//!
//! Records "already notified for threshold X" markers with a time-to-live.
//! Only key existence matters; the stored value is informational.

mod redis;

pub use self::redis::RedisStore;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Key-value store holding suppression markers
#[async_trait]
pub trait SuppressionStore: Send + Sync {
    /// Whether a marker is currently present
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Write a marker that expires after `ttl`
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}

/// Build the suppression key for a threshold label
pub fn suppression_key(prefix: &str, threshold_label: &str) -> String {
    format!("{prefix}:{threshold_label}")
}
