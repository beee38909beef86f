//! Redis-backed suppression store

use async_trait::async_trait;
use deadpool_redis::{Config as PoolConfig, Pool, Runtime};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::debug;

use crate::config::RedisConfig;
use crate::error::Result;

use super::SuppressionStore;

/// Suppression markers stored as plain Redis keys with `SETEX`
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Create a new Redis connection pool. No connection is made until first use.
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let pool = PoolConfig::from_url(&config.url).create_pool(Some(Runtime::Tokio1))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl SuppressionStore for RedisStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.pool.get().await?;
        let exists: bool = conn.exists(key).await?;

        debug!(key, exists, "Checked suppression key");
        Ok(exists)
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.pool.get().await?;
        // SETEX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key, value, seconds).await?;

        debug!(key, ttl_seconds = seconds, "Wrote suppression key");
        Ok(())
    }
}
