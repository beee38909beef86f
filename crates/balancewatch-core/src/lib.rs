//! # BalanceWatch
//!
//! Low-balance alerting for an oracle admin account.
//!
//! Each invocation fetches the ETH/USD price and the admin address balance,
//! converts the balance to USD and, if it is below a configured threshold,
//! sends one Telegram alert. Redis keys with a TTL keep the same threshold from
//! alerting again until the suppression window passes.
//!
//! ## Architecture
//!
//! - **Sources**: CoinGecko price and Etherscan-compatible explorer clients
//! - **Alerting**: ordered threshold evaluation and Telegram delivery
//! - **Store**: Redis suppression markers
//!
//! ## Quick Start
//!
//! ```bash
//! # Run one check (schedule with cron or a systemd timer)
//! TELEGRAM_TOKEN=... TELEGRAM_CHAT_ID=... ORACLE_ADMIN_ADDRESS=0x... balancewatch
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_precision_loss)]

pub mod alerting;
pub mod config;
pub mod error;
pub mod models;
pub mod sources;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::alerting::{BalanceMonitor, MonitorSettings, Notifier, TelegramNotifier};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::models::*;
    pub use crate::sources::{BalanceSource, CoinGeckoClient, ExplorerClient, PriceSource};
    pub use crate::store::{RedisStore, SuppressionStore};
}
