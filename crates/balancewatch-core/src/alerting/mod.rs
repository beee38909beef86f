//! Alerting for BalanceWatch
//!
//! Threshold evaluation against the suppression store and Telegram delivery.

mod evaluator;
mod notifier;

pub use evaluator::{BalanceMonitor, MonitorSettings};
pub use notifier::{format_alert_message, Notifier, TelegramNotifier};
