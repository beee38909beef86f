//! Threshold evaluation for a single monitoring run

use std::time::Duration;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::models::{balance_to_usd, parse_balance, RunOutcome, Threshold};
use crate::sources::{BalanceSource, PriceSource};
use crate::store::{suppression_key, SuppressionStore};

use super::notifier::{format_alert_message, Notifier};

/// What the monitor watches and how long alerts stay suppressed
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Oracle admin address
    pub admin_address: String,
    /// Thresholds in evaluation order
    pub thresholds: Vec<Threshold>,
    /// Suppression key prefix
    pub key_prefix: String,
    /// Suppression window
    pub suppression_ttl: Duration,
}

impl From<&Config> for MonitorSettings {
    fn from(config: &Config) -> Self {
        Self {
            admin_address: config.monitor.admin_address.clone(),
            thresholds: config.monitor.thresholds.clone(),
            key_prefix: config.redis.key_prefix.clone(),
            suppression_ttl: config.redis.suppression_ttl,
        }
    }
}

/// One-shot balance check: price, balance, thresholds, at most one alert
pub struct BalanceMonitor<P, B, S, N> {
    prices: P,
    balances: B,
    store: S,
    notifier: N,
    settings: MonitorSettings,
}

impl<P, B, S, N> BalanceMonitor<P, B, S, N>
where
    P: PriceSource,
    B: BalanceSource,
    S: SuppressionStore,
    N: Notifier,
{
    /// Create a new monitor
    pub fn new(prices: P, balances: B, store: S, notifier: N, settings: MonitorSettings) -> Self {
        Self {
            prices,
            balances,
            store,
            notifier,
            settings,
        }
    }

    /// Run one check.
    ///
    /// Upstream, store and notification failures abort the run. A balance that
    /// is not an integer surfaces as [`crate::Error::InvalidBalance`] before
    /// anything is sent.
    pub async fn run(&self) -> Result<RunOutcome> {
        let price = self.prices.eth_usd_price().await?;
        let raw = self.balances.raw_balance(&self.settings.admin_address).await?;
        let balance_wei = parse_balance(&raw)?;
        let balance_usd = balance_to_usd(balance_wei, price);

        info!(
            address = %self.settings.admin_address,
            balance_wei = %balance_wei,
            eth_usd = price,
            balance_usd,
            "Oracle admin balance"
        );

        let outcome = match self.evaluate(balance_usd).await? {
            Some(threshold) => RunOutcome::Alerted {
                threshold,
                balance_usd,
            },
            None => RunOutcome::NoAlert { balance_usd },
        };

        Ok(outcome)
    }

    /// Walk thresholds in configured order and alert on the first breached one
    /// that is not suppressed. Suppressed breaches are skipped, not terminal.
    pub async fn evaluate(&self, balance_usd: f64) -> Result<Option<Threshold>> {
        for threshold in &self.settings.thresholds {
            if !threshold.is_breached_by(balance_usd) {
                continue;
            }

            let key = suppression_key(&self.settings.key_prefix, &threshold.label);
            if self.store.exists(&key).await? {
                debug!(threshold = %threshold.label, key = %key, "Breach already notified");
                continue;
            }

            info!(
                threshold = threshold.usd,
                balance_usd,
                "Balance less than threshold ({:.2}): {:.2}",
                threshold.usd,
                balance_usd
            );

            let message = format_alert_message(balance_usd, &self.settings.admin_address);
            self.notifier.send(&message).await?;

            self.store
                .set_with_expiry(&key, &format!("{balance_usd:?}"), self.settings.suppression_ttl)
                .await?;

            return Ok(Some(threshold.clone()));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    const ADDRESS: &str = "0x00000000000000000000000000000000000000aa";
    const PREFIX: &str = "already_notified";

    struct FixedPrice(f64);

    #[async_trait]
    impl PriceSource for FixedPrice {
        async fn eth_usd_price(&self) -> Result<f64> {
            Ok(self.0)
        }
    }

    struct FixedBalance(&'static str);

    #[async_trait]
    impl BalanceSource for FixedBalance {
        async fn raw_balance(&self, _address: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    /// In-memory store shared between runs; records every call
    #[derive(Clone, Default)]
    struct MemoryStore {
        keys: Arc<Mutex<HashMap<String, String>>>,
        reads: Arc<Mutex<Vec<String>>>,
        writes: Arc<Mutex<Vec<(String, String, Duration)>>>,
    }

    impl MemoryStore {
        fn with_keys(keys: &[&str]) -> Self {
            let store = Self::default();
            for key in keys {
                store
                    .keys
                    .lock()
                    .unwrap()
                    .insert((*key).to_string(), "1".to_string());
            }
            store
        }

        fn reads(&self) -> Vec<String> {
            self.reads.lock().unwrap().clone()
        }

        fn written_keys(&self) -> Vec<String> {
            self.writes.lock().unwrap().iter().map(|(k, _, _)| k.clone()).collect()
        }
    }

    #[async_trait]
    impl SuppressionStore for MemoryStore {
        async fn exists(&self, key: &str) -> Result<bool> {
            self.reads.lock().unwrap().push(key.to_string());
            Ok(self.keys.lock().unwrap().contains_key(key))
        }

        async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
            self.writes
                .lock()
                .unwrap()
                .push((key.to_string(), value.to_string(), ttl));
            self.keys
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingNotifier {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, text: &str) -> Result<()> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _text: &str) -> Result<()> {
            Err(Error::notification("telegram down"))
        }
    }

    fn settings(thresholds: &str) -> MonitorSettings {
        MonitorSettings {
            admin_address: ADDRESS.to_string(),
            thresholds: Threshold::parse_list(thresholds).unwrap(),
            key_prefix: PREFIX.to_string(),
            suppression_ttl: Duration::from_secs(3600),
        }
    }

    /// 1 ETH at the given price, so balance_usd == price
    const ONE_ETH: &str = "1000000000000000000";

    fn monitor<N: Notifier>(
        balance_usd: f64,
        store: MemoryStore,
        notifier: N,
    ) -> BalanceMonitor<FixedPrice, FixedBalance, MemoryStore, N> {
        BalanceMonitor::new(
            FixedPrice(balance_usd),
            FixedBalance(ONE_ETH),
            store,
            notifier,
            settings("10,20"),
        )
    }

    #[tokio::test]
    async fn test_list_order_wins_over_magnitude() {
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();

        let outcome = monitor(15.0, store.clone(), notifier.clone()).run().await.unwrap();

        match outcome {
            RunOutcome::Alerted { threshold, balance_usd } => {
                assert_eq!(threshold.label, "20");
                assert_eq!(balance_usd, 15.0);
            }
            other => panic!("expected alert, got {other:?}"),
        }
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(store.written_keys(), vec!["already_notified:20"]);
        // Whole-dollar balances keep their fractional part in the stored value
        assert_eq!(store.writes.lock().unwrap()[0].1, "15.0");
        // 10 is not breached, so only 20 is looked up
        assert_eq!(store.reads(), vec!["already_notified:20"]);
    }

    #[tokio::test]
    async fn test_continues_past_suppressed_breach() {
        let store = MemoryStore::with_keys(&["already_notified:10"]);
        let notifier = RecordingNotifier::default();

        let outcome = monitor(5.0, store.clone(), notifier.clone()).run().await.unwrap();

        assert!(matches!(outcome, RunOutcome::Alerted { ref threshold, .. } if threshold.label == "20"));
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(store.reads(), vec!["already_notified:10", "already_notified:20"]);
        assert_eq!(store.written_keys(), vec!["already_notified:20"]);
    }

    #[tokio::test]
    async fn test_stops_after_first_alert() {
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();

        monitor(5.0, store.clone(), notifier.clone()).run().await.unwrap();

        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(store.reads(), vec!["already_notified:10"]);
        assert_eq!(store.written_keys(), vec!["already_notified:10"]);
    }

    #[tokio::test]
    async fn test_above_all_thresholds_touches_nothing() {
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();

        let outcome = monitor(25.0, store.clone(), notifier.clone()).run().await.unwrap();

        assert_eq!(outcome, RunOutcome::NoAlert { balance_usd: 25.0 });
        assert!(store.reads().is_empty());
        assert!(store.written_keys().is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_exact_threshold_is_not_a_breach() {
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();

        let outcome = monitor(20.0, store.clone(), notifier.clone()).run().await.unwrap();

        assert_eq!(outcome, RunOutcome::NoAlert { balance_usd: 20.0 });
        assert!(store.reads().is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_all_breaches_suppressed() {
        let store = MemoryStore::with_keys(&["already_notified:10", "already_notified:20"]);
        let notifier = RecordingNotifier::default();

        let outcome = monitor(1.0, store.clone(), notifier.clone()).run().await.unwrap();

        assert_eq!(outcome, RunOutcome::NoAlert { balance_usd: 1.0 });
        assert!(notifier.sent().is_empty());
        assert!(store.written_keys().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_balance_sends_nothing() {
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();
        let monitor = BalanceMonitor::new(
            FixedPrice(3000.0),
            FixedBalance("Max rate limit reached"),
            store.clone(),
            notifier.clone(),
            settings("10,20"),
        );

        let err = monitor.run().await.unwrap_err();

        assert!(err.is_invalid_balance());
        assert!(notifier.sent().is_empty());
        assert!(store.reads().is_empty());
    }

    #[tokio::test]
    async fn test_second_run_is_suppressed() {
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();
        let monitor = monitor(5.0, store.clone(), notifier.clone());

        let first = monitor.run().await.unwrap();
        let second = monitor.run().await.unwrap();

        assert!(matches!(first, RunOutcome::Alerted { ref threshold, .. } if threshold.label == "10"));
        // 10 is suppressed now, so the next tier fires
        assert!(matches!(second, RunOutcome::Alerted { ref threshold, .. } if threshold.label == "20"));
        let third = monitor.run().await.unwrap();
        assert_eq!(third, RunOutcome::NoAlert { balance_usd: 5.0 });

        assert_eq!(notifier.sent().len(), 2);
        assert_eq!(
            store.written_keys(),
            vec!["already_notified:10", "already_notified:20"]
        );
    }

    #[tokio::test]
    async fn test_single_threshold_alerts_once() {
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();
        let monitor = BalanceMonitor::new(
            FixedPrice(5.0),
            FixedBalance(ONE_ETH),
            store.clone(),
            notifier.clone(),
            settings("10"),
        );

        monitor.run().await.unwrap();
        let second = monitor.run().await.unwrap();

        assert_eq!(second, RunOutcome::NoAlert { balance_usd: 5.0 });
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_suppression_record_contents() {
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();

        monitor(7.5, store.clone(), notifier.clone()).run().await.unwrap();

        let writes = store.writes.lock().unwrap().clone();
        assert_eq!(
            writes,
            vec![(
                "already_notified:10".to_string(),
                "7.5".to_string(),
                Duration::from_secs(3600)
            )]
        );
        assert_eq!(
            notifier.sent(),
            vec![format!(
                "‼ Oracle admin balance too low: <b>$7.50</b>\nTop up address <code>{ADDRESS}</code>"
            )]
        );
    }

    #[tokio::test]
    async fn test_failed_notification_leaves_no_suppression() {
        let store = MemoryStore::default();

        let err = monitor(5.0, store.clone(), FailingNotifier).run().await.unwrap_err();

        assert!(matches!(err, Error::Notification(_)));
        assert!(store.written_keys().is_empty());
    }

    #[tokio::test]
    async fn test_zero_balance() {
        let store = MemoryStore::default();
        let notifier = RecordingNotifier::default();
        let monitor = BalanceMonitor::new(
            FixedPrice(3000.0),
            FixedBalance("0"),
            store.clone(),
            notifier.clone(),
            settings("10,20"),
        );

        let outcome = monitor.run().await.unwrap();

        assert!(matches!(outcome, RunOutcome::Alerted { ref threshold, balance_usd } if threshold.label == "10" && balance_usd == 0.0));
    }
}
