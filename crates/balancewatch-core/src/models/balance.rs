//! Balance and run outcome models

use crate::error::{Error, Result};
use super::Threshold;

/// Wei per ETH (18 decimals)
pub const WEI_PER_ETH: f64 = 1e18;

/// Parse the explorer's balance string into wei
pub fn parse_balance(raw: &str) -> Result<u128> {
    raw.trim()
        .parse::<u128>()
        .map_err(|_| Error::InvalidBalance(raw.to_string()))
}

/// Convert a wei balance to USD at the given ETH price
pub fn balance_to_usd(balance_wei: u128, eth_usd_price: f64) -> f64 {
    balance_wei as f64 * eth_usd_price / WEI_PER_ETH
}

/// What a single monitoring run did
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// An alert was sent and the threshold suppressed
    Alerted {
        /// Threshold that fired
        threshold: Threshold,
        /// Balance at alert time
        balance_usd: f64,
    },
    /// Nothing to send: no breach, or every breach already suppressed
    NoAlert {
        /// Observed balance
        balance_usd: f64,
    },
}
