//! Alert threshold model

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A USD balance floor.
///
/// `label` is the threshold exactly as configured and is what suppression keys
/// are built from, so `"10"` and `"10.0"` are distinct thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    /// Configured text, trimmed
    pub label: String,
    /// Parsed USD value
    pub usd: f64,
}

impl Threshold {
    /// Parse a single configured threshold
    pub fn parse(raw: &str) -> Result<Self> {
        let label = raw.trim();
        let usd: f64 = label
            .parse()
            .map_err(|_| Error::config(format!("invalid notification threshold {raw:?}")))?;

        if !usd.is_finite() {
            return Err(Error::config(format!(
                "notification threshold must be finite, got {raw:?}"
            )));
        }

        Ok(Self {
            label: label.to_string(),
            usd,
        })
    }

    /// Parse a comma-separated threshold list, keeping configured order
    pub fn parse_list(raw: &str) -> Result<Vec<Self>> {
        let thresholds = raw
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Self::parse)
            .collect::<Result<Vec<_>>>()?;

        if thresholds.is_empty() {
            return Err(Error::config("NOTIFICATION_THRESHOLD_USD is empty"));
        }

        Ok(thresholds)
    }

    /// Strictly below the floor; equality is not a breach
    pub fn is_breached_by(&self, balance_usd: f64) -> bool {
        balance_usd < self.usd
    }
}
