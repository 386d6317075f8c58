use serde::{Deserialize, Serialize};

/// Loss/profit alert bounds, in percent. Both values are positive; the loss
/// threshold is interpreted as a negative bound (a change of `-loss` or
/// worse fires).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub loss_threshold_percent: f64,
    pub profit_threshold_percent: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            loss_threshold_percent: 15.0,
            profit_threshold_percent: 115.0,
        }
    }
}

/// How a raw broker symbol is adapted for provider lookup.
///
/// The mapping is a pure function of the raw symbol: append the configured
/// exchange suffix unless the symbol already carries one (contains a `.`).
/// With no suffix configured, symbols pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketConvention {
    pub exchange_suffix: Option<String>,
}

impl MarketConvention {
    pub fn with_suffix(suffix: impl Into<String>) -> Self {
        Self {
            exchange_suffix: Some(suffix.into()),
        }
    }

    /// NSE convention used by Zerodha exports: "INFY" → "INFY.NS".
    pub fn nse() -> Self {
        Self::with_suffix(".NS")
    }

    pub fn resolve(&self, symbol: &str) -> String {
        match &self.exchange_suffix {
            Some(suffix) if !symbol.contains('.') => format!("{symbol}{suffix}"),
            _ => symbol.to_string(),
        }
    }
}

/// Monitoring configuration, supplied by the host UI and read-only to the
/// core. The loop re-reads thresholds from here every cycle rather than
/// caching them, so host-side changes take effect on the next cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorSettings {
    pub thresholds: ThresholdConfig,
    /// Fixed inter-cycle sleep, in seconds.
    pub poll_interval_secs: u64,
    pub convention: MarketConvention,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::default(),
            poll_interval_secs: 60,
            convention: MarketConvention::default(),
        }
    }
}
