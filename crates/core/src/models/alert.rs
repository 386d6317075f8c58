use std::collections::HashSet;

use super::settings::ThresholdConfig;

/// Process-lifetime record of which holdings have already fired an alert
/// during the current monitoring session.
///
/// Guarantees at-most-one alert per symbol per session: a symbol is added
/// exactly once, on the first cycle its change crosses a threshold, and is
/// never removed while the session lasts. Starting a new session (fresh
/// upload or explicit restart) replaces the state wholesale.
///
/// Only the monitoring loop writes to this, and only through `record`.
#[derive(Debug, Clone, Default)]
pub struct AlertState {
    fired: HashSet<String>,
}

impl AlertState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether a threshold crossing should fire an alert.
    ///
    /// Fires iff `percent_change <= -loss_threshold` or
    /// `percent_change >= profit_threshold` — both comparisons inclusive, so
    /// a change landing exactly on a boundary counts as crossing — and the
    /// symbol has not alerted before in this session.
    ///
    /// Read-only and idempotent: calling twice with unchanged state returns
    /// the same answer. Only `record` changes the outcome.
    pub fn should_alert(
        &self,
        symbol: &str,
        percent_change: f64,
        thresholds: &ThresholdConfig,
    ) -> bool {
        let crossed = percent_change <= -thresholds.loss_threshold_percent
            || percent_change >= thresholds.profit_threshold_percent;
        crossed && !self.has_fired(symbol)
    }

    /// Mark a symbol as alerted. The sole mutation path.
    pub fn record(&mut self, symbol: &str) {
        self.fired.insert(symbol.trim().to_uppercase());
    }

    pub fn has_fired(&self, symbol: &str) -> bool {
        self.fired.contains(&symbol.trim().to_uppercase())
    }

    /// Symbols that have alerted this session, in sorted order.
    pub fn fired_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.fired.iter().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn fired_count(&self) -> usize {
        self.fired.len()
    }

    pub fn clear(&mut self) {
        self.fired.clear();
    }
}
