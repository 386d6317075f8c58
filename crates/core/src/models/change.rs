use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::holding::Holding;

/// A single latest-price observation for one holding.
///
/// Produced fresh each cycle and not retained beyond it — only the latest
/// observation matters to the monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub symbol: String,
    /// Latest trade/close price. Finite and strictly positive
    /// (validated by the quote service).
    pub price: f64,
    pub observed_at: DateTime<Utc>,
}

/// Percentage gain/loss of one holding versus its acquisition price,
/// derived per holding per cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeResult {
    pub symbol: String,
    pub acquisition_price: f64,
    pub current_price: f64,
    /// `(current - acquisition) / acquisition * 100`
    pub percent_change: f64,
}

impl ChangeResult {
    /// Evaluate a holding against a fresh quote. Pure, no I/O.
    ///
    /// Precondition: `holding.acquisition_price > 0`, guaranteed by the
    /// ingestion layer (rows with zero quantity never become holdings).
    pub fn between(holding: &Holding, quote: &PriceQuote) -> Self {
        let percent_change = (quote.price - holding.acquisition_price)
            / holding.acquisition_price
            * 100.0;
        Self {
            symbol: holding.symbol.clone(),
            acquisition_price: holding.acquisition_price,
            current_price: quote.price,
            percent_change,
        }
    }
}
