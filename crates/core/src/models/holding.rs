use serde::{Deserialize, Serialize};

use super::settings::MarketConvention;

/// One tracked position from a brokerage export.
///
/// Created once at ingestion time and never mutated afterwards; the canonical
/// holdings list is only ever replaced wholesale by a fresh upload.
///
/// **Equality and hashing** are based solely on `symbol`, which is also the
/// alert-deduplication key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol as given by the broker, trimmed and upper-cased
    /// (e.g., "INFY", "TCS"). Display and dedup key.
    pub symbol: String,

    /// Symbol adapted for provider lookup (e.g., "INFY.NS"). Derived from
    /// `symbol` via the configured market convention; never set directly.
    pub resolved_symbol: String,

    /// Average acquisition price. Strictly positive: the parser excludes
    /// rows that would yield a zero or undefined price.
    pub acquisition_price: f64,
}

impl PartialEq for Holding {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for Holding {}

impl std::hash::Hash for Holding {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
    }
}

impl Holding {
    pub fn new(
        raw_symbol: impl AsRef<str>,
        acquisition_price: f64,
        convention: &MarketConvention,
    ) -> Self {
        let symbol = raw_symbol.as_ref().trim().to_uppercase();
        let resolved_symbol = convention.resolve(&symbol);
        Self {
            symbol,
            resolved_symbol,
            acquisition_price,
        }
    }
}
