use async_trait::async_trait;

use crate::errors::CoreError;

/// Trait abstraction for market-data providers.
///
/// The monitor needs exactly one capability — the latest price for a
/// resolved lookup symbol. Provider quirks (field names, suffix handling,
/// transient failures) stay behind this seam; if an API stops working or
/// changes, only its implementation is replaced.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Latest available trade/close price for a resolved symbol.
    ///
    /// One attempt per call — retry policy, if any, belongs to the caller.
    async fn latest_price(&self, symbol: &str) -> Result<f64, CoreError>;
}
