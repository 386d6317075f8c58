use async_trait::async_trait;

use super::traits::QuoteProvider;
use crate::errors::CoreError;

/// Yahoo Finance provider for latest stock/equity quotes.
///
/// - **Free**: No API key required.
/// - **Coverage**: Global equities, including NSE symbols via the `.NS`
///   suffix convention.
/// - **Data**: the latest daily close from the `1d` quote window, which is
///   the most reliable "current price" signal Yahoo exposes.
///
/// Uses the `yahoo_finance_api` crate which wraps Yahoo Finance's public
/// endpoints.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to create connector: {e}"),
            })?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn latest_price(&self, symbol: &str) -> Result<f64, CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to fetch latest quote for {symbol}: {e}"),
            })?;

        let quote = resp.last_quote().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("No quote data for {symbol}: {e}"),
        })?;

        Ok(quote.close)
    }
}
