use chrono::Utc;

use crate::errors::CoreError;
use crate::models::change::PriceQuote;
use crate::models::holding::Holding;
use crate::providers::registry::QuoteProviderRegistry;

/// Fetches the latest price for a holding from the configured providers.
///
/// Providers are tried in registration order; the first valid price wins.
/// Every failure mode — provider error, empty registry, non-finite or
/// non-positive price — collapses into [`CoreError::PriceUnavailable`] so
/// the monitoring loop branches on a single typed outcome instead of
/// catching provider-specific errors.
///
/// No retry here: one provider pass per call. The loop's per-holding
/// failure handling owns any retry policy.
pub struct QuoteService {
    registry: QuoteProviderRegistry,
}

impl QuoteService {
    pub fn new(registry: QuoteProviderRegistry) -> Self {
        Self { registry }
    }

    /// Names of the registered providers, in priority order.
    pub fn provider_names(&self) -> Vec<String> {
        self.registry
            .providers()
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Fetch the latest quote for a holding, using its resolved lookup
    /// symbol. The returned quote carries the display symbol.
    pub async fn fetch_latest(&self, holding: &Holding) -> Result<PriceQuote, CoreError> {
        if self.registry.is_empty() {
            return Err(CoreError::PriceUnavailable {
                symbol: holding.symbol.clone(),
                reason: "no quote provider registered".into(),
            });
        }

        let mut last_error: Option<CoreError> = None;
        for provider in self.registry.providers() {
            match provider.latest_price(&holding.resolved_symbol).await {
                Ok(price) if price.is_finite() && price > 0.0 => {
                    return Ok(PriceQuote {
                        symbol: holding.symbol.clone(),
                        price,
                        observed_at: Utc::now(),
                    });
                }
                Ok(price) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!(
                            "invalid price {price} for {} (must be finite and positive)",
                            holding.resolved_symbol
                        ),
                    });
                }
                Err(e) => {
                    last_error = Some(e);
                    // Try next provider
                }
            }
        }

        let reason = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no provider returned a quote".into());
        Err(CoreError::PriceUnavailable {
            symbol: holding.symbol.clone(),
            reason,
        })
    }
}
