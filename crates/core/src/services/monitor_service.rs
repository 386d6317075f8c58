use log::{debug, warn};

use crate::models::alert::AlertState;
use crate::models::change::ChangeResult;
use crate::models::holding::Holding;
use crate::models::settings::ThresholdConfig;
use crate::models::snapshot::CycleSnapshot;
use crate::notify::alert_message;
use crate::notify::traits::Notifier;

use super::quote_service::QuoteService;

/// Executes monitoring cycles over the canonical holdings list.
///
/// Partial-failure policy: one bad ticker must never stop the batch. A
/// holding whose quote is unavailable is skipped for that cycle only and the
/// pass continues; nothing a single holding does can abort a cycle.
pub struct MonitorService;

impl MonitorService {
    pub fn new() -> Self {
        Self
    }

    /// One complete pass over the holdings, in canonical list order.
    ///
    /// Per holding: fetch the latest quote (skip on failure), evaluate the
    /// change, and on a first threshold crossing deliver a notification and
    /// record the symbol. The alert is recorded even when delivery fails, so
    /// the at-most-one-alert guarantee holds under a broken transport
    /// instead of re-alerting every cycle.
    pub async fn run_cycle(
        &self,
        holdings: &[Holding],
        quotes: &QuoteService,
        notifier: &dyn Notifier,
        thresholds: &ThresholdConfig,
        alerts: &mut AlertState,
    ) -> CycleSnapshot {
        let mut snapshot = CycleSnapshot::new();

        for holding in holdings {
            let quote = match quotes.fetch_latest(holding).await {
                Ok(quote) => quote,
                Err(e) => {
                    debug!("skipping {} this cycle: {e}", holding.symbol);
                    snapshot.skipped.push(holding.symbol.clone());
                    continue;
                }
            };

            let change = ChangeResult::between(holding, &quote);

            if alerts.should_alert(&holding.symbol, change.percent_change, thresholds) {
                let message = alert_message(&change);
                if let Err(e) = notifier.deliver(&message).await {
                    warn!("{} delivery failed for {}: {e}", notifier.name(), holding.symbol);
                }
                alerts.record(&holding.symbol);
                snapshot.alerts_fired.push(holding.symbol.clone());
            }

            snapshot.rows.push(change);
        }

        snapshot
    }
}

impl Default for MonitorService {
    fn default() -> Self {
        Self::new()
    }
}
