// ═══════════════════════════════════════════════════════════════════
// Monitoring Tests — QuoteService, monitoring cycles, session state
// machine, the indefinite loop
// ═══════════════════════════════════════════════════════════════════

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use portfolio_sentinel_core::errors::CoreError;
use portfolio_sentinel_core::models::change::ChangeResult;
use portfolio_sentinel_core::models::holding::Holding;
use portfolio_sentinel_core::models::settings::MarketConvention;
use portfolio_sentinel_core::notify::alert_message;
use portfolio_sentinel_core::notify::traits::Notifier;
use portfolio_sentinel_core::providers::registry::QuoteProviderRegistry;
use portfolio_sentinel_core::providers::traits::QuoteProvider;
use portfolio_sentinel_core::services::quote_service::QuoteService;
use portfolio_sentinel_core::{MonitorState, PortfolioSentinel};

// ═══════════════════════════════════════════════════════════════════
// Mocks
// ═══════════════════════════════════════════════════════════════════

struct MockQuoteProvider {
    prices: HashMap<String, f64>,
}

impl MockQuoteProvider {
    fn new(pairs: &[(&str, f64)]) -> Self {
        Self {
            prices: pairs.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
        }
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    fn name(&self) -> &str {
        "MockQuotes"
    }

    async fn latest_price(&self, symbol: &str) -> Result<f64, CoreError> {
        self.prices.get(symbol).copied().ok_or_else(|| CoreError::Api {
            provider: "MockQuotes".into(),
            message: format!("no quote for {symbol}"),
        })
    }
}

/// A provider that always fails (for fallback behavior).
struct FailingQuoteProvider;

#[async_trait]
impl QuoteProvider for FailingQuoteProvider {
    fn name(&self) -> &str {
        "FailingQuotes"
    }

    async fn latest_price(&self, symbol: &str) -> Result<f64, CoreError> {
        Err(CoreError::Api {
            provider: "FailingQuotes".into(),
            message: format!("simulated failure for {symbol}"),
        })
    }
}

/// A provider that returns a nonsense price (for validation behavior).
struct BogusPriceProvider(f64);

#[async_trait]
impl QuoteProvider for BogusPriceProvider {
    fn name(&self) -> &str {
        "BogusPrices"
    }

    async fn latest_price(&self, _symbol: &str) -> Result<f64, CoreError> {
        Ok(self.0)
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "Recording"
    }

    async fn deliver(&self, text: &str) -> Result<(), CoreError> {
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    fn name(&self) -> &str {
        "FailingTransport"
    }

    async fn deliver(&self, _text: &str) -> Result<(), CoreError> {
        Err(CoreError::Delivery {
            transport: "FailingTransport".into(),
            message: "simulated outage".into(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════

fn sentinel_with(prices: &[(&str, f64)], notifier: Box<dyn Notifier>) -> PortfolioSentinel {
    let mut registry = QuoteProviderRegistry::new();
    registry.register(Box::new(MockQuoteProvider::new(prices)));
    PortfolioSentinel::with_components(registry, notifier)
}

fn load_holdings(sentinel: &mut PortfolioSentinel, positions: &[(&str, f64)]) {
    let mut rows = vec![vec!["Ticker".to_string(), "Buy Price".to_string()]];
    for (symbol, price) in positions {
        rows.push(vec![symbol.to_string(), price.to_string()]);
    }
    sentinel.load_generic_rows(rows, None).unwrap();
}

fn holding(symbol: &str, acquisition_price: f64) -> Holding {
    Holding::new(symbol, acquisition_price, &MarketConvention::default())
}

// ═══════════════════════════════════════════════════════════════════
// QuoteService
// ═══════════════════════════════════════════════════════════════════

mod quote_service {
    use super::*;

    #[tokio::test]
    async fn returns_quote_with_display_symbol() {
        let mut registry = QuoteProviderRegistry::new();
        registry.register(Box::new(MockQuoteProvider::new(&[("INFY.NS", 1550.0)])));
        let service = QuoteService::new(registry);

        let h = Holding::new("INFY", 1500.0, &MarketConvention::nse());
        let quote = service.fetch_latest(&h).await.unwrap();
        // Fetched via the resolved symbol, reported under the display symbol.
        assert_eq!(quote.symbol, "INFY");
        assert_eq!(quote.price, 1550.0);
    }

    #[tokio::test]
    async fn empty_registry_is_price_unavailable() {
        let service = QuoteService::new(QuoteProviderRegistry::new());
        let result = service.fetch_latest(&holding("ABC", 100.0)).await;
        match result.unwrap_err() {
            CoreError::PriceUnavailable { symbol, reason } => {
                assert_eq!(symbol, "ABC");
                assert!(reason.contains("no quote provider"));
            }
            other => panic!("Expected PriceUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn provider_error_is_price_unavailable() {
        let mut registry = QuoteProviderRegistry::new();
        registry.register(Box::new(FailingQuoteProvider));
        let service = QuoteService::new(registry);

        let result = service.fetch_latest(&holding("ABC", 100.0)).await;
        assert!(matches!(result, Err(CoreError::PriceUnavailable { .. })));
    }

    #[tokio::test]
    async fn falls_back_to_next_provider() {
        let mut registry = QuoteProviderRegistry::new();
        registry.register(Box::new(FailingQuoteProvider));
        registry.register(Box::new(MockQuoteProvider::new(&[("ABC", 84.0)])));
        let service = QuoteService::new(registry);

        let quote = service.fetch_latest(&holding("ABC", 100.0)).await.unwrap();
        assert_eq!(quote.price, 84.0);
    }

    #[tokio::test]
    async fn invalid_prices_rejected() {
        for bogus in [0.0, -3.5, f64::NAN, f64::INFINITY] {
            let mut registry = QuoteProviderRegistry::new();
            registry.register(Box::new(BogusPriceProvider(bogus)));
            let service = QuoteService::new(registry);

            let result = service.fetch_latest(&holding("ABC", 100.0)).await;
            assert!(
                matches!(result, Err(CoreError::PriceUnavailable { .. })),
                "price {bogus} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn bogus_price_falls_back_to_valid_provider() {
        let mut registry = QuoteProviderRegistry::new();
        registry.register(Box::new(BogusPriceProvider(-1.0)));
        registry.register(Box::new(MockQuoteProvider::new(&[("ABC", 84.0)])));
        let service = QuoteService::new(registry);

        let quote = service.fetch_latest(&holding("ABC", 100.0)).await.unwrap();
        assert_eq!(quote.price, 84.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Cycle semantics — threshold crossings and dedup
// ═══════════════════════════════════════════════════════════════════

mod cycle_alerts {
    use super::*;

    #[tokio::test]
    async fn loss_crossing_fires_alert() {
        // Scenario: acquisition 100, quote 84, thresholds 15/115 (defaults).
        let recorder = RecordingNotifier::default();
        let mut sentinel = sentinel_with(&[("ABC", 84.0)], Box::new(recorder.clone()));
        load_holdings(&mut sentinel, &[("ABC", 100.0)]);
        sentinel.start_monitoring().unwrap();

        let snapshot = sentinel.run_cycle().await.unwrap();
        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(snapshot.rows[0].percent_change, -16.0);
        assert_eq!(snapshot.alerts_fired, vec!["ABC".to_string()]);
        assert_eq!(sentinel.alerted_symbols(), vec!["ABC".to_string()]);

        let messages = recorder.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("ABC"));
        assert!(messages[0].contains("-16.00%"));
        assert!(messages[0].contains("84.00"));
    }

    #[tokio::test]
    async fn change_inside_band_stays_quiet() {
        // Scenario: quote 90 → -10%, inside the 15/115 band.
        let recorder = RecordingNotifier::default();
        let mut sentinel = sentinel_with(&[("ABC", 90.0)], Box::new(recorder.clone()));
        load_holdings(&mut sentinel, &[("ABC", 100.0)]);
        sentinel.start_monitoring().unwrap();

        let snapshot = sentinel.run_cycle().await.unwrap();
        assert_eq!(snapshot.rows[0].percent_change, -10.0);
        assert!(snapshot.alerts_fired.is_empty());
        assert!(recorder.messages().is_empty());
    }

    #[tokio::test]
    async fn no_second_alert_for_same_symbol() {
        // Scenario: symbol already alerted, price still past the threshold.
        let recorder = RecordingNotifier::default();
        let mut sentinel = sentinel_with(&[("ABC", 84.0)], Box::new(recorder.clone()));
        load_holdings(&mut sentinel, &[("ABC", 100.0)]);
        sentinel.start_monitoring().unwrap();

        for _ in 0..5 {
            sentinel.run_cycle().await.unwrap();
        }
        assert_eq!(recorder.messages().len(), 1);
    }

    #[tokio::test]
    async fn profit_crossing_fires_alert() {
        let recorder = RecordingNotifier::default();
        let mut sentinel = sentinel_with(&[("ABC", 230.0)], Box::new(recorder.clone()));
        load_holdings(&mut sentinel, &[("ABC", 100.0)]);
        sentinel.start_monitoring().unwrap();

        let snapshot = sentinel.run_cycle().await.unwrap();
        assert_eq!(snapshot.rows[0].percent_change, 130.0);
        assert_eq!(snapshot.alerts_fired.len(), 1);
    }

    #[tokio::test]
    async fn exact_boundaries_fire() {
        let recorder = RecordingNotifier::default();
        let mut sentinel =
            sentinel_with(&[("LOSS", 85.0), ("GAIN", 215.0)], Box::new(recorder.clone()));
        load_holdings(&mut sentinel, &[("LOSS", 100.0), ("GAIN", 100.0)]);
        sentinel.start_monitoring().unwrap();

        let snapshot = sentinel.run_cycle().await.unwrap();
        // -15.0 and +115.0 land exactly on the default thresholds.
        assert_eq!(
            snapshot.alerts_fired,
            vec!["LOSS".to_string(), "GAIN".to_string()]
        );
    }

    #[tokio::test]
    async fn delivery_failure_still_records_alert() {
        let mut sentinel = sentinel_with(&[("ABC", 84.0)], Box::new(FailingNotifier));
        load_holdings(&mut sentinel, &[("ABC", 100.0)]);
        sentinel.start_monitoring().unwrap();

        // The transport outage is non-fatal and the crossing is recorded,
        // so later cycles do not retry the same alert.
        let first = sentinel.run_cycle().await.unwrap();
        assert_eq!(first.alerts_fired, vec!["ABC".to_string()]);

        let second = sentinel.run_cycle().await.unwrap();
        assert!(second.alerts_fired.is_empty());
        assert_eq!(sentinel.alerted_symbols(), vec!["ABC".to_string()]);
    }

    #[tokio::test]
    async fn thresholds_reread_each_cycle() {
        let recorder = RecordingNotifier::default();
        let mut sentinel = sentinel_with(&[("ABC", 90.0)], Box::new(recorder.clone()));
        load_holdings(&mut sentinel, &[("ABC", 100.0)]);
        sentinel.start_monitoring().unwrap();

        let quiet = sentinel.run_cycle().await.unwrap();
        assert!(quiet.alerts_fired.is_empty());

        // Tightening the loss bound mid-session takes effect next cycle.
        sentinel.set_thresholds(5.0, 115.0).unwrap();
        let alerted = sentinel.run_cycle().await.unwrap();
        assert_eq!(alerted.alerts_fired, vec!["ABC".to_string()]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Cycle semantics — partial failure and ordering
// ═══════════════════════════════════════════════════════════════════

mod cycle_resilience {
    use super::*;

    #[tokio::test]
    async fn one_failing_fetch_does_not_stop_the_batch() {
        // Scenario: two holdings, one quote unavailable.
        let recorder = RecordingNotifier::default();
        let mut sentinel = sentinel_with(&[("ABC", 84.0)], Box::new(recorder.clone()));
        load_holdings(&mut sentinel, &[("XYZ", 50.0), ("ABC", 100.0)]);
        sentinel.start_monitoring().unwrap();

        let snapshot = sentinel.run_cycle().await.unwrap();
        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(snapshot.rows[0].symbol, "ABC");
        assert_eq!(snapshot.skipped, vec!["XYZ".to_string()]);
    }

    #[tokio::test]
    async fn all_fetches_failing_still_completes() {
        let mut sentinel = sentinel_with(&[], Box::new(RecordingNotifier::default()));
        load_holdings(&mut sentinel, &[("A", 10.0), ("B", 20.0), ("C", 30.0)]);
        sentinel.start_monitoring().unwrap();

        let snapshot = sentinel.run_cycle().await.unwrap();
        assert!(snapshot.rows.is_empty());
        assert_eq!(snapshot.skipped.len(), 3);
    }

    #[tokio::test]
    async fn skipped_holding_recovers_next_cycle_state_intact() {
        // A holding skipped one cycle is evaluated again the next; skipping
        // never records anything in the alert state.
        let mut sentinel = sentinel_with(&[], Box::new(RecordingNotifier::default()));
        load_holdings(&mut sentinel, &[("ABC", 100.0)]);
        sentinel.start_monitoring().unwrap();

        let snapshot = sentinel.run_cycle().await.unwrap();
        assert_eq!(snapshot.skipped.len(), 1);
        assert!(sentinel.alerted_symbols().is_empty());
    }

    #[tokio::test]
    async fn holdings_evaluated_in_canonical_order() {
        let prices = [("AAA", 10.0), ("BBB", 20.0), ("CCC", 30.0)];
        let mut sentinel = sentinel_with(&prices, Box::new(RecordingNotifier::default()));
        load_holdings(&mut sentinel, &[("CCC", 30.0), ("AAA", 10.0), ("BBB", 20.0)]);
        sentinel.start_monitoring().unwrap();

        let snapshot = sentinel.run_cycle().await.unwrap();
        let order: Vec<&str> = snapshot.rows.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["CCC", "AAA", "BBB"]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Session state machine
// ═══════════════════════════════════════════════════════════════════

mod session_lifecycle {
    use super::*;

    #[tokio::test]
    async fn cycle_requires_running_state() {
        let mut sentinel = sentinel_with(&[("ABC", 84.0)], Box::new(RecordingNotifier::default()));
        load_holdings(&mut sentinel, &[("ABC", 100.0)]);

        let result = sentinel.run_cycle().await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }

    #[test]
    fn start_without_holdings_fails() {
        let mut sentinel = sentinel_with(&[], Box::new(RecordingNotifier::default()));
        assert!(matches!(
            sentinel.start_monitoring(),
            Err(CoreError::ValidationError(_))
        ));
        assert_eq!(sentinel.state(), MonitorState::Idle);
    }

    #[test]
    fn start_and_stop_transitions() {
        let mut sentinel = sentinel_with(&[], Box::new(RecordingNotifier::default()));
        load_holdings(&mut sentinel, &[("ABC", 100.0)]);
        assert_eq!(sentinel.state(), MonitorState::Idle);

        sentinel.start_monitoring().unwrap();
        assert_eq!(sentinel.state(), MonitorState::Running);

        sentinel.stop_monitoring();
        assert_eq!(sentinel.state(), MonitorState::Idle);
    }

    #[tokio::test]
    async fn fresh_upload_resets_session() {
        let recorder = RecordingNotifier::default();
        let mut sentinel = sentinel_with(&[("ABC", 84.0)], Box::new(recorder.clone()));
        load_holdings(&mut sentinel, &[("ABC", 100.0)]);
        sentinel.start_monitoring().unwrap();
        sentinel.run_cycle().await.unwrap();
        assert_eq!(sentinel.alerted_symbols().len(), 1);

        // Re-upload while running: back to Idle, dedup memory cleared,
        // restart required.
        load_holdings(&mut sentinel, &[("ABC", 100.0)]);
        assert_eq!(sentinel.state(), MonitorState::Idle);
        assert!(sentinel.alerted_symbols().is_empty());
        assert!(sentinel.run_cycle().await.is_err());

        // The new session may alert the same symbol again.
        sentinel.start_monitoring().unwrap();
        sentinel.run_cycle().await.unwrap();
        assert_eq!(recorder.messages().len(), 2);
    }

    #[tokio::test]
    async fn restart_clears_alert_memory() {
        let recorder = RecordingNotifier::default();
        let mut sentinel = sentinel_with(&[("ABC", 84.0)], Box::new(recorder.clone()));
        load_holdings(&mut sentinel, &[("ABC", 100.0)]);

        sentinel.start_monitoring().unwrap();
        sentinel.run_cycle().await.unwrap();
        sentinel.stop_monitoring();

        sentinel.start_monitoring().unwrap();
        assert!(sentinel.alerted_symbols().is_empty());
        sentinel.run_cycle().await.unwrap();
        assert_eq!(recorder.messages().len(), 2);
    }

    #[test]
    fn threshold_validation() {
        let mut sentinel = sentinel_with(&[], Box::new(RecordingNotifier::default()));
        assert!(sentinel.set_thresholds(0.0, 115.0).is_err());
        assert!(sentinel.set_thresholds(15.0, -1.0).is_err());
        assert!(sentinel.set_thresholds(f64::NAN, 115.0).is_err());
        assert!(sentinel.set_thresholds(10.0, 50.0).is_ok());
        assert_eq!(sentinel.settings().thresholds.loss_threshold_percent, 10.0);
    }

    #[test]
    fn poll_interval_validation() {
        let mut sentinel = sentinel_with(&[], Box::new(RecordingNotifier::default()));
        assert!(sentinel.set_poll_interval(0).is_err());
        assert!(sentinel.set_poll_interval(30).is_ok());
        assert_eq!(sentinel.settings().poll_interval_secs, 30);
    }
}

// ═══════════════════════════════════════════════════════════════════
// The indefinite loop
// ═══════════════════════════════════════════════════════════════════

mod monitoring_loop {
    use super::*;

    #[tokio::test]
    async fn run_requires_running_state() {
        let mut sentinel = sentinel_with(&[], Box::new(RecordingNotifier::default()));
        let (_tx, rx) = watch::channel(false);
        let result = sentinel.run(rx, |_| {}).await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn stop_signal_ends_the_loop() {
        let mut sentinel = sentinel_with(&[("ABC", 84.0)], Box::new(RecordingNotifier::default()));
        load_holdings(&mut sentinel, &[("ABC", 100.0)]);
        sentinel.start_monitoring().unwrap();

        let (tx, rx) = watch::channel(false);
        let mut snapshots = Vec::new();
        sentinel
            .run(rx, |snapshot| {
                snapshots.push(snapshot);
                // Cancel during the first inter-cycle sleep.
                let _ = tx.send(true);
            })
            .await
            .unwrap();

        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].rows.len(), 1);
        // The loop exits without tearing the session down.
        assert_eq!(sentinel.state(), MonitorState::Running);
    }

    #[tokio::test]
    async fn pre_set_stop_signal_prevents_any_cycle() {
        let recorder = RecordingNotifier::default();
        let mut sentinel = sentinel_with(&[("ABC", 84.0)], Box::new(recorder.clone()));
        load_holdings(&mut sentinel, &[("ABC", 100.0)]);
        sentinel.start_monitoring().unwrap();

        let (_tx, rx) = watch::channel(true);
        sentinel.run(rx, |_| panic!("no cycle should run")).await.unwrap();
        assert!(recorder.messages().is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Alert message convention
// ═══════════════════════════════════════════════════════════════════

mod message_format {
    use super::*;

    #[test]
    fn two_decimal_precision() {
        let change = ChangeResult {
            symbol: "ABC".into(),
            acquisition_price: 100.0,
            current_price: 84.0,
            percent_change: -16.0,
        };
        let message = alert_message(&change);
        assert!(message.contains("ABC"));
        assert!(message.contains("Move: -16.00%"));
        assert!(message.contains("Price: 84.00"));
    }

    #[test]
    fn rounds_to_two_decimals() {
        let change = ChangeResult {
            symbol: "TCS".into(),
            acquisition_price: 3.0,
            current_price: 4.0,
            percent_change: 100.0 / 3.0,
        };
        let message = alert_message(&change);
        assert!(message.contains("33.33%"));
        assert!(message.contains("4.00"));
    }
}
