pub mod errors;
pub mod ingest;
pub mod models;
pub mod notify;
pub mod providers;
pub mod services;

use std::time::Duration;

use tokio::sync::watch;

use errors::CoreError;
use ingest::broker;
use ingest::generic::{self, GenericColumns};
use ingest::RawTable;
use models::alert::AlertState;
use models::holding::Holding;
use models::settings::{MarketConvention, MonitorSettings};
use models::snapshot::CycleSnapshot;
use notify::telegram::TelegramNotifier;
use notify::traits::Notifier;
use providers::registry::QuoteProviderRegistry;
use services::monitor_service::MonitorService;
use services::quote_service::QuoteService;

/// Lifecycle state of the monitoring engine.
///
/// `Cycling` is the transient in-pass state between two `Running`
/// observations; a fresh upload from any state resets to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
    Cycling,
}

impl std::fmt::Display for MonitorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorState::Idle => write!(f, "Idle"),
            MonitorState::Running => write!(f, "Running"),
            MonitorState::Cycling => write!(f, "Cycling"),
        }
    }
}

/// Main entry point for the Portfolio Sentinel core library.
/// Holds the canonical holdings list, the monitoring session state, and the
/// services needed to operate on them.
#[must_use]
pub struct PortfolioSentinel {
    holdings: Vec<Holding>,
    settings: MonitorSettings,
    quote_service: QuoteService,
    monitor_service: MonitorService,
    notifier: Box<dyn Notifier>,
    alerts: AlertState,
    state: MonitorState,
}

impl std::fmt::Debug for PortfolioSentinel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioSentinel")
            .field("holdings", &self.holdings.len())
            .field("settings", &self.settings)
            .field("notifier", &self.notifier.name())
            .field("alerts_fired", &self.alerts.fired_count())
            .field("state", &self.state)
            .finish()
    }
}

impl PortfolioSentinel {
    /// Create a sentinel with the default provider registry (Yahoo Finance)
    /// and a Telegram notifier configured from the environment.
    pub fn new() -> Self {
        Self::with_components(
            QuoteProviderRegistry::new_with_defaults(),
            Box::new(TelegramNotifier::from_env()),
        )
    }

    /// Create a sentinel with explicit components (custom providers, other
    /// transports, test doubles).
    pub fn with_components(registry: QuoteProviderRegistry, notifier: Box<dyn Notifier>) -> Self {
        Self {
            holdings: Vec::new(),
            settings: MonitorSettings::default(),
            quote_service: QuoteService::new(registry),
            monitor_service: MonitorService::new(),
            notifier,
            alerts: AlertState::new(),
            state: MonitorState::Idle,
        }
    }

    // ── Ingestion ───────────────────────────────────────────────────

    /// Load a fixed-layout broker export from CSV bytes.
    /// Returns the number of holdings retained.
    pub fn load_broker_csv(&mut self, bytes: &[u8]) -> Result<usize, CoreError> {
        let table = RawTable::from_csv_bytes(bytes)?;
        let holdings = broker::parse_broker_export(&table, &self.settings.convention)?;
        Ok(self.install_holdings(holdings))
    }

    /// Load a fixed-layout broker export from pre-decoded rows (e.g., an
    /// XLSX grid decoded by the host).
    pub fn load_broker_rows(&mut self, rows: Vec<Vec<String>>) -> Result<usize, CoreError> {
        let table = RawTable::from_rows(rows);
        let holdings = broker::parse_broker_export(&table, &self.settings.convention)?;
        Ok(self.install_holdings(holdings))
    }

    /// Load a generic spreadsheet from CSV bytes, detecting the ticker and
    /// price columns unless an explicit selection is given.
    ///
    /// Ambiguous detection surfaces [`CoreError::AmbiguousColumn`] with the
    /// candidate headers; call again with `Some(columns)` to disambiguate.
    pub fn load_generic_csv(
        &mut self,
        bytes: &[u8],
        columns: Option<GenericColumns>,
    ) -> Result<usize, CoreError> {
        let table = RawTable::from_csv_bytes(bytes)?;
        let holdings = generic::parse_generic(&table, columns, &self.settings.convention)?;
        Ok(self.install_holdings(holdings))
    }

    /// Load a generic spreadsheet from pre-decoded rows.
    pub fn load_generic_rows(
        &mut self,
        rows: Vec<Vec<String>>,
        columns: Option<GenericColumns>,
    ) -> Result<usize, CoreError> {
        let table = RawTable::from_rows(rows);
        let holdings = generic::parse_generic(&table, columns, &self.settings.convention)?;
        Ok(self.install_holdings(holdings))
    }

    /// Detect ticker/price columns in a generic header row without loading
    /// anything.
    pub fn detect_generic_columns(headers: &[String]) -> Result<GenericColumns, CoreError> {
        GenericColumns::detect(headers)
    }

    /// The canonical holdings list from the last successful upload.
    #[must_use]
    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    // ── Monitoring Lifecycle ────────────────────────────────────────

    /// Start a monitoring session: requires a non-empty holdings list and
    /// installs a fresh, empty alert state. Restarting an already-running
    /// session also clears prior alert memory.
    pub fn start_monitoring(&mut self) -> Result<(), CoreError> {
        if self.holdings.is_empty() {
            return Err(CoreError::ValidationError(
                "cannot start monitoring without holdings — upload an export first".into(),
            ));
        }
        self.alerts = AlertState::new();
        self.state = MonitorState::Running;
        Ok(())
    }

    /// Stop the session and return to `Idle`.
    pub fn stop_monitoring(&mut self) {
        self.state = MonitorState::Idle;
    }

    #[must_use]
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Execute one monitoring cycle: a complete pass over the holdings in
    /// canonical order. Only valid while `Running`; the state reads
    /// `Cycling` for the duration of the pass.
    ///
    /// Thresholds are read from the current settings on every call, so
    /// host-side changes apply from the next cycle onward.
    pub async fn run_cycle(&mut self) -> Result<CycleSnapshot, CoreError> {
        if self.state != MonitorState::Running {
            return Err(CoreError::ValidationError(format!(
                "cannot run a cycle from state {}",
                self.state
            )));
        }
        self.state = MonitorState::Cycling;
        let snapshot = self
            .monitor_service
            .run_cycle(
                &self.holdings,
                &self.quote_service,
                self.notifier.as_ref(),
                &self.settings.thresholds,
                &mut self.alerts,
            )
            .await;
        self.state = MonitorState::Running;
        Ok(snapshot)
    }

    /// Run the indefinite poll-sleep loop: cycle, hand the snapshot to
    /// `on_cycle`, sleep for the poll interval, repeat.
    ///
    /// The loop has no natural termination. It stops when the `stop` signal
    /// turns true — checked at every cycle boundary and honored during the
    /// sleep as well — or when the sender side of the signal is dropped.
    pub async fn run<F>(
        &mut self,
        mut stop: watch::Receiver<bool>,
        mut on_cycle: F,
    ) -> Result<(), CoreError>
    where
        F: FnMut(CycleSnapshot),
    {
        if self.state != MonitorState::Running {
            return Err(CoreError::ValidationError(format!(
                "cannot run the monitoring loop from state {}",
                self.state
            )));
        }

        loop {
            if *stop.borrow() {
                break;
            }

            let snapshot = self.run_cycle().await?;
            on_cycle(snapshot);

            let interval = Duration::from_secs(self.settings.poll_interval_secs);
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Symbols that have already alerted in the current session, sorted.
    #[must_use]
    pub fn alerted_symbols(&self) -> Vec<String> {
        self.alerts.fired_symbols()
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Set the loss/profit thresholds (both in percent, both positive).
    pub fn set_thresholds(&mut self, loss_percent: f64, profit_percent: f64) -> Result<(), CoreError> {
        if !loss_percent.is_finite() || loss_percent <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "loss threshold must be a positive percentage, got {loss_percent}"
            )));
        }
        if !profit_percent.is_finite() || profit_percent <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "profit threshold must be a positive percentage, got {profit_percent}"
            )));
        }
        self.settings.thresholds.loss_threshold_percent = loss_percent;
        self.settings.thresholds.profit_threshold_percent = profit_percent;
        Ok(())
    }

    /// Set the inter-cycle sleep interval in seconds (must be positive).
    pub fn set_poll_interval(&mut self, secs: u64) -> Result<(), CoreError> {
        if secs == 0 {
            return Err(CoreError::ValidationError(
                "poll interval must be at least one second".into(),
            ));
        }
        self.settings.poll_interval_secs = secs;
        Ok(())
    }

    /// Set the market convention used to resolve lookup symbols. Applies to
    /// future uploads: resolved symbols are stamped on holdings at ingestion
    /// time.
    pub fn set_market_convention(&mut self, convention: MarketConvention) {
        self.settings.convention = convention;
    }

    // ── Providers ───────────────────────────────────────────────────

    /// Names of the registered quote providers, in priority order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.quote_service.provider_names()
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Replace the canonical list wholesale. A fresh upload always drops
    /// back to `Idle` and clears alert memory; monitoring must be restarted
    /// explicitly on the new list.
    fn install_holdings(&mut self, holdings: Vec<Holding>) -> usize {
        self.holdings = holdings;
        self.alerts.clear();
        self.state = MonitorState::Idle;
        self.holdings.len()
    }
}

impl Default for PortfolioSentinel {
    fn default() -> Self {
        Self::new()
    }
}
