use thiserror::Error;

/// Unified error type for the entire portfolio-sentinel-core library.
/// Every public fallible function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Ingestion ───────────────────────────────────────────────────
    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Ambiguous {role} column: found {} candidate(s) {candidates:?} — select one explicitly", candidates.len())]
    AmbiguousColumn {
        role: String,
        /// Header labels that matched the detection keywords (may be empty
        /// when nothing matched at all).
        candidates: Vec<String>,
    },

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    /// One holding's quote could not be obtained this cycle.
    /// Recovered locally by the monitoring loop: the holding is skipped,
    /// the cycle continues.
    #[error("Price unavailable for {symbol}: {reason}")]
    PriceUnavailable {
        symbol: String,
        reason: String,
    },

    /// Notification transport failure. Non-fatal: the monitoring loop logs
    /// it and keeps going.
    #[error("Delivery failed ({transport}): {message}")]
    Delivery {
        transport: String,
        message: String,
    },

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::InvalidFileFormat(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::InvalidFileFormat(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs to prevent
        // credential leakage. reqwest errors often contain full URLs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
