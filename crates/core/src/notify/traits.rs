use async_trait::async_trait;

use crate::errors::CoreError;

/// Trait abstraction for notification transports.
///
/// One capability: deliver a text message, best-effort. A failed delivery is
/// reported through the `Err` variant and must stay non-fatal to callers —
/// the monitoring loop logs it and keeps running. No queuing, retry, or
/// ordering guarantees.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Human-readable name of this transport (for logs/errors).
    fn name(&self) -> &str;

    /// Attempt delivery once.
    async fn deliver(&self, text: &str) -> Result<(), CoreError>;
}
