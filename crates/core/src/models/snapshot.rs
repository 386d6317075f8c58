use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::change::ChangeResult;

/// Aggregated outcome of one monitoring cycle, handed to the display layer.
///
/// The core does not retain snapshots beyond the cycle that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleSnapshot {
    pub observed_at: DateTime<Utc>,
    /// Per-holding results, in canonical holdings-list order.
    pub rows: Vec<ChangeResult>,
    /// Symbols skipped this cycle because their quote was unavailable.
    pub skipped: Vec<String>,
    /// Symbols whose first threshold crossing fired an alert this cycle.
    pub alerts_fired: Vec<String>,
}

impl CycleSnapshot {
    pub(crate) fn new() -> Self {
        Self {
            observed_at: Utc::now(),
            rows: Vec::new(),
            skipped: Vec::new(),
            alerts_fired: Vec::new(),
        }
    }
}
