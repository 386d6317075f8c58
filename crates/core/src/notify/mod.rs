pub mod telegram;
pub mod traits;

use crate::models::change::ChangeResult;

/// Render the alert notification for a threshold crossing.
///
/// Message convention: symbol, percent move at two decimals, current price
/// at two decimals.
pub fn alert_message(change: &ChangeResult) -> String {
    format!(
        "STOCK ALERT\nStock: {}\nMove: {:.2}%\nPrice: {:.2}",
        change.symbol, change.percent_change, change.current_price
    )
}
