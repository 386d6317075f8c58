use log::debug;

use crate::errors::CoreError;
use crate::models::holding::Holding;
use crate::models::settings::MarketConvention;

use super::{parse_number, RawTable, HEADER_SCAN_LIMIT};

/// Literal column label that marks the header row in broker exports.
const SYMBOL_LABEL: &str = "Symbol";

/// Column labels for the invested-value ÷ quantity derivation, matched
/// case-insensitively against trimmed headers.
const INVESTED_LABELS: &[&str] = &["buy value", "invested value", "invested amount"];
const QUANTITY_LABELS: &[&str] = &["open quantity", "quantity", "qty", "qty."];

/// Column labels for the direct average-price derivation.
const AVG_PRICE_LABELS: &[&str] = &[
    "avg. cost",
    "avg cost",
    "avg. price",
    "avg price",
    "buy price",
    "buy avg",
    "buy avg.",
];

/// How the acquisition price is derived from a broker row. Which strategy
/// applies is decided once per file, from the columns present in its header.
enum AcquisitionStrategy {
    /// `invested_value / quantity`; rows with quantity ≤ 0 are excluded
    /// (only currently-held positions are monitored).
    InvestedOverQuantity { invested: usize, quantity: usize },
    /// A tabulated buy/avg-cost column.
    DirectPrice { price: usize },
}

/// Parse a fixed-layout broker export (e.g., a Zerodha holdings/P&L file)
/// into canonical holdings.
///
/// The header row is not necessarily first: the table is scanned from the
/// top, within [`HEADER_SCAN_LIMIT`], for a row containing the literal label
/// `"Symbol"`, and everything above it is discarded as metadata. Rows with
/// an empty symbol, duplicated header rows, rows without a positive open
/// quantity (on the quantity path), and rows yielding a non-positive
/// acquisition price are all excluded.
pub fn parse_broker_export(
    table: &RawTable,
    convention: &MarketConvention,
) -> Result<Vec<Holding>, CoreError> {
    let header_idx = find_header_row(table)?;
    let header = &table.rows()[header_idx];

    let symbol_col = header
        .iter()
        .position(|cell| cell.trim() == SYMBOL_LABEL)
        .ok_or_else(|| {
            CoreError::InvalidFileFormat(format!(
                "header row {header_idx} lost its '{SYMBOL_LABEL}' column"
            ))
        })?;

    let strategy = pick_strategy(header)?;

    let mut holdings = Vec::new();
    for row in &table.rows()[header_idx + 1..] {
        let symbol = match row.get(symbol_col) {
            Some(cell) => cell.trim(),
            None => continue,
        };
        // Empty rows, total rows, and duplicated header rows from export
        // artifacts all drop out here.
        if symbol.is_empty() || symbol.eq_ignore_ascii_case(SYMBOL_LABEL) {
            continue;
        }

        let acquisition_price = match derive_price(&strategy, row) {
            Some(price) if price.is_finite() && price > 0.0 => price,
            _ => {
                debug!("excluding row for '{symbol}': no positive acquisition price");
                continue;
            }
        };

        holdings.push(Holding::new(symbol, acquisition_price, convention));
    }

    Ok(holdings)
}

/// Locate the header row within the scan bound.
fn find_header_row(table: &RawTable) -> Result<usize, CoreError> {
    table
        .rows()
        .iter()
        .take(HEADER_SCAN_LIMIT)
        .position(|row| row.iter().any(|cell| cell.trim() == SYMBOL_LABEL))
        .ok_or_else(|| {
            CoreError::InvalidFileFormat(format!(
                "no '{SYMBOL_LABEL}' header row found within the first {HEADER_SCAN_LIMIT} rows"
            ))
        })
}

/// Prefer invested-value ÷ quantity when both columns are present; fall back
/// to a direct buy/avg-cost column.
fn pick_strategy(header: &[String]) -> Result<AcquisitionStrategy, CoreError> {
    let invested = find_column(header, INVESTED_LABELS);
    let quantity = find_column(header, QUANTITY_LABELS);

    if let (Some(invested), Some(quantity)) = (invested, quantity) {
        return Ok(AcquisitionStrategy::InvestedOverQuantity { invested, quantity });
    }
    if let Some(price) = find_column(header, AVG_PRICE_LABELS) {
        return Ok(AcquisitionStrategy::DirectPrice { price });
    }
    Err(CoreError::InvalidFileFormat(
        "no acquisition-price columns found (expected invested value + quantity, or an avg/buy price column)"
            .into(),
    ))
}

fn find_column(header: &[String], labels: &[&str]) -> Option<usize> {
    header
        .iter()
        .position(|cell| labels.contains(&cell.trim().to_lowercase().as_str()))
}

fn derive_price(strategy: &AcquisitionStrategy, row: &[String]) -> Option<f64> {
    match strategy {
        AcquisitionStrategy::InvestedOverQuantity { invested, quantity } => {
            let invested = parse_number(row.get(*invested)?)?;
            let quantity = parse_number(row.get(*quantity)?)?;
            // Quantity ≤ 0 must never reach the evaluator as a division.
            if quantity <= 0.0 {
                return None;
            }
            Some(invested / quantity)
        }
        AcquisitionStrategy::DirectPrice { price } => parse_number(row.get(*price)?),
    }
}
