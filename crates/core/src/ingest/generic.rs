use log::debug;

use crate::errors::CoreError;
use crate::models::holding::Holding;
use crate::models::settings::MarketConvention;

use super::{parse_number, RawTable};

/// Keywords for heuristic column detection in generic spreadsheets,
/// matched as case-insensitive substrings of the header labels.
pub const TICKER_KEYWORDS: &[&str] = &["symbol", "ticker", "stock"];
pub const PRICE_KEYWORDS: &[&str] = &["avg", "buy", "cost", "price"];

/// One header that matched a detection keyword set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnCandidate {
    pub index: usize,
    pub header: String,
}

/// Rank every header against a keyword set, in column order.
///
/// Pure function: detection never picks silently — callers inspect the
/// candidate list and only a unique match resolves automatically.
pub fn column_candidates(headers: &[String], keywords: &[&str]) -> Vec<ColumnCandidate> {
    headers
        .iter()
        .enumerate()
        .filter(|(_, header)| {
            let lower = header.trim().to_lowercase();
            keywords.iter().any(|kw| lower.contains(kw))
        })
        .map(|(index, header)| ColumnCandidate {
            index,
            header: header.trim().to_string(),
        })
        .collect()
}

/// Explicit ticker/price column selection for the generic layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenericColumns {
    pub symbol: usize,
    pub price: usize,
}

impl GenericColumns {
    /// Detect both columns from the header row.
    ///
    /// Zero or multiple candidates for either role is an
    /// [`CoreError::AmbiguousColumn`] carrying the candidate list, so the
    /// caller can present it and pass an explicit selection instead.
    pub fn detect(headers: &[String]) -> Result<Self, CoreError> {
        let symbol = resolve_unique("ticker", headers, TICKER_KEYWORDS, None)?;
        // The ticker column is excluded from price detection so a header
        // like "Stock Price" cannot claim both roles.
        let price = resolve_unique("price", headers, PRICE_KEYWORDS, Some(symbol))?;
        Ok(Self { symbol, price })
    }
}

fn resolve_unique(
    role: &str,
    headers: &[String],
    keywords: &[&str],
    exclude: Option<usize>,
) -> Result<usize, CoreError> {
    let candidates: Vec<ColumnCandidate> = column_candidates(headers, keywords)
        .into_iter()
        .filter(|c| Some(c.index) != exclude)
        .collect();

    match candidates.as_slice() {
        [only] => Ok(only.index),
        _ => Err(CoreError::AmbiguousColumn {
            role: role.to_string(),
            candidates: candidates.into_iter().map(|c| c.header).collect(),
        }),
    }
}

/// Parse a generic spreadsheet (first row is the header) into canonical
/// holdings, detecting the ticker and price columns when no explicit
/// selection is given.
pub fn parse_generic(
    table: &RawTable,
    columns: Option<GenericColumns>,
    convention: &MarketConvention,
) -> Result<Vec<Holding>, CoreError> {
    let rows = table.rows();
    let headers = rows
        .first()
        .ok_or_else(|| CoreError::InvalidFileFormat("table has no header row".into()))?;

    let columns = match columns {
        Some(columns) => {
            if columns.symbol >= headers.len() || columns.price >= headers.len() {
                return Err(CoreError::ValidationError(format!(
                    "column selection {columns:?} out of range for {} header columns",
                    headers.len()
                )));
            }
            columns
        }
        None => GenericColumns::detect(headers)?,
    };
    let symbol_header = headers[columns.symbol].trim().to_string();

    let mut holdings = Vec::new();
    for row in &rows[1..] {
        let symbol = match row.get(columns.symbol) {
            Some(cell) => cell.trim(),
            None => continue,
        };
        if symbol.is_empty() || symbol.eq_ignore_ascii_case(&symbol_header) {
            continue;
        }

        let price = row.get(columns.price).and_then(|cell| parse_number(cell));
        match price {
            Some(price) if price.is_finite() && price > 0.0 => {
                holdings.push(Holding::new(symbol, price, convention));
            }
            _ => debug!("excluding row for '{symbol}': no positive price value"),
        }
    }

    Ok(holdings)
}
