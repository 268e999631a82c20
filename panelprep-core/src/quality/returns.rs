//! Log-return derivation.

use crate::domain::{CleanPriceTable, ReturnTable};
use crate::error::DataIntegrityError;

/// `r[t] = ln(p[t] / p[t-1])` for every column.
///
/// The first date produces no row. Zero or one input rows give an empty
/// table with the same columns. Any non-positive or non-finite price fails
/// the whole derivation instead of producing a non-finite return.
pub fn derive_log_returns(prices: &CleanPriceTable) -> Result<ReturnTable, DataIntegrityError> {
    for (ticker, column) in prices.columns() {
        for (row, &price) in column.iter().enumerate() {
            if !(price.is_finite() && price > 0.0) {
                return Err(DataIntegrityError::NonPositivePrice {
                    ticker: ticker.clone(),
                    date: prices.dates()[row],
                    price,
                });
            }
        }
    }

    let dates = prices.dates().iter().skip(1).copied().collect();
    let columns = prices
        .columns()
        .map(|(_, column)| column.windows(2).map(|w| (w[1] / w[0]).ln()).collect())
        .collect();

    Ok(ReturnTable::from_parts(
        dates,
        prices.tickers().to_vec(),
        columns,
    ))
}
