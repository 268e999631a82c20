//! Bounded forward-fill.
//!
//! A short run of absent cells (holiday, vendor hiccup) is assumed to mean an
//! unchanged price and is filled with the last known value. A run longer than
//! the limit is left untouched so the completeness filter can reject the
//! column. Leading runs have nothing to carry forward and always stay absent.

use crate::domain::PriceTable;

/// Output of gap repair.
#[derive(Debug, Clone)]
pub struct GapRepairOutput {
    pub table: PriceTable,
    /// Number of cells filled across all columns.
    pub cells_repaired: usize,
}

/// Apply [`forward_fill_bounded`] to every column.
pub fn repair_gaps(table: &PriceTable, max_consecutive_gap: usize) -> GapRepairOutput {
    let mut cells_repaired = 0;
    let table = table.map_columns(|column| {
        let (filled, n) = forward_fill_bounded(column, max_consecutive_gap);
        cells_repaired += n;
        filled
    });
    GapRepairOutput {
        table,
        cells_repaired,
    }
}

/// Fill each maximal absent run of length ≤ `max_gap` that has a prior
/// observation. Returns the repaired column and the number of cells filled.
pub fn forward_fill_bounded(column: &[Option<f64>], max_gap: usize) -> (Vec<Option<f64>>, usize) {
    let mut out = column.to_vec();
    let mut filled = 0;
    let mut i = 0;

    while i < out.len() {
        if out[i].is_some() {
            i += 1;
            continue;
        }

        let start = i;
        while i < out.len() && out[i].is_none() {
            i += 1;
        }
        let run = i - start;

        if start == 0 || run > max_gap {
            continue;
        }
        // the run is maximal, so the cell before it is observed
        if let Some(last) = out[start - 1] {
            for cell in &mut out[start..i] {
                *cell = Some(last);
            }
            filled += run;
        }
    }

    (out, filled)
}
