use std::collections::HashSet;

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Deduplication
// ---------------------------------------------------------------------------

/// Drop rows equal (across all columns) to an earlier row.
///
/// Survivors keep their original order. Returns the table and the number of
/// rows removed.
pub fn drop_duplicates(mut table: Table) -> (Table, usize) {
    let keep: Vec<bool> = {
        let mut seen: HashSet<Vec<&CellValue>> = HashSet::with_capacity(table.n_rows());
        table.rows().map(|row| seen.insert(row)).collect()
    };
    let removed = keep.iter().filter(|k| !**k).count();
    if removed > 0 {
        table.retain_rows(&keep);
    }
    (table, removed)
}

// ---------------------------------------------------------------------------
// Missing-value imputation
// ---------------------------------------------------------------------------

/// Replace missing cells of every numeric column with that column's mean.
///
/// The mean is taken over the non-missing cells before any replacement. A
/// column that receives fills is stored as floats. Non-numeric columns keep
/// their missing cells. Returns the table and the number of cells filled.
pub fn fill_missing_with_mean(mut table: Table) -> (Table, usize) {
    let mut filled = 0;
    for col in table.columns_mut() {
        if !col.is_numeric() || col.null_count() == 0 {
            continue;
        }
        let Some(mean) = col.mean() else {
            continue;
        };
        col.promote_to_float();
        for v in &mut col.values {
            if v.is_null() {
                *v = CellValue::Float(mean);
                filled += 1;
            }
        }
    }
    (table, filled)
}
