use std::borrow::Cow;
use std::collections::HashSet;

use super::error::{Result, SweepError};
use super::model::Table;

/// Narrow `table` to `selection`, in the order chosen, keeping every row.
///
/// An empty selection yields the whole table untouched rather than an empty
/// one, so an accidental "select none" doesn't blank the preview. Repeated
/// names are only taken once.
pub fn project<'a>(table: &'a Table, selection: &[String]) -> Result<Cow<'a, Table>> {
    if selection.is_empty() {
        return Ok(Cow::Borrowed(table));
    }

    let mut taken = HashSet::new();
    let mut columns = Vec::with_capacity(selection.len());
    for name in selection {
        if !taken.insert(name.as_str()) {
            continue;
        }
        let col = table
            .column(name)
            .ok_or_else(|| SweepError::UnknownColumn(name.clone()))?;
        columns.push(col.clone());
    }
    Ok(Cow::Owned(Table::new(columns)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};

    fn sample() -> Table {
        Table::new(vec![
            Column::new("A", vec![CellValue::Integer(1), CellValue::Integer(2)]),
            Column::new("B", vec![CellValue::Text("x".into()), CellValue::Text("y".into())]),
        ])
        .unwrap()
    }

    #[test]
    fn empty_selection_is_fail_open() {
        let table = sample();
        let view = project(&table, &[]).unwrap();
        assert!(matches!(view, Cow::Borrowed(_)));
        assert_eq!(*view, table);
    }

    #[test]
    fn single_column_keeps_all_rows() {
        let table = sample();
        let view = project(&table, &["A".to_string()]).unwrap();
        assert_eq!(view.column_names(), vec!["A"]);
        assert_eq!(view.n_rows(), 2);
        assert_eq!(view.column("A"), table.column("A"));
    }

    #[test]
    fn selection_order_is_kept_and_repeats_ignored() {
        let table = sample();
        let sel = vec!["B".to_string(), "A".to_string(), "B".to_string()];
        let view = project(&table, &sel).unwrap();
        assert_eq!(view.column_names(), vec!["B", "A"]);
    }

    #[test]
    fn unknown_column_is_an_error() {
        let table = sample();
        let err = project(&table, &["Z".to_string()]).unwrap_err();
        assert!(matches!(err, SweepError::UnknownColumn(name) if name == "Z"));
    }
}
