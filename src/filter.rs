//! Filter engine: validated axis selection plus value-inclusion filtering.
//!
//! Axis roles are checked here, at the selection boundary, so the chart spec
//! builder downstream only ever sees a well-typed two-column projection.

use std::collections::BTreeSet;

use crate::classify::Classification;
use crate::error::SelectionError;
use crate::table::Table;

/// A validated axis pairing: x categorical, y numeric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub x: String,
    pub y: String,
}

impl Selection {
    /// Validate an axis choice against the current classification.
    pub fn new(classification: &Classification, x: &str, y: &str) -> Result<Self, SelectionError> {
        if !classification.contains(x) {
            return Err(SelectionError::UnknownColumn(x.to_string()));
        }
        if !classification.contains(y) {
            return Err(SelectionError::UnknownColumn(y.to_string()));
        }
        if !classification.is_categorical(x) {
            return Err(SelectionError::XNotCategorical(x.to_string()));
        }
        if !classification.is_numeric(y) {
            return Err(SelectionError::YNotNumeric(y.to_string()));
        }
        Ok(Selection {
            x: x.to_string(),
            y: y.to_string(),
        })
    }
}

/// The set of x-column values currently included by the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludedValues(BTreeSet<String>);

impl IncludedValues {
    /// Default on first load: every distinct value of the column is included.
    pub fn all(table: &Table, column: &str) -> Self {
        IncludedValues(table.distinct_values(column).into_iter().collect())
    }

    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IncludedValues(values.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// The filtered two-column projection, in original row order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredRows {
    pub x_name: String,
    pub y_name: String,
    pub rows: Vec<(String, f64)>,
}

impl FilteredRows {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Restrict the table to rows whose x value is included and whose x and y
/// cells are both non-missing. The source table is not touched.
pub fn apply_filter(
    table: &Table,
    selection: &Selection,
    included: &IncludedValues,
) -> Result<FilteredRows, SelectionError> {
    let x_col = table
        .column(&selection.x)
        .ok_or_else(|| SelectionError::UnknownColumn(selection.x.clone()))?;
    let y_col = table
        .column(&selection.y)
        .ok_or_else(|| SelectionError::UnknownColumn(selection.y.clone()))?;

    let mut rows = Vec::new();
    for (x_cell, y_cell) in x_col.cells.iter().zip(y_col.cells.iter()) {
        let label = match x_cell.display() {
            Some(label) => label,
            None => continue,
        };
        let value = match y_cell.as_number() {
            Some(value) => value,
            None => continue,
        };
        if included.contains(&label) {
            rows.push((label, value));
        }
    }

    log::debug!(
        "filter kept {} of {} rows ({} values included)",
        rows.len(),
        table.row_count(),
        included.len()
    );
    Ok(FilteredRows {
        x_name: selection.x.clone(),
        y_name: selection.y.clone(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_columns;
    use crate::normalize::normalize_columns;
    use crate::table::Table;

    fn region_sales_table() -> Table {
        let mut table = Table::from_text_rows(
            vec!["Region".to_string(), "Sales".to_string()],
            vec![
                vec!["North".to_string(), "1,200".to_string()],
                vec!["South".to_string(), "800".to_string()],
                vec!["North".to_string(), "950".to_string()],
            ],
        )
        .unwrap();
        normalize_columns(&mut table);
        table
    }

    #[test]
    fn test_selection_valid_pairing() {
        let table = region_sales_table();
        let c = classify_columns(&table);
        let sel = Selection::new(&c, "Region", "Sales").unwrap();
        assert_eq!(sel.x, "Region");
        assert_eq!(sel.y, "Sales");
    }

    #[test]
    fn test_selection_unknown_column() {
        let table = region_sales_table();
        let c = classify_columns(&table);
        assert_eq!(
            Selection::new(&c, "Nope", "Sales"),
            Err(SelectionError::UnknownColumn("Nope".to_string()))
        );
    }

    #[test]
    fn test_selection_x_must_be_categorical() {
        let table = region_sales_table();
        let c = classify_columns(&table);
        assert_eq!(
            Selection::new(&c, "Sales", "Sales"),
            Err(SelectionError::XNotCategorical("Sales".to_string()))
        );
    }

    #[test]
    fn test_selection_y_must_be_numeric() {
        let table = region_sales_table();
        let c = classify_columns(&table);
        assert_eq!(
            Selection::new(&c, "Region", "Region"),
            Err(SelectionError::YNotNumeric("Region".to_string()))
        );
    }

    #[test]
    fn test_default_included_values_cover_all_distinct() {
        let table = region_sales_table();
        let included = IncludedValues::all(&table, "Region");
        assert_eq!(included.len(), 2);
        assert!(included.contains("North"));
        assert!(included.contains("South"));
    }

    #[test]
    fn test_filter_all_values_included() {
        let table = region_sales_table();
        let c = classify_columns(&table);
        let sel = Selection::new(&c, "Region", "Sales").unwrap();
        let included = IncludedValues::all(&table, "Region");
        let filtered = apply_filter(&table, &sel, &included).unwrap();
        assert_eq!(
            filtered.rows,
            vec![
                ("North".to_string(), 1200.0),
                ("South".to_string(), 800.0),
                ("North".to_string(), 950.0),
            ]
        );
    }

    #[test]
    fn test_filter_subset_preserves_row_order() {
        let table = region_sales_table();
        let c = classify_columns(&table);
        let sel = Selection::new(&c, "Region", "Sales").unwrap();
        let included = IncludedValues::from_values(["North"]);
        let filtered = apply_filter(&table, &sel, &included).unwrap();
        assert_eq!(
            filtered.rows,
            vec![("North".to_string(), 1200.0), ("North".to_string(), 950.0)]
        );
    }

    #[test]
    fn test_filter_empty_included_set() {
        let table = region_sales_table();
        let c = classify_columns(&table);
        let sel = Selection::new(&c, "Region", "Sales").unwrap();
        let included = IncludedValues::from_values(Vec::<String>::new());
        let filtered = apply_filter(&table, &sel, &included).unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_filter_drops_rows_with_missing_cells() {
        let mut table = Table::from_text_rows(
            vec!["Region".to_string(), "Sales".to_string()],
            vec![
                vec!["North".to_string(), "100".to_string()],
                vec!["".to_string(), "200".to_string()],
                vec!["South".to_string(), "".to_string()],
            ],
        )
        .unwrap();
        normalize_columns(&mut table);
        let c = classify_columns(&table);
        let sel = Selection::new(&c, "Region", "Sales").unwrap();
        let included = IncludedValues::all(&table, "Region");
        let filtered = apply_filter(&table, &sel, &included).unwrap();
        assert_eq!(filtered.rows, vec![("North".to_string(), 100.0)]);
    }

    #[test]
    fn test_filter_does_not_mutate_source() {
        let table = region_sales_table();
        let c = classify_columns(&table);
        let sel = Selection::new(&c, "Region", "Sales").unwrap();
        let included = IncludedValues::from_values(["North"]);
        let before = table.row_count();
        let _ = apply_filter(&table, &sel, &included).unwrap();
        assert_eq!(table.row_count(), before);
        assert_eq!(table.distinct_values("Region").len(), 2);
    }
}
