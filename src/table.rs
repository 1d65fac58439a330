use crate::error::ParseError;
use serde::Serialize;

/// A single cell of the in-memory table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Missing,
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Display form of the cell, used for categorical labels.
    /// Missing cells have no display form.
    pub fn display(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Missing => None,
        }
    }
}

/// Format a number the way it reads on an axis label: integers without a
/// trailing ".0", everything else with full precision.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub cells: Vec<CellValue>,
}

impl Column {
    /// A column is numeric when every non-missing cell is a number.
    /// Vacuously true for an all-missing column.
    pub fn is_numeric(&self) -> bool {
        self.cells
            .iter()
            .all(|c| matches!(c, CellValue::Number(_) | CellValue::Missing))
    }
}

/// Ordered sequence of named columns, aligned by row index.
/// Invariant: every column has the same row count.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table from a header row and text rows, as produced by the
    /// loader. Header names are trimmed; blank cells become missing.
    pub fn from_text_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, ParseError> {
        let headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        for (i, name) in headers.iter().enumerate() {
            if headers[..i].contains(name) {
                return Err(ParseError::DuplicateColumn(name.clone()));
            }
        }

        let expected = headers.len();
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(ParseError::RaggedRow {
                    row: row_idx + 1,
                    found: row.len(),
                    expected,
                });
            }
        }

        let row_count = rows.len();
        let columns = headers
            .into_iter()
            .enumerate()
            .map(|(col_idx, name)| {
                let cells = rows
                    .iter()
                    .map(|row| {
                        let raw = &row[col_idx];
                        if raw.is_empty() {
                            CellValue::Missing
                        } else {
                            CellValue::Text(raw.clone())
                        }
                    })
                    .collect();
                Column { name, cells }
            })
            .collect();

        Ok(Table { columns, row_count })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Distinct non-missing display values of a column, in order of first
    /// appearance. Empty if the column does not exist.
    pub fn distinct_values(&self, name: &str) -> Vec<String> {
        let mut seen = Vec::new();
        if let Some(col) = self.column(name) {
            for cell in &col.cells {
                if let Some(value) = cell.display() {
                    if !seen.contains(&value) {
                        seen.push(value);
                    }
                }
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_text_rows_basic() {
        let table = Table::from_text_rows(
            headers(&["Region", "Sales"]),
            vec![row(&["North", "100"]), row(&["South", "200"])],
        )
        .unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["Region", "Sales"]);
    }

    #[test]
    fn test_header_names_are_trimmed() {
        let table = Table::from_text_rows(headers(&["  Region ", "Sales"]), vec![]).unwrap();
        assert!(table.column("Region").is_some());
        assert!(table.column("  Region ").is_none());
    }

    #[test]
    fn test_blank_cells_become_missing() {
        let table = Table::from_text_rows(
            headers(&["a"]),
            vec![row(&[""]), row(&["x"])],
        )
        .unwrap();
        let col = table.column("a").unwrap();
        assert_eq!(col.cells[0], CellValue::Missing);
        assert_eq!(col.cells[1], CellValue::Text("x".to_string()));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = Table::from_text_rows(headers(&["a", "a"]), vec![]);
        assert!(matches!(result, Err(ParseError::DuplicateColumn(_))));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let result = Table::from_text_rows(
            headers(&["a", "b"]),
            vec![row(&["1", "2"]), row(&["3"])],
        );
        assert!(matches!(result, Err(ParseError::RaggedRow { row: 2, .. })));
    }

    #[test]
    fn test_distinct_values_first_appearance_order() {
        let table = Table::from_text_rows(
            headers(&["Region"]),
            vec![row(&["South"]), row(&["North"]), row(&["South"]), row(&[""])],
        )
        .unwrap();
        assert_eq!(table.distinct_values("Region"), vec!["South", "North"]);
    }

    #[test]
    fn test_distinct_values_unknown_column_empty() {
        let table = Table::from_text_rows(headers(&["a"]), vec![row(&["1"])]).unwrap();
        assert!(table.distinct_values("nope").is_empty());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1200.0), "1200");
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(-7.0), "-7");
    }

    #[test]
    fn test_column_is_numeric() {
        let numeric = Column {
            name: "n".to_string(),
            cells: vec![CellValue::Number(1.0), CellValue::Missing],
        };
        assert!(numeric.is_numeric());

        let mixed = Column {
            name: "m".to_string(),
            cells: vec![CellValue::Number(1.0), CellValue::Text("x".to_string())],
        };
        assert!(!mixed.is_numeric());
    }
}
