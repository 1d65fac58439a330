//! Column classifier: total partition into numeric and categorical columns.

use crate::table::Table;

/// Derived classification of a table's columns. Recomputed whenever the table
/// changes, never persisted. Every column appears in exactly one list, in the
/// table's original column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl Classification {
    pub fn is_numeric(&self, name: &str) -> bool {
        self.numeric.iter().any(|n| n == name)
    }

    pub fn is_categorical(&self, name: &str) -> bool {
        self.categorical.iter().any(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.is_numeric(name) || self.is_categorical(name)
    }
}

/// Partition the table's columns. A column is numeric iff the normalizer
/// adopted it (every non-missing cell is a number); everything else is
/// categorical.
pub fn classify_columns(table: &Table) -> Classification {
    let mut numeric = Vec::new();
    let mut categorical = Vec::new();

    for column in table.columns() {
        if column.is_numeric() {
            numeric.push(column.name.clone());
        } else {
            categorical.push(column.name.clone());
        }
    }

    log::debug!(
        "classified {} numeric, {} categorical columns",
        numeric.len(),
        categorical.len()
    );
    Classification { numeric, categorical }
}
