//! Insight summarizer: max/min/mean of the measure over the filtered rows,
//! with the categorical label attached to each extreme.

use serde::Serialize;

use crate::error::SummaryError;
use crate::filter::FilteredRows;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightSummary {
    pub max: f64,
    pub min: f64,
    pub mean: f64,
    /// Label of the first row (in row order) holding the maximum value.
    pub max_label: String,
    /// Label of the first row (in row order) holding the minimum value.
    pub min_label: String,
}

/// Summarize the filtered rows. Ties on an extreme keep the first occurrence;
/// with duplicate extremes only one label is surfaced.
pub fn summarize(filtered: &FilteredRows) -> Result<InsightSummary, SummaryError> {
    let mut rows = filtered.rows.iter();
    let (first_label, first_value) = rows.next().ok_or(SummaryError::EmptyInput)?;

    let mut max = *first_value;
    let mut min = *first_value;
    let mut max_label = first_label.clone();
    let mut min_label = first_label.clone();
    let mut sum = *first_value;

    for (label, value) in rows {
        if *value > max {
            max = *value;
            max_label = label.clone();
        }
        if *value < min {
            min = *value;
            min_label = label.clone();
        }
        sum += *value;
    }

    Ok(InsightSummary {
        max,
        min,
        mean: sum / filtered.rows.len() as f64,
        max_label,
        min_label,
    })
}
