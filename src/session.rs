//! Per-user session context.
//!
//! One session holds one normalized table plus the current selections. Every
//! interaction re-runs the full synchronous pipeline (classify, filter, build
//! spec, render, summarize) from scratch; a failed recomputation returns an
//! error and the caller keeps showing its last valid view.

use anyhow::{anyhow, Context, Result};

use crate::chart::{ChartKind, ChartSpec};
use crate::classify::{classify_columns, Classification};
use crate::error::SummaryError;
use crate::filter::{apply_filter, FilteredRows, IncludedValues, Selection};
use crate::insight::{summarize, InsightSummary};
use crate::normalize::normalize_columns;
use crate::render::{render_chart, DownloadPayload};
use crate::table::Table;
use crate::RenderOptions;

/// Current user selections driving the pipeline.
#[derive(Debug, Clone)]
pub struct Selections {
    pub chart_kind: ChartKind,
    pub x: String,
    pub y: String,
    pub included: IncludedValues,
}

/// Everything one recomputation pass produces.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub classification: Classification,
    pub spec: ChartSpec,
    pub download: DownloadPayload,
    /// None when the filtered row set is empty; the summary block is
    /// suppressed rather than crashing the page.
    pub summary: Option<InsightSummary>,
}

/// Session state: the immutable normalized table plus mutable selections.
#[derive(Debug, Clone)]
pub struct Session {
    table: Table,
    selections: Selections,
}

impl Session {
    /// Initialize a session from a freshly loaded raw table. Runs the
    /// normalizer once, then picks defaults: first categorical column as x,
    /// first numeric column as y, all values included, bar chart.
    pub fn new(mut table: Table) -> Result<Self> {
        normalize_columns(&mut table);
        let classification = classify_columns(&table);

        let x = classification
            .categorical
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("table has no categorical columns to plot against"))?;
        let y = classification
            .numeric
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("table has no numeric columns to plot"))?;
        let included = IncludedValues::all(&table, &x);

        log::debug!("session initialized: x='{}', y='{}'", x, y);
        Ok(Session {
            table,
            selections: Selections {
                chart_kind: ChartKind::Bar,
                x,
                y,
                included,
            },
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    /// Current classification; derived, recomputed on demand.
    pub fn classification(&self) -> Classification {
        classify_columns(&self.table)
    }

    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        self.selections.chart_kind = kind;
    }

    /// Change the axis pairing. Validates roles and resets the included-value
    /// set to all distinct values of the new x column.
    pub fn set_axes(&mut self, x: &str, y: &str) -> Result<()> {
        let classification = self.classification();
        let selection = Selection::new(&classification, x, y)?;
        self.selections.included = IncludedValues::all(&self.table, &selection.x);
        self.selections.x = selection.x;
        self.selections.y = selection.y;
        Ok(())
    }

    /// Replace the included-value filter for the current x column.
    pub fn set_included_values<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selections.included = IncludedValues::from_values(values);
    }

    /// Run one full recomputation pass from the table and current selections.
    pub fn recompute(&self, options: &RenderOptions) -> Result<DashboardView> {
        let classification = self.classification();
        let selection = Selection::new(&classification, &self.selections.x, &self.selections.y)
            .context("axis selection no longer valid")?;

        let filtered = apply_filter(&self.table, &selection, &self.selections.included)?;
        let spec = ChartSpec::build(self.selections.chart_kind, &filtered);

        let figure = render_chart(&spec, options).context("failed to render chart")?;
        let download = figure
            .into_download()
            .context("failed to encode chart image")?;

        let summary = match summarize(&filtered) {
            Ok(summary) => Some(summary),
            Err(SummaryError::EmptyInput) => None,
        };

        Ok(DashboardView {
            classification,
            spec,
            download,
            summary,
        })
    }

    /// The filtered projection for the current selections, without rendering.
    pub fn filtered_rows(&self) -> Result<FilteredRows> {
        let classification = self.classification();
        let selection = Selection::new(&classification, &self.selections.x, &self.selections.y)?;
        Ok(apply_filter(
            &self.table,
            &selection,
            &self.selections.included,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::table_from_csv;

    fn session_from_csv(csv: &[u8]) -> Session {
        Session::new(table_from_csv(csv).unwrap()).unwrap()
    }

    const REGION_SALES: &[u8] = b"Region,Sales\nNorth,\"1,200\"\nSouth,800\nNorth,950\n";

    #[test]
    fn test_session_defaults() {
        let session = session_from_csv(REGION_SALES);
        let s = session.selections();
        assert_eq!(s.x, "Region");
        assert_eq!(s.y, "Sales");
        assert_eq!(s.chart_kind, ChartKind::Bar);
        assert_eq!(s.included.len(), 2);
    }

    #[test]
    fn test_session_requires_both_column_kinds() {
        let all_numeric = table_from_csv(b"a,b\n1,2\n").unwrap();
        assert!(Session::new(all_numeric).is_err());

        let all_text = table_from_csv(b"a,b\nx,y\n").unwrap();
        assert!(Session::new(all_text).is_err());
    }

    #[test]
    fn test_recompute_full_view() {
        let session = session_from_csv(REGION_SALES);
        let view = session.recompute(&RenderOptions::default()).unwrap();

        assert_eq!(view.classification.numeric, vec!["Sales"]);
        assert_eq!(view.spec.len(), 3);
        assert_eq!(view.download.file_name, "chart_export.png");

        let summary = view.summary.unwrap();
        assert_eq!(summary.max, 1200.0);
        assert_eq!(summary.max_label, "North");
        assert_eq!(summary.min, 800.0);
        assert_eq!(summary.min_label, "South");
    }

    #[test]
    fn test_recompute_with_value_filter() {
        let mut session = session_from_csv(REGION_SALES);
        session.set_included_values(["North"]);
        let view = session.recompute(&RenderOptions::default()).unwrap();

        assert_eq!(view.spec.len(), 2);
        let summary = view.summary.unwrap();
        assert_eq!(summary.mean, 1075.0);
        assert_eq!(summary.min_label, "North");
    }

    #[test]
    fn test_recompute_empty_filter_suppresses_summary() {
        let mut session = session_from_csv(REGION_SALES);
        session.set_included_values(Vec::<String>::new());
        let view = session.recompute(&RenderOptions::default()).unwrap();

        assert!(view.spec.is_empty());
        assert!(view.summary.is_none());
    }

    #[test]
    fn test_set_axes_resets_included_values() {
        let mut session = session_from_csv(
            b"Region,City,Sales\nNorth,Oslo,100\nSouth,Rome,200\n",
        );
        session.set_included_values(["North"]);
        session.set_axes("City", "Sales").unwrap();
        assert_eq!(session.selections().x, "City");
        assert_eq!(session.selections().included.len(), 2);
    }

    #[test]
    fn test_set_axes_rejects_bad_pairing() {
        let mut session = session_from_csv(REGION_SALES);
        assert!(session.set_axes("Sales", "Sales").is_err());
        assert!(session.set_axes("Region", "Region").is_err());
        // Selections unchanged after a rejected update
        assert_eq!(session.selections().x, "Region");
        assert_eq!(session.selections().y, "Sales");
    }

    #[test]
    fn test_chart_kind_change_applies_on_next_recompute() {
        let mut session = session_from_csv(REGION_SALES);
        session.set_chart_kind(ChartKind::Pie);
        let view = session.recompute(&RenderOptions::default()).unwrap();
        assert_eq!(view.spec.kind(), ChartKind::Pie);
    }
}
