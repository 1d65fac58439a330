//! Chart spec builder: turn the filtered projection into a renderer-agnostic
//! chart description.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::filter::FilteredRows;

/// The chart families a user can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Area,
    Pie,
    Scatter,
}

/// An x/y chart body: axis names plus (label, value) points in row order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisChart {
    pub x_name: String,
    pub y_name: String,
    pub points: Vec<(String, f64)>,
}

/// A pie chart body. The x/y roles are reinterpreted: x values become slice
/// names, y values slice sizes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub name_column: String,
    pub value_column: String,
    pub slices: Vec<(String, f64)>,
}

/// Renderer-agnostic chart description.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChartSpec {
    /// Bars labeled with their numeric value.
    Bar(AxisChart),
    Line(AxisChart),
    Area(AxisChart),
    Pie(PieChart),
    /// One point per row, colored by the categorical value.
    Scatter(AxisChart),
}

impl ChartSpec {
    /// Build a spec from the filter engine's output. Infallible: the input
    /// type already guarantees the axis invariants, and an empty projection
    /// yields a valid empty spec.
    pub fn build(kind: ChartKind, filtered: &FilteredRows) -> ChartSpec {
        match kind {
            ChartKind::Pie => ChartSpec::Pie(PieChart {
                name_column: filtered.x_name.clone(),
                value_column: filtered.y_name.clone(),
                slices: filtered.rows.clone(),
            }),
            ChartKind::Bar => ChartSpec::Bar(axis_chart(filtered)),
            ChartKind::Line => ChartSpec::Line(axis_chart(filtered)),
            ChartKind::Area => ChartSpec::Area(axis_chart(filtered)),
            ChartKind::Scatter => ChartSpec::Scatter(axis_chart(filtered)),
        }
    }

    pub fn kind(&self) -> ChartKind {
        match self {
            ChartSpec::Bar(_) => ChartKind::Bar,
            ChartSpec::Line(_) => ChartKind::Line,
            ChartSpec::Area(_) => ChartKind::Area,
            ChartSpec::Pie(_) => ChartKind::Pie,
            ChartSpec::Scatter(_) => ChartKind::Scatter,
        }
    }

    /// Number of data rows carried by the spec.
    pub fn len(&self) -> usize {
        match self {
            ChartSpec::Bar(c) | ChartSpec::Line(c) | ChartSpec::Area(c) | ChartSpec::Scatter(c) => {
                c.points.len()
            }
            ChartSpec::Pie(p) => p.slices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn axis_chart(filtered: &FilteredRows) -> AxisChart {
    AxisChart {
        x_name: filtered.x_name.clone(),
        y_name: filtered.y_name.clone(),
        points: filtered.rows.clone(),
    }
}
