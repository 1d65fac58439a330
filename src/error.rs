use thiserror::Error;

/// Upload intake failures. These halt the interaction; nothing downstream runs.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported file format: '{0}'")]
    UnsupportedFormat(String),
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(String),
    #[error("workbook contains no sheets")]
    EmptyWorkbook,
    #[error("sheet has no header row")]
    MissingHeader,
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// Invalid axis choices, rejected at the selection boundary so the chart spec
/// builder never sees a miswired pairing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("column '{0}' not found")]
    UnknownColumn(String),
    #[error("x column '{0}' is not categorical")]
    XNotCategorical(String),
    #[error("y column '{0}' is not numeric")]
    YNotNumeric(String),
}

/// Summarizing an empty row set. Callers suppress the summary block instead of
/// propagating this.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummaryError {
    #[error("cannot summarize an empty row set")]
    EmptyInput,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("chart drawing failed: {0}")]
    Draw(String),
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}
