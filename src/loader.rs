//! Upload intake: turn a spreadsheet payload into a raw text [`Table`].
//!
//! Dispatch is by file extension, with a byte-level sniff as fallback for
//! extension-less payloads. Supported formats:
//! * `.xlsx` / `.xls` - first worksheet of the workbook
//! * `.csv`           - header row plus data rows
//! * `.json`          - array of flat objects (records orientation)

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::Value;

use crate::error::ParseError;
use crate::table::Table;

/// Load a table from a file on disk. Dispatch by extension.
pub fn load_table(path: &Path) -> Result<Table, ParseError> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    table_from_bytes(&bytes, name)
}

/// Load a table from an uploaded payload. The file name is only used for
/// extension dispatch; unknown extensions fall back to content sniffing.
pub fn table_from_bytes(payload: &[u8], file_name: &str) -> Result<Table, ParseError> {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xls" => table_from_workbook(payload),
        "csv" => table_from_csv(payload),
        "json" => table_from_json(payload),
        "" => sniff_format(payload, file_name),
        other => Err(ParseError::UnsupportedFormat(other.to_string())),
    }
}

/// Guess the format from the payload's leading bytes.
fn sniff_format(payload: &[u8], file_name: &str) -> Result<Table, ParseError> {
    // xlsx is a zip archive, xls an OLE2 compound file
    if payload.starts_with(b"PK\x03\x04") || payload.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
        return table_from_workbook(payload);
    }
    let head = payload
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map(|i| payload[i]);
    match head {
        Some(b'[') | Some(b'{') => table_from_json(payload),
        Some(_) => table_from_csv(payload),
        None => Err(ParseError::UnsupportedFormat(file_name.to_string())),
    }
}

/// Parse the first worksheet of an xlsx/xls workbook.
pub fn table_from_workbook(payload: &[u8]) -> Result<Table, ParseError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(payload.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ParseError::EmptyWorkbook)??;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or(ParseError::MissingHeader)?
        .iter()
        .map(cell_to_string)
        .collect();

    let data: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    log::debug!(
        "loaded workbook sheet: {} columns, {} rows",
        headers.len(),
        data.len()
    );
    Table::from_text_rows(headers, data)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse CSV bytes. The first record is the header row.
pub fn table_from_csv(payload: &[u8]) -> Result<Table, ParseError> {
    let mut reader = csv::Reader::from_reader(payload);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() {
        return Err(ParseError::MissingHeader);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    log::debug!("loaded CSV: {} columns, {} rows", headers.len(), rows.len());
    Table::from_text_rows(headers, rows)
}

/// Parse a JSON array of flat objects. Column order follows the first
/// object's key order.
pub fn table_from_json(payload: &[u8]) -> Result<Table, ParseError> {
    let value: Value = serde_json::from_slice(payload)?;
    let array = value
        .as_array()
        .ok_or_else(|| ParseError::InvalidJson("expected a top-level array of objects".to_string()))?;

    let first = match array.first() {
        Some(v) => v
            .as_object()
            .ok_or_else(|| ParseError::InvalidJson("items must be objects".to_string()))?,
        None => return Err(ParseError::MissingHeader),
    };
    let headers: Vec<String> = first.keys().cloned().collect();

    let mut rows = Vec::with_capacity(array.len());
    for (i, item) in array.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or_else(|| ParseError::InvalidJson(format!("item {i} is not an object")))?;
        let row = headers
            .iter()
            .map(|h| match obj.get(h) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::Bool(b)) => b.to_string(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            })
            .collect();
        rows.push(row);
    }

    Table::from_text_rows(headers, rows)
}
