//! Type normalizer: per-column numeric coercion.
//!
//! For every column, every cell is stripped of percent signs and its comma
//! punctuation normalized, then parsed as a number. Adoption is all-or-nothing
//! per column: if any non-missing cell fails to parse, the whole column stays
//! text. One stray non-numeric value therefore degrades the entire column to
//! categorical.

use crate::table::{CellValue, Table};

/// Run the coercion pass over every column of the working table.
/// Coercion failures never escape; a failed column keeps its original text.
pub fn normalize_columns(table: &mut Table) {
    for column in table.columns_mut() {
        let mut coerced = Vec::with_capacity(column.cells.len());
        let mut adopted = true;

        for cell in &column.cells {
            match cell {
                CellValue::Missing => coerced.push(CellValue::Missing),
                CellValue::Number(n) => coerced.push(CellValue::Number(*n)),
                CellValue::Text(raw) => match parse_normalized_number(raw) {
                    Some(n) => coerced.push(CellValue::Number(n)),
                    None => {
                        adopted = false;
                        break;
                    }
                },
            }
        }

        if adopted {
            log::debug!("column '{}' adopted as numeric", column.name);
            column.cells = coerced;
        } else {
            log::debug!("column '{}' stays textual", column.name);
        }
    }
}

/// Parse a single cell after punctuation normalization.
///
/// Percent signs are stripped ("10%" -> 10.0). Commas are removed when the
/// string is shaped like thousands grouping ("1,200" -> 1200.0), otherwise
/// treated as a decimal separator ("3,5" -> 3.5).
pub fn parse_normalized_number(raw: &str) -> Option<f64> {
    let stripped = raw.trim().replace('%', "");
    let stripped = stripped.trim();
    if stripped.is_empty() {
        return None;
    }

    let candidate = if is_thousands_grouped(stripped) {
        stripped.replace(',', "")
    } else {
        stripped.replace(',', ".")
    };
    candidate.parse::<f64>().ok()
}

/// True for strings of the form `1,234,567` or `1,234.5` (optional sign),
/// where each comma separates a group of exactly three digits.
fn is_thousands_grouped(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }

    let mut groups = int_part.split(',');
    let first = match groups.next() {
        Some(g) => g,
        None => return false,
    };
    if first.is_empty() || first.len() > 3 || !first.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let mut any_group = false;
    for group in groups {
        if group.len() != 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        any_group = true;
    }
    any_group
}
