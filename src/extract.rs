// src/extract.rs

use tracing::trace;

use crate::cell::Cell;

/// A sheet exactly as read: no header assumed, ragged rows allowed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        RawSheet { rows }
    }
}

/// Header row plus the valid player rows found below it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTable {
    pub headers: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
}

/// Index of the first row whose first cell is `#` and whose second cell is text
/// containing `Name`.
pub fn find_header_row(rows: &[Vec<Cell>]) -> Option<usize> {
    rows.iter().position(|row| {
        let first = row.first().and_then(Cell::as_text);
        let second = row.get(1).and_then(Cell::as_text);
        matches!((first, second), (Some("#"), Some(s)) if s.contains("Name"))
    })
}

/// A player row has a numeric jersey cell, a non-empty name, and is not the
/// "Team Stats" summary line.
pub fn is_valid_player_row(row: &[Cell]) -> bool {
    let Some(first) = row.first() else {
        return false;
    };
    if first.is_blank() || first.as_number().is_none() {
        return false;
    }
    let Some(name) = row.get(1) else {
        return false;
    };
    if name.is_blank() {
        return false;
    }
    !matches!(name.as_text(), Some(s) if s.contains("Team Stats"))
}

/// Locate the header and keep only player rows below it. `None` when the sheet has
/// no recognizable header; callers treat that like a missing sheet.
pub fn extract_table(sheet: &RawSheet) -> Option<ExtractedTable> {
    let header_idx = find_header_row(&sheet.rows)?;
    let headers = sheet.rows[header_idx].clone();

    let rows: Vec<Vec<Cell>> = sheet.rows[header_idx + 1..]
        .iter()
        .filter(|row| is_valid_player_row(row))
        .cloned()
        .collect();

    trace!(
        header_idx,
        kept = rows.len(),
        dropped = sheet.rows.len() - header_idx - 1 - rows.len(),
        "extracted player rows"
    );
    Some(ExtractedTable { headers, rows })
}
