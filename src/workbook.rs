// src/workbook.rs

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::category::Category;
use crate::cell::Cell;
use crate::extract::RawSheet;

/// The stat sheets found in one workbook. Sheets with other names are ignored.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: HashMap<Category, RawSheet>,
}

impl Workbook {
    pub fn insert(&mut self, category: Category, sheet: RawSheet) {
        self.sheets.insert(category, sheet);
    }

    pub fn sheet(&self, category: Category) -> Option<&RawSheet> {
        self.sheets.get(&category)
    }
}

/// Source of workbooks. A read failure is per-file: the pipeline logs it and
/// moves on to the next file.
pub trait WorkbookReader {
    fn read(&self, path: &Path) -> Result<Workbook>;
}

/// Reads `.xlsx`, `.xlsm`, `.xls` and `.ods` workbooks through calamine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcelReader;

impl WorkbookReader for ExcelReader {
    fn read(&self, path: &Path) -> Result<Workbook> {
        let mut excel = open_workbook_auto(path)
            .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

        let mut workbook = Workbook::default();
        for name in excel.sheet_names() {
            // Sheet names must match exactly.
            let Some(category) = Category::ALL.into_iter().find(|c| c.as_str() == name) else {
                debug!(sheet = %name, "skipping non-stat sheet");
                continue;
            };
            let range = excel
                .worksheet_range(&name)
                .with_context(|| format!("Failed to read sheet {} in {}", name, path.display()))?;
            workbook.insert(category, range_to_sheet(&range));
        }
        Ok(workbook)
    }
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Text(b.to_string()),
        other => Cell::Text(other.to_string()),
    }
}

/// calamine trims leading empty columns from a range; pad them back so cells keep
/// their absolute column positions.
fn range_to_sheet(range: &Range<Data>) -> RawSheet {
    let pad = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    let rows = range
        .rows()
        .map(|r| {
            let mut cells = vec![Cell::Empty; pad];
            cells.extend(r.iter().map(data_to_cell));
            cells
        })
        .collect();
    RawSheet::new(rows)
}

/// In-memory reader keyed by path, for exercising the pipeline without files.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryReader {
    pub books: HashMap<std::path::PathBuf, Workbook>,
}

#[cfg(test)]
impl WorkbookReader for MemoryReader {
    fn read(&self, path: &Path) -> Result<Workbook> {
        self.books
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("corrupt workbook: {}", path.display()))
    }
}
