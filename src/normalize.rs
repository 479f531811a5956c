// src/normalize.rs

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::warn;

use crate::category::Category;
use crate::cell::Cell;
use crate::extract::ExtractedTable;
use crate::table::StatRow;

static LEADING_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+").expect("valid leading-digit regex"));

/// Team name from a workbook path: the file stem minus any leading digit run,
/// so `input/Round1/03Hawks.xlsx` gives `Hawks`.
pub fn team_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    LEADING_DIGITS.replace(&stem, "").into_owned()
}

/// Round label from a workbook path: the immediate parent directory's name.
pub fn round_from_path(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A header cell whose text disagrees with the canonical name its position maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderConflict {
    pub position: usize,
    pub found: String,
    pub expected: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedSheet {
    pub rows: Vec<StatRow>,
    pub conflicts: Vec<HeaderConflict>,
}

fn words(s: &str) -> Vec<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(fold)
        .collect()
}

fn fold(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether header text `found` is compatible with canonical column `expected`.
/// Blank or symbol-only text carries no information and always matches, as do a
/// qualified label (`Player Name` for `Name`) and the canonical name without its
/// trailing position digits (`PO` for `PO3`).
pub fn header_matches(found: &str, expected: &str) -> bool {
    let f = fold(found);
    if f.is_empty() {
        return true;
    }
    let e = fold(expected);
    if f == e {
        return true;
    }
    // A qualifier must be a separate word: `Player Name` matches, `HR` is not `R`.
    let w = words(found);
    if w.len() > 1 && w.last() == Some(&e) {
        return true;
    }
    match e.strip_prefix(f.as_str()) {
        Some(rest) => !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

fn header_conflicts(category: Category, headers: &[Cell]) -> Vec<HeaderConflict> {
    headers
        .iter()
        .zip(category.columns().iter().copied())
        .enumerate()
        .filter_map(|(position, (cell, expected))| {
            let found = cell.to_string();
            if header_matches(&found, expected) {
                None
            } else {
                Some(HeaderConflict {
                    position,
                    found,
                    expected,
                })
            }
        })
        .collect()
}

/// Rename columns positionally onto the category's canonical schema and tag each
/// row with its team and round. Extra source columns are dropped; canonical
/// columns the source lacks are left out of the row.
pub fn normalize(
    category: Category,
    table: &ExtractedTable,
    team: &str,
    round: &str,
) -> NormalizedSheet {
    let canonical = category.columns();
    let conflicts = header_conflicts(category, &table.headers);
    for c in &conflicts {
        warn!(
            sheet = category.as_str(),
            team,
            round,
            position = c.position,
            found = %c.found,
            expected = c.expected,
            "header text disagrees with positional column"
        );
    }

    let width = table
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(table.headers.len()))
        .max()
        .unwrap_or(0)
        .min(canonical.len());

    let rows = table
        .rows
        .iter()
        .map(|cells| {
            let mut row = StatRow::new(team, round);
            for (i, column) in canonical.iter().copied().take(width).enumerate() {
                row.set(column, cells.get(i).cloned().unwrap_or_default());
            }
            row
        })
        .collect();

    NormalizedSheet { rows, conflicts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn t(s: &str) -> Cell {
        Cell::text(s)
    }

    #[test]
    fn team_and_round_from_path() {
        let p = PathBuf::from("input/Round3/07Hawks.xlsx");
        assert_eq!(team_from_path(&p), "Hawks");
        assert_eq!(round_from_path(&p), "Round3");
        assert_eq!(team_from_path(Path::new("x/Blue Jays 2.xlsx")), "Blue Jays 2");
        assert_eq!(team_from_path(Path::new("x/2024Sox.xls")), "Sox");
    }

    #[test]
    fn positional_mapping_truncates_and_omits() {
        let table = ExtractedTable {
            headers: vec![t("#"), t("Name"), t("G"), t("W")],
            rows: vec![vec![Cell::Number(5.0), t("Lee"), Cell::Number(3.0), Cell::Number(1.0)]],
        };
        let out = normalize(Category::Pitching, &table, "Hawks", "Round1");
        let row = &out.rows[0];
        assert_eq!(row.team, "Hawks");
        assert_eq!(row.round, "Round1");
        assert_eq!(row.name(), "Lee");
        assert_eq!(row.number("W"), 1.0);
        assert!(!row.has("L"));
        assert!(out.conflicts.is_empty());
    }

    #[test]
    fn extra_columns_are_discarded() {
        let mut headers = vec![t("#"), t("Name")];
        let mut cells = vec![Cell::Number(1.0), t("Smith")];
        for i in 0..30 {
            headers.push(Cell::Empty);
            cells.push(Cell::Number(i as f64));
        }
        let table = ExtractedTable {
            headers,
            rows: vec![cells],
        };
        let out = normalize(Category::Batting, &table, "Hawks", "Round1");
        let table = crate::table::Table::from_rows(Category::Batting, out.rows);
        assert_eq!(table.columns.len(), 21 + 2);
    }

    #[test]
    fn conflicting_header_is_reported_but_position_wins() {
        let table = ExtractedTable {
            headers: vec![t("#"), t("Name"), t("G"), t("AB"), t("PA")],
            rows: vec![vec![
                Cell::Number(1.0),
                t("Smith"),
                Cell::Number(2.0),
                Cell::Number(9.0),
                Cell::Number(8.0),
            ]],
        };
        let out = normalize(Category::Batting, &table, "Hawks", "Round1");
        assert_eq!(
            out.conflicts,
            vec![
                HeaderConflict {
                    position: 3,
                    found: "AB".into(),
                    expected: "PA"
                },
                HeaderConflict {
                    position: 4,
                    found: "PA".into(),
                    expected: "AB"
                },
            ]
        );
        assert_eq!(out.rows[0].number("PA"), 9.0);
    }

    #[test]
    fn header_matching_is_lenient_on_position_suffix() {
        assert!(header_matches("PO", "PO3"));
        assert!(header_matches(" avg ", "AVG"));
        assert!(header_matches("#", "#"));
        assert!(header_matches("", "ERR"));
        assert!(header_matches("Player Name", "Name"));
        assert!(!header_matches("P", "PO3"));
        assert!(!header_matches("K", "SO"));
    }

    #[test]
    fn suffix_of_another_stat_is_a_conflict() {
        assert!(!header_matches("HR", "R"));
        assert!(!header_matches("ER", "R"));
        assert!(!header_matches("IBB", "BB"));
        assert!(header_matches("Runs R", "R"));

        let mut headers: Vec<Cell> = Category::Batting.columns().iter().map(|c| t(c)).collect();
        headers.swap(5, 7);
        let table = ExtractedTable {
            headers,
            rows: vec![],
        };
        let out = normalize(Category::Batting, &table, "Hawks", "Round1");
        let positions: Vec<usize> = out.conflicts.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![5, 7]);
        assert_eq!(out.conflicts[0].found, "HR");
        assert_eq!(out.conflicts[0].expected, "R");
    }
}
