// src/aggregate/total.rs

use crate::category::{Category, ColumnRole, TOTAL_ROUND};
use crate::cell::{tidy, Cell};
use crate::metrics;
use crate::table::StatRow;

/// Build a player's TOTAL row from their per-round rows.
///
/// Counting columns are summed over every column present in at least one row.
/// Identity and passthrough columns come from the last round. Derived columns
/// are recomputed from the sums, never averaged.
pub fn total(category: Category, deltas: &[StatRow]) -> Option<StatRow> {
    let last = deltas.last()?;
    let mut row = last.clone();
    row.round = TOTAL_ROUND.to_string();

    for col in category.columns().iter().copied() {
        if category.role(col) != ColumnRole::Counting {
            continue;
        }
        if !deltas.iter().any(|d| d.has(col)) {
            continue;
        }
        let sum: f64 = deltas.iter().map(|d| d.number(col)).sum();
        row.set(col, Cell::Number(tidy(sum)));
    }

    metrics::recompute(category, &mut row);
    Some(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(round: &str, ab: f64, h: f64) -> StatRow {
        let mut r = StatRow::new("Hawks", round);
        r.set("#", 1.0);
        r.set("Name", "Smith");
        r.set("AB", ab);
        r.set("H", h);
        r
    }

    #[test]
    fn sums_counts_and_recomputes_rates() {
        // Per-round averages are .300 and .400; the TOTAL is 7/20, not their mean.
        let deltas = vec![row("Round1", 10.0, 3.0), row("Round2", 10.0, 4.0)];
        let t = total(Category::Batting, &deltas).expect("non-empty");
        assert_eq!(t.round, "TOTAL");
        assert_eq!(t.name(), "Smith");
        assert_eq!(t.number("AB"), 20.0);
        assert_eq!(t.number("H"), 7.0);
        assert_eq!(t.number("AVG"), 0.35);
    }

    #[test]
    fn column_missing_in_some_rounds_still_sums() {
        let mut r1 = row("Round1", 10.0, 3.0);
        r1.set("HR", 1.0);
        let r2 = row("Round2", 10.0, 4.0);
        let t = total(Category::Batting, &[r1, r2]).expect("non-empty");
        assert_eq!(t.number("HR"), 1.0);
        assert!(!t.has("SB"));
    }

    #[test]
    fn passthrough_comes_from_last_round() {
        let mut r1 = row("Round1", 10.0, 3.0);
        r1.set("SLG", 0.4);
        let mut r2 = row("Round2", 10.0, 4.0);
        r2.set("SLG", 0.55);
        let t = total(Category::Batting, &[r1, r2]).expect("non-empty");
        assert_eq!(t.number("SLG"), 0.55);
    }

    #[test]
    fn empty_input_has_no_total() {
        assert!(total(Category::Fielding, &[]).is_none());
    }
}
