// src/metrics.rs
//! Rate statistics recomputed from a row's own counting stats.
//!
//! Every formula resolves a zero denominator to exactly 0.

use crate::category::Category;
use crate::cell::round_to;
use crate::table::StatRow;

const FIELDING_POSITION_PCTS: [&str; 9] =
    ["FP1", "FP2", "FP3", "FP4", "FP5", "FP6", "FP7", "FP8", "FP9"];

/// `num / den` rounded to `places`, or 0 when `den` is 0.
pub fn ratio(num: f64, den: f64, places: usize) -> f64 {
    if den == 0.0 {
        return 0.0;
    }
    round_to(num / den, places)
}

pub fn batting_average(h: f64, ab: f64) -> f64 {
    ratio(h, ab, 3)
}

pub fn on_base_pct(h: f64, bb: f64, hbp: f64, ab: f64, sf: f64) -> f64 {
    ratio(h + bb + hbp, ab + bb + hbp + sf, 3)
}

pub fn ops(obp: f64, slg: f64) -> f64 {
    round_to(obp + slg, 3)
}

pub fn era(er: f64, ip: f64) -> f64 {
    ratio(er * 9.0, ip, 2)
}

pub fn fielding_pct(po: f64, a: f64, err: f64) -> f64 {
    ratio(po + a, po + a + err, 3)
}

/// Decimal places a derived column is written with.
pub fn places(category: Category, column: &str) -> Option<usize> {
    match (category, column) {
        (Category::Pitching, "ERA") => Some(2),
        (c, col) if c.derived_columns().contains(&col) => Some(3),
        _ => None,
    }
}

/// Overwrite every derived column of `row` from its counting stats.
pub fn recompute(category: Category, row: &mut StatRow) {
    match category {
        Category::Batting => {
            let avg = batting_average(row.number("H"), row.number("AB"));
            let obp = on_base_pct(
                row.number("H"),
                row.number("BB"),
                row.number("HBP"),
                row.number("AB"),
                row.number("SF"),
            );
            let ops = ops(obp, row.number("SLG"));
            row.set("AVG", avg);
            row.set("OBP", obp);
            row.set("OPS", ops);
        }
        Category::Pitching => {
            let era = era(row.number("ER"), row.number("IP"));
            row.set("ERA", era);
        }
        Category::Fielding => {
            let fp = fielding_pct(row.number("PO"), row.number("A"), row.number("ERR"));
            row.set("FP", fp);
            // Positional percentages reuse the overall formula.
            for col in FIELDING_POSITION_PCTS {
                row.set(col, fp);
            }
        }
    }
}
