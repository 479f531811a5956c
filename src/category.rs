// src/category.rs

use serde::{Deserialize, Serialize};

pub const TEAM: &str = "Team";
pub const ROUND: &str = "Round";
pub const NAME: &str = "Name";
pub const NUMBER: &str = "#";

/// Label used for the synthesized per-player season row.
pub const TOTAL_ROUND: &str = "TOTAL";

const BATTING: &[&str] = &[
    "#", "Name", "G", "PA", "AB", "R", "H", "HR", "TB", "RBI", "AVG", "BB", "SO", "HBP", "SB",
    "CS", "SCB", "SF", "SLG", "OBP", "OPS",
];

const PITCHING: &[&str] = &[
    "#", "Name", "G", "W", "L", "SV", "HLD", "IP", "BF", "Ball", "Str", "R", "ER", "ERA", "K",
    "H", "BB", "IBB", "BK", "WP", "HR",
];

#[rustfmt::skip]
const FIELDING: &[&str] = &[
    "#", "Name", "G", "ERR", "PO", "A", "SBA", "CS", "DP", "TP", "PB",
    "FP", "FP1", "FP2", "FP3", "FP4", "FP5", "FP6", "FP7", "FP8", "FP9",
    "IP",
    "PO1", "A1", "Et1", "Ef1", "AP1",
    "PO2", "A2", "Et2", "Ef2", "AP2",
    "PO3", "A3", "Et3", "Ef3", "AP3",
    "PO4", "A4", "Et4", "Ef4", "AP4",
    "PO5", "A5", "Et5", "Ef5", "AP5",
    "PO6", "A6", "Et6", "Ef6", "AP6",
    "PO7", "A7", "Et7", "Ef7", "AP7",
    "PO8", "A8", "Et8", "Ef8", "AP8",
    "PO9", "A9", "Et9", "Ef9", "AP9",
];

/// One of the three stat tables a workbook may carry, each as a sheet of the same name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Batting,
    Pitching,
    Fielding,
}

/// How a canonical column is treated when turning cumulative rows into per-round rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnRole {
    /// `#` and `Name`: copied, never diffed.
    Identity,
    /// Copied from the source row as reported (batting `SLG`).
    Passthrough,
    /// Recomputed from the row's own counting stats.
    Derived,
    /// Cumulative counting stat: diffed per round, summed for TOTAL.
    Counting,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Batting, Category::Pitching, Category::Fielding];

    /// Sheet name inside a workbook, and stem of the output file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Batting => "Batting",
            Category::Pitching => "Pitching",
            Category::Fielding => "Fielding",
        }
    }

    /// Canonical columns in output order, not counting `Team` and `Round`.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Category::Batting => BATTING,
            Category::Pitching => PITCHING,
            Category::Fielding => FIELDING,
        }
    }

    pub fn derived_columns(&self) -> &'static [&'static str] {
        match self {
            Category::Batting => &["AVG", "OBP", "OPS"],
            Category::Pitching => &["ERA"],
            Category::Fielding => &FIELDING[11..21],
        }
    }

    pub fn role(&self, column: &str) -> ColumnRole {
        if column == NUMBER || column == NAME {
            ColumnRole::Identity
        } else if self.derived_columns().contains(&column) {
            ColumnRole::Derived
        } else if *self == Category::Batting && column == "SLG" {
            ColumnRole::Passthrough
        } else {
            ColumnRole::Counting
        }
    }

    pub fn counting_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns()
            .iter()
            .copied()
            .filter(move |c| self.role(c) == ColumnRole::Counting)
    }
}
