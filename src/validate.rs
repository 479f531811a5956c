// src/validate.rs
//! Post-run checks on written tables: presence, shape, and team/round coverage.

use anyhow::{Context, Result};
use std::{
    collections::BTreeSet,
    fmt, fs,
    path::{Path, PathBuf},
};
use tracing::{error, info, warn};

use crate::category::{Category, NAME, ROUND, TEAM, TOTAL_ROUND};
use crate::config::OutputFormat;
use crate::discover::{expected_labels, SourceFile};

pub const REQUIRED_COLUMNS: [&str; 3] = [TEAM, ROUND, NAME];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub category: Category,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{} [{}]: {}", self.category.as_str(), tag, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    pub dir: PathBuf,
    pub findings: Vec<Finding>,
}

impl Report {
    pub fn passed(&self) -> bool {
        !self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    fn push(&mut self, category: Category, severity: Severity, message: impl Into<String>) {
        let finding = Finding {
            category,
            severity,
            message: message.into(),
        };
        match severity {
            Severity::Warning => warn!("{}", finding),
            Severity::Error => error!("{}", finding),
        }
        self.findings.push(finding);
    }
}

/// `dir` itself if it holds any table, otherwise its lexicographically last
/// subdirectory (the newest timestamped run).
pub fn resolve_latest(dir: &Path, format: OutputFormat) -> Result<PathBuf> {
    let holds_tables = Category::ALL
        .iter()
        .any(|c| dir.join(format!("{}.{}", c.as_str(), format.ext())).is_file());
    if holds_tables {
        return Ok(dir.to_path_buf());
    }
    let mut subdirs: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to list output dir: {}", dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    subdirs.sort();
    subdirs
        .pop()
        .with_context(|| format!("No output directories found under {}", dir.display()))
}

/// Column names and the values of `Team`, `Round` for one CSV table.
struct CsvTable {
    headers: Vec<String>,
    rows: usize,
    teams: BTreeSet<String>,
    rounds: BTreeSet<String>,
}

fn read_csv_table(path: &Path) -> Result<CsvTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let headers: Vec<String> = rdr.headers()?.iter().map(|s| s.to_string()).collect();
    let team_idx = headers.iter().position(|h| h == TEAM);
    let round_idx = headers.iter().position(|h| h == ROUND);

    let mut table = CsvTable {
        headers,
        rows: 0,
        teams: BTreeSet::new(),
        rounds: BTreeSet::new(),
    };
    for (idx, record) in rdr.records().enumerate() {
        let record =
            record.with_context(|| format!("CSV parse error in {} at record {}", path.display(), idx))?;
        table.rows += 1;
        if let Some(v) = team_idx.and_then(|i| record.get(i)) {
            table.teams.insert(v.to_string());
        }
        if let Some(v) = round_idx.and_then(|i| record.get(i)) {
            table.rounds.insert(v.to_string());
        }
    }
    Ok(table)
}

/// Check the CSV tables in `dir`. With `inputs`, also compare the teams and
/// rounds present in each table with those the input files imply; mismatches
/// there are warnings only.
pub fn validate_dir(dir: &Path, inputs: Option<&[SourceFile]>) -> Report {
    let mut report = Report {
        dir: dir.to_path_buf(),
        findings: Vec::new(),
    };
    let expected = inputs.map(expected_labels);

    for category in Category::ALL {
        let path = dir.join(format!("{}.csv", category.as_str()));
        info!(path = %path.display(), "checking");
        if !path.is_file() {
            report.push(category, Severity::Error, "file not found");
            continue;
        }
        let table = match read_csv_table(&path) {
            Ok(t) => t,
            Err(e) => {
                report.push(category, Severity::Error, format!("error reading file: {:#}", e));
                continue;
            }
        };

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| !table.headers.iter().any(|h| h == c))
            .collect();
        if !missing.is_empty() {
            report.push(
                category,
                Severity::Error,
                format!("missing required columns: {}", missing.join(", ")),
            );
        }
        if table.rows == 0 {
            report.push(category, Severity::Error, "file is empty");
        }

        if let Some((teams, rounds)) = &expected {
            if &table.teams != teams {
                report.push(category, Severity::Warning, "not all teams are represented");
            }
            let mut seen_rounds = table.rounds.clone();
            seen_rounds.remove(TOTAL_ROUND);
            if &seen_rounds != rounds {
                report.push(category, Severity::Warning, "not all rounds are represented");
            }
        }
    }
    report
}
