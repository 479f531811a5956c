// src/pipeline.rs

use anyhow::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{debug, error, info, instrument};

use crate::aggregate::aggregate;
use crate::category::Category;
use crate::config::Config;
use crate::discover::{discover, SourceFile};
use crate::extract::extract_table;
use crate::normalize::normalize;
use crate::output;
use crate::rounds::RoundOrder;
use crate::table::{StatRow, Table};
use crate::workbook::WorkbookReader;

/// Append-only per-category row collectors, filled file by file and turned into
/// tables once every file has been read.
#[derive(Debug, Default)]
pub struct Collected {
    rows: BTreeMap<Category, Vec<StatRow>>,
    pub rounds: BTreeSet<String>,
    pub header_conflicts: usize,
}

impl Collected {
    pub fn push(&mut self, category: Category, rows: Vec<StatRow>) {
        self.rows.entry(category).or_default().extend(rows);
    }

    #[cfg(test)]
    fn rows(&self, category: Category) -> &[StatRow] {
        self.rows.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub category: Category,
    pub rows: usize,
    pub players: usize,
    pub file: Option<PathBuf>,
}

/// What a run did; also written out as `manifest.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub files_found: usize,
    pub files_read: usize,
    pub skipped: Vec<SkippedFile>,
    pub rounds: Vec<String>,
    pub tables: Vec<TableSummary>,
    pub output_dir: PathBuf,
}

/// Read one workbook and append its normalized rows to `collected`.
#[instrument(level = "info", skip(reader, collected), fields(path = %file.path.display()))]
pub fn collect_file<R: WorkbookReader + ?Sized>(
    reader: &R,
    file: &SourceFile,
    collected: &mut Collected,
) -> Result<()> {
    let workbook = reader.read(&file.path)?;
    collected.rounds.insert(file.round.clone());

    for category in Category::ALL {
        let Some(sheet) = workbook.sheet(category) else {
            continue;
        };
        let Some(table) = extract_table(sheet) else {
            debug!(sheet = category.as_str(), "no header row; sheet skipped");
            continue;
        };
        let normalized = normalize(category, &table, &file.team, &file.round);
        collected.header_conflicts += normalized.conflicts.len();
        debug!(
            sheet = category.as_str(),
            rows = normalized.rows.len(),
            "normalized"
        );
        collected.push(category, normalized.rows);
    }
    Ok(())
}

/// Read every file. A file that fails to read is logged and skipped.
pub fn collect_all<R: WorkbookReader + ?Sized>(
    reader: &R,
    files: &[SourceFile],
) -> (Collected, Vec<SkippedFile>) {
    let mut collected = Collected::default();
    let mut skipped = Vec::new();
    for file in files {
        if let Err(e) = collect_file(reader, file, &mut collected) {
            error!(path = %file.path.display(), "failed to process workbook: {:#}", e);
            skipped.push(SkippedFile {
                path: file.path.clone(),
                reason: format!("{:#}", e),
            });
        }
    }
    (collected, skipped)
}

/// Aggregate each category that has rows. Categories without any rows are absent.
pub fn build_tables(collected: Collected, parallel: bool) -> Vec<Table> {
    let order = RoundOrder::from_labels(&collected.rounds);
    debug!(rounds = ?order.labels(), "round order");

    let Collected { rows, .. } = collected;
    rows.into_iter()
        .filter(|(_, rows)| !rows.is_empty())
        .map(|(category, rows)| Table::from_rows(category, aggregate(category, rows, &order, parallel)))
        .collect()
}

/// Full batch: discover, read, aggregate, write. Only output failures are fatal.
pub fn run<R: WorkbookReader + ?Sized>(config: &Config, reader: &R) -> Result<RunSummary> {
    let start = Instant::now();
    let files = discover(&config.input_dir, &config.extensions)?;
    info!(
        input = %config.input_dir.display(),
        files = files.len(),
        "discovered workbooks"
    );
    let out_dir = output::resolve_output_dir(&config.output_dir, config.timestamped, Local::now());
    let summary = run_files(config, reader, &files, &out_dir)?;
    info!(elapsed = ?start.elapsed(), "run complete");
    Ok(summary)
}

/// Process an explicit file list into `out_dir`.
pub fn run_files<R: WorkbookReader + ?Sized>(
    config: &Config,
    reader: &R,
    files: &[SourceFile],
    out_dir: &Path,
) -> Result<RunSummary> {
    let (collected, skipped) = collect_all(reader, files);
    if collected.header_conflicts > 0 {
        info!(
            conflicts = collected.header_conflicts,
            "positional columns disagreed with header text"
        );
    }
    let rounds = RoundOrder::from_labels(&collected.rounds).labels().to_vec();
    let tables = build_tables(collected, config.parallel);

    let mut summaries = Vec::with_capacity(tables.len());
    for table in &tables {
        let path = output::write_table(out_dir, table, config.format)?;
        info!(
            table = table.category.as_str(),
            rows = table.rows.len(),
            players = table.player_count(),
            "summary"
        );
        summaries.push(TableSummary {
            category: table.category,
            rows: table.rows.len(),
            players: table.player_count(),
            file: path.file_name().map(PathBuf::from),
        });
    }

    let summary = RunSummary {
        files_found: files.len(),
        files_read: files.len() - skipped.len(),
        skipped,
        rounds,
        tables: summaries,
        output_dir: out_dir.to_path_buf(),
    };
    if config.manifest {
        output::write_manifest(out_dir, &summary)?;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::extract::RawSheet;
    use crate::workbook::{MemoryReader, Workbook};
    use anyhow::Result;
    use std::fs;

    fn t(s: &str) -> Cell {
        Cell::text(s)
    }

    fn n(v: f64) -> Cell {
        Cell::Number(v)
    }

    fn batting_sheet(players: &[(f64, &str, f64, f64)]) -> RawSheet {
        let mut rows = vec![
            vec![t("Batting Statistics")],
            vec![t("#"), t("Name"), t("G"), t("PA"), t("AB"), t("R"), t("H")],
        ];
        for &(num, name, ab, h) in players {
            rows.push(vec![n(num), t(name), n(1.0), n(ab), n(ab), n(0.0), n(h)]);
        }
        rows.push(vec![Cell::Empty, t("Team Stats"), n(1.0)]);
        RawSheet::new(rows)
    }

    fn book(sheet: RawSheet) -> Workbook {
        let mut wb = Workbook::default();
        wb.insert(Category::Batting, sheet);
        wb
    }

    fn hawks_season() -> (MemoryReader, Vec<SourceFile>) {
        let mut reader = MemoryReader::default();
        let files = vec![
            SourceFile::new("input/Round2/01Hawks.xlsx"),
            SourceFile::new("input/Round1/01Hawks.xlsx"),
        ];
        reader.books.insert(
            files[1].path.clone(),
            book(batting_sheet(&[(1.0, "Smith", 10.0, 3.0)])),
        );
        reader.books.insert(
            files[0].path.clone(),
            book(batting_sheet(&[(1.0, "Smith", 20.0, 7.0)])),
        );
        (reader, files)
    }

    fn config() -> Config {
        Config {
            parallel: false,
            ..Config::default()
        }
    }

    #[test]
    fn hawks_smith_end_to_end() -> Result<()> {
        let (reader, files) = hawks_season();
        let dir = tempfile::tempdir()?;
        let summary = run_files(&config(), &reader, &files, dir.path())?;

        assert_eq!(summary.files_read, 2);
        assert_eq!(summary.rounds, vec!["Round1", "Round2"]);
        assert_eq!(summary.tables.len(), 1);
        assert_eq!(summary.tables[0].rows, 3);
        assert_eq!(summary.tables[0].players, 1);

        let text = fs::read_to_string(dir.path().join("Batting.csv"))?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "#,Name,G,PA,AB,R,H,HR,TB,RBI,AVG,BB,SO,HBP,SB,CS,SCB,SF,SLG,OBP,OPS,Team,Round");
        assert_eq!(lines[1], "1,Smith,1,10,10,0,3,,,,0.300,,,,,,,,,0.300,0.300,Hawks,Round1");
        assert_eq!(lines[2], "1,Smith,0,10,10,0,4,,,,0.400,,,,,,,,,0.400,0.400,Hawks,Round2");
        assert_eq!(lines[3], "1,Smith,1,20,20,0,7,,,,0.350,,,,,,,,,0.350,0.350,Hawks,TOTAL");
        assert_eq!(lines.len(), 4);

        assert!(!dir.path().join("Pitching.csv").exists());
        assert!(dir.path().join(output::MANIFEST_FILE).exists());
        Ok(())
    }

    #[test]
    fn broken_file_is_skipped_not_fatal() -> Result<()> {
        let (reader, mut files) = hawks_season();
        files.push(SourceFile::new("input/Round1/02Owls.xlsx"));
        let dir = tempfile::tempdir()?;
        let summary = run_files(&config(), &reader, &files, dir.path())?;
        assert_eq!(summary.files_found, 3);
        assert_eq!(summary.files_read, 2);
        assert_eq!(summary.skipped.len(), 1);
        assert!(summary.skipped[0].reason.contains("corrupt"));
        assert_eq!(summary.tables[0].rows, 3);
        Ok(())
    }

    #[test]
    fn headerless_sheet_contributes_nothing() {
        let mut reader = MemoryReader::default();
        let file = SourceFile::new("input/Round1/03Owls.xlsx");
        let mut wb = Workbook::default();
        wb.insert(
            Category::Pitching,
            RawSheet::new(vec![vec![n(1.0), t("Lee"), n(3.0)]]),
        );
        reader.books.insert(file.path.clone(), wb);
        let (collected, skipped) = collect_all(&reader, &[file]);
        assert!(skipped.is_empty());
        assert!(collected.rows(Category::Pitching).is_empty());
        assert!(build_tables(collected, false).is_empty());
    }

    #[test]
    fn reruns_are_identical() -> Result<()> {
        let (reader, files) = hawks_season();
        let a = tempfile::tempdir()?;
        let b = tempfile::tempdir()?;
        run_files(&config(), &reader, &files, a.path())?;
        run_files(&Config::default(), &reader, &files, b.path())?;
        assert_eq!(
            fs::read(a.path().join("Batting.csv"))?,
            fs::read(b.path().join("Batting.csv"))?
        );
        Ok(())
    }

    #[test]
    fn unwritable_output_is_fatal() -> Result<()> {
        let (reader, files) = hawks_season();
        let dir = tempfile::tempdir()?;
        let blocker = dir.path().join("out");
        fs::write(&blocker, b"a file, not a directory")?;
        assert!(run_files(&config(), &reader, &files, &blocker).is_err());
        Ok(())
    }

    #[test]
    fn run_discovers_from_config() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input");
        fs::create_dir_all(input.join("Round1"))?;
        let path = input.join("Round1/01Hawks.xlsx");
        fs::write(&path, b"")?;

        let mut reader = MemoryReader::default();
        reader
            .books
            .insert(path, book(batting_sheet(&[(9.0, "Ortiz", 4.0, 1.0)])));
        let cfg = Config {
            input_dir: input,
            output_dir: dir.path().join("output"),
            manifest: false,
            ..config()
        };
        let summary = run(&cfg, &reader)?;
        assert_eq!(summary.tables[0].rows, 2);
        assert!(cfg.output_dir.join("Batting.csv").exists());
        assert!(!cfg.output_dir.join(output::MANIFEST_FILE).exists());
        Ok(())
    }
}
