// src/output.rs

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Builder, StringBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use chrono::{DateTime, Local};
use parquet::arrow::ArrowWriter;
use serde::Serialize;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;

use crate::category::{NAME, ROUND, TEAM};
use crate::config::OutputFormat;
use crate::table::Table;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Directory a run writes into: `output_dir` itself, or a `YYYY-MM-DD_HHhMM`
/// subdirectory of it.
pub fn resolve_output_dir(output_dir: &Path, timestamped: bool, now: DateTime<Local>) -> PathBuf {
    if timestamped {
        output_dir.join(now.format("%Y-%m-%d_%Hh%M").to_string())
    } else {
        output_dir.to_path_buf()
    }
}

pub fn table_path(dir: &Path, table: &Table, format: OutputFormat) -> PathBuf {
    dir.join(format!("{}.{}", table.category.as_str(), format.ext()))
}

/// Write `table` into `dir` and return the file written.
pub fn write_table(dir: &Path, table: &Table, format: OutputFormat) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output dir: {}", dir.display()))?;
    let path = table_path(dir, table, format);
    match format {
        OutputFormat::Csv => write_csv(&path, table)?,
        OutputFormat::Parquet => write_parquet(&path, table)?,
    }
    info!(
        table = table.category.as_str(),
        rows = table.rows.len(),
        path = %path.display(),
        "wrote table"
    );
    Ok(path)
}

pub fn write_csv(path: &Path, table: &Table) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    wtr.write_record(table.header())?;
    for record in table.records() {
        wtr.write_record(&record)?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

fn is_text_column(column: &str) -> bool {
    matches!(column, NAME | TEAM | ROUND)
}

/// Arrow batch for `table`: text for `Name`/`Team`/`Round`, nullable float64 for the rest.
pub fn to_record_batch(table: &Table) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(table.columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.columns.len());

    for column in &table.columns {
        if is_text_column(column) {
            let mut b = StringBuilder::new();
            for row in &table.rows {
                b.append_value(row.render(table.category, column));
            }
            fields.push(Field::new(*column, DataType::Utf8, true));
            arrays.push(Arc::new(b.finish()) as ArrayRef);
        } else {
            let mut b = Float64Builder::new();
            for row in &table.rows {
                b.append_option(row.get(column).and_then(|c| c.as_number()));
            }
            fields.push(Field::new(*column, DataType::Float64, true));
            arrays.push(Arc::new(b.finish()) as ArrayRef);
        }
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).map_err(Into::into)
}

pub fn write_parquet(path: &Path, table: &Table) -> Result<()> {
    let batch = to_record_batch(table)?;
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Pretty-printed JSON dump of `value` at `dir/manifest.json`.
pub fn write_manifest<T: Serialize>(dir: &Path, value: &T) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output dir: {}", dir.display()))?;
    let path = dir.join(MANIFEST_FILE);
    let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::table::StatRow;
    use anyhow::Result;
    use chrono::TimeZone;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    fn sample_table() -> Table {
        let mut row = StatRow::new("Hawks", "Round1");
        row.set("#", 1.0);
        row.set("Name", "Smith, J.");
        row.set("AB", 10.0);
        row.set("H", 3.0);
        crate::metrics::recompute(Category::Batting, &mut row);
        Table::from_rows(Category::Batting, vec![row])
    }

    #[test]
    fn timestamped_dir_name() {
        let now = Local.with_ymd_and_hms(2025, 5, 22, 0, 17, 0).unwrap();
        assert_eq!(
            resolve_output_dir(Path::new("output"), true, now),
            PathBuf::from("output/2025-05-22_00h17")
        );
        assert_eq!(
            resolve_output_dir(Path::new("output"), false, now),
            PathBuf::from("output")
        );
    }

    #[test]
    fn csv_has_header_and_fixed_places() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_table(dir.path(), &sample_table(), OutputFormat::Csv)?;
        assert_eq!(path.file_name().unwrap(), "Batting.csv");
        let text = fs::read_to_string(&path)?;
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("#,Name,G,PA,AB,R,H,HR,TB,RBI,AVG,BB,SO,HBP,SB,CS,SCB,SF,SLG,OBP,OPS,Team,Round"));
        assert_eq!(
            lines.next(),
            Some("1,\"Smith, J.\",,,10,,3,,,,0.300,,,,,,,,,0.300,0.300,Hawks,Round1")
        );
        assert_eq!(lines.next(), None);
        Ok(())
    }

    #[test]
    fn parquet_round_trips_shape() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_table(dir.path(), &sample_table(), OutputFormat::Parquet)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?.build()?;
        let batches: Vec<RecordBatch> = reader.collect::<std::result::Result<_, _>>()?;
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].num_rows(), 1);
        let schema = batches[0].schema();
        assert_eq!(schema.field(1).name(), "Name");
        assert_eq!(schema.field(1).data_type(), &DataType::Utf8);
        assert_eq!(schema.field(2).data_type(), &DataType::Float64);
        Ok(())
    }

    #[test]
    fn manifest_is_json() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_manifest(dir.path(), &serde_json::json!({ "rows": 3 }))?;
        let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;
        assert_eq!(v["rows"], 3);
        Ok(())
    }
}
