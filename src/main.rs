use anyhow::Result;
use boxscore::{
    config::{Config, OutputFormat},
    discover::discover,
    pipeline,
    validate::validate_dir,
    workbook::ExcelReader,
};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Turn per-round cumulative box-score workbooks into per-round and TOTAL tables.
#[derive(Parser, Debug)]
struct Args {
    /// YAML config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding one subdirectory per round
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Directory the tables are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Write into a YYYY-MM-DD_HHhMM subdirectory of the output dir
    #[arg(long)]
    timestamped: bool,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Aggregate players on a single thread
    #[arg(long)]
    sequential: bool,

    /// Check the written tables against the input set afterwards
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .init();

    // ─── 2) configuration ────────────────────────────────────────────
    let args = Args::parse();
    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(dir) = args.input_dir {
        config.input_dir = dir;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    config.timestamped |= args.timestamped;
    config.parallel &= !args.sequential;
    info!(?config, "startup");

    // ─── 3) run ──────────────────────────────────────────────────────
    let summary = pipeline::run(&config, &ExcelReader)?;
    for table in &summary.tables {
        info!(
            "{}: {} rows, {} players",
            table.category.as_str(),
            table.rows,
            table.players
        );
    }
    if !summary.skipped.is_empty() {
        error!("{} file(s) skipped", summary.skipped.len());
    }

    // ─── 4) optional validation ──────────────────────────────────────
    if args.validate && config.format != OutputFormat::Csv {
        warn!("--validate only checks CSV output; skipped for {:?}", config.format);
    } else if args.validate {
        let files = discover(&config.input_dir, &config.extensions)?;
        let report = validate_dir(&summary.output_dir, Some(files.as_slice()));
        if !report.passed() {
            anyhow::bail!("validation failed for {}", report.dir.display());
        }
        info!("validation passed");
    }

    Ok(())
}
