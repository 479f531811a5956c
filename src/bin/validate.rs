use anyhow::Result;
use boxscore::{
    config::OutputFormat,
    discover::discover,
    validate::{resolve_latest, validate_dir},
};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Check written Batting/Pitching/Fielding tables.
#[derive(Parser, Debug)]
struct Args {
    /// Output directory, or a parent holding timestamped run directories
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Input directory to compare team and round coverage against
    #[arg(long)]
    input_dir: Option<PathBuf>,

    #[arg(long, value_delimiter = ',', default_value = "xlsx,xlsm,xls,ods")]
    extensions: Vec<String>,
}

fn main() -> Result<()> {
    fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_target(false)
        .init();

    let args = Args::parse();
    let dir = resolve_latest(&args.output_dir, OutputFormat::Csv)?;
    info!("validating output in {}", dir.display());

    let inputs = match &args.input_dir {
        Some(input) => Some(discover(input, &args.extensions)?),
        None => None,
    };
    let report = validate_dir(&dir, inputs.as_deref());

    if report.passed() {
        info!("all validations passed");
        Ok(())
    } else {
        for f in &report.findings {
            eprintln!("{}", f);
        }
        anyhow::bail!("some validations failed; see above for details")
    }
}
