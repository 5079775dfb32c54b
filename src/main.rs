use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trip_ledger::{pipeline, Config, LedgerError};

/// Cross-reference a trip listing with the approved leader list
#[derive(Parser, Debug)]
#[command(name = "trip-ledger")]
#[command(about = "Credit trip leaders and co-leaders from activity listings")]
#[command(version)]
struct Args {
    /// Leader listing (CSV)
    leaders: PathBuf,

    /// Trip listing (CSV)
    trips: PathBuf,

    /// TOML file overriding column names and output settings
    #[arg(short, long, env = "TRIP_LEDGER_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for the summary tables (defaults to the trip listing's)
    #[arg(short, long, env = "TRIP_LEDGER_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Also write the run report as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trip_ledger=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(dir) = args.output_dir {
        config.output.directory = Some(dir);
    }

    info!("trip-ledger {}", trip_ledger::VERSION);

    let ctx = match pipeline::run(config, &args.leaders, &args.trips) {
        Ok(ctx) => ctx,
        Err(LedgerError::MissingInput(path)) => {
            eprintln!("❌ Input file not found: {}", path.display());
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to process trip data"),
    };
    let outputs = ctx
        .write_outputs(&args.trips)
        .context("Failed to write summary tables")?;

    println!("📂 leader data: {}", outputs.leaders.display());
    println!("📂 committee data: {}", outputs.committees.display());

    let report = ctx.report(Some(outputs));
    println!("\n{}", report.summary());

    if let Some(path) = args.summary_json {
        report
            .write_json(&path)
            .with_context(|| format!("Failed to write run report {}", path.display()))?;
        println!("✓ run report: {}", path.display());
    }

    println!("\n✅ done!");
    Ok(())
}
