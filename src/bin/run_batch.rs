//! Run illustrations for a block of policy records
//!
//! Reads CSV or JSON records, writes per-record outcomes as JSON, and prints
//! block totals

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use benefit_illustration::{
    policy::load_records_auto, BatchMode, BatchRunner, EngineConfig, IllustrationEngine,
};
use clap::Parser;
use rust_decimal::Decimal;

#[derive(Parser, Debug)]
#[command(name = "run_batch", about = "Batch benefit illustrations")]
struct Args {
    /// Input records (.csv or .json)
    input: PathBuf,

    /// Output file for outcomes
    #[arg(short, long, default_value = "batch_output.json")]
    output: PathBuf,

    /// Engine configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Records per chunk (overrides config)
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Only check that required fields are present
    #[arg(long)]
    legacy: bool,

    /// Process each chunk on the calling thread
    #[arg(long)]
    sequential: bool,
}

/// Totals across all successful records
#[derive(Debug, Default)]
struct BlockTotals {
    records: usize,
    succeeded: usize,
    total_annual_premium: Decimal,
    total_premiums_paid: Decimal,
    total_maturity_benefit: Decimal,
    total_guaranteed_additions: Decimal,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(chunk_size) = args.chunk_size {
        config.batch.chunk_size = chunk_size;
    }
    if args.legacy {
        config.batch.mode = BatchMode::Legacy;
    }
    if args.sequential {
        config.batch.parallel = false;
    }

    let start = Instant::now();
    println!("Loading records from {}...", args.input.display());
    let records = load_records_auto(&args.input)
        .with_context(|| format!("Failed to load records from {}", args.input.display()))?;
    println!("Loaded {} records in {:?}", records.len(), start.elapsed());

    let runner = BatchRunner::new(
        config.rules,
        IllustrationEngine::new(config.illustration),
        config.batch,
    );

    println!("Running illustrations...");
    let proj_start = Instant::now();
    let outcomes = runner.run(&records);
    println!("Illustrations complete in {:?}", proj_start.elapsed());

    let mut totals = BlockTotals {
        records: outcomes.len(),
        ..Default::default()
    };
    for result in outcomes.iter().filter_map(|o| o.data.as_ref()) {
        totals.succeeded += 1;
        let summary = &result.summary;
        totals.total_annual_premium =
            totals.total_annual_premium.saturating_add(result.annual_premium);
        totals.total_premiums_paid =
            totals.total_premiums_paid.saturating_add(summary.total_premiums_paid);
        totals.total_maturity_benefit =
            totals.total_maturity_benefit.saturating_add(summary.maturity_benefit);
        totals.total_guaranteed_additions =
            totals.total_guaranteed_additions.saturating_add(summary.total_guaranteed_additions);
    }

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &outcomes)?;
    println!("Output written to {}", args.output.display());

    println!("\nBlock Summary:");
    println!("  Records:               {}", totals.records);
    println!("  Succeeded:             {}", totals.succeeded);
    println!("  Failed:                {}", totals.records - totals.succeeded);
    println!("  Annual Premium:        {:.2}", totals.total_annual_premium);
    println!("  Premiums Paid:         {:.2}", totals.total_premiums_paid);
    println!("  Guaranteed Additions:  {:.2}", totals.total_guaranteed_additions);
    println!("  Maturity Benefit:      {:.2}", totals.total_maturity_benefit);

    for failed in outcomes.iter().filter(|o| !o.success).take(10) {
        println!("  ! {}: {}", failed.policy_id, failed.errors.join("; "));
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
