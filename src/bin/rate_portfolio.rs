//! Rate a policy portfolio against flood-risk zone shapefiles
//!
//! Outputs the enriched portfolio, the invalid-coordinate subset, the
//! aggregate summary CSVs, and a diagnostics JSON next to them.

use std::fs::{self, File};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;

use flood_exposure::aggregate::build_report;
use flood_exposure::portfolio::{load_portfolio, PortfolioFilter, PortfolioOptions};
use flood_exposure::report;
use flood_exposure::zones::load_zone_sources;
use flood_exposure::ExposureEngine;

#[derive(Debug, Parser)]
#[command(about = "Rate a flood-exposed policy portfolio against zone shapefiles")]
struct Cli {
    /// Portfolio CSV file
    portfolio: PathBuf,

    /// Zone sources: .zip bundles, .shp files, or directories holding one
    #[arg(long = "zones", required = true, num_args = 1..)]
    zones: Vec<PathBuf>,

    /// Output directory for the report CSVs
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,

    /// Keep only policies expiring strictly after the cutoff date
    #[arg(long)]
    inforce: bool,

    /// Inforce cutoff date (YYYY-MM-DD), defaults to 2024-12-31
    #[arg(long)]
    cutoff: Option<NaiveDate>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let start = Instant::now();
    let mut options = PortfolioOptions::default();
    if cli.inforce {
        options.filter = PortfolioFilter::InforceOnly;
    }
    if let Some(cutoff) = cli.cutoff {
        options.cutoff = cutoff;
    }

    println!("Loading portfolio from {}...", cli.portfolio.display());
    let portfolio = load_portfolio(&cli.portfolio, &options)
        .with_context(|| format!("loading portfolio {}", cli.portfolio.display()))?;
    println!(
        "Loaded {} record(s) in {:?} ({} dropped by filter, {} invalid coordinates)",
        portfolio.records.len(),
        start.elapsed(),
        portfolio.stats.rows_dropped_by_filter,
        portfolio.stats.invalid_coordinate_rows
    );

    let zone_start = Instant::now();
    println!("Loading {} zone source(s)...", cli.zones.len());
    let zones = load_zone_sources(&cli.zones);
    println!(
        "Loaded {} source(s) in {:?} ({} skipped)",
        zones.sources.len(),
        zone_start.elapsed(),
        zones.skipped.len()
    );
    for skip in &zones.skipped {
        println!("  skipped '{}': {}", skip.source, skip.reason);
    }

    let rate_start = Instant::now();
    println!("Rating portfolio...");
    let result = ExposureEngine::new().run(portfolio, &zones);
    println!(
        "Rated {} record(s) in {:?}",
        result.enriched.len(),
        rate_start.elapsed()
    );

    let aggregates = build_report(&result.enriched);

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating output directory {}", cli.out_dir.display()))?;
    let create = |name: &str| -> anyhow::Result<File> {
        let path = cli.out_dir.join(name);
        File::create(&path).with_context(|| format!("creating {}", path.display()))
    };

    report::write_enriched(create("enriched.csv")?, &result)?;
    report::write_invalid(
        create("invalid_coordinates.csv")?,
        &result.header,
        &result.invalid_rows,
    )?;
    report::write_year_summary(create("summary_by_year.csv")?, &aggregates.by_year)?;
    report::write_occupancy_summary(
        create("summary_by_occupancy.csv")?,
        &aggregates.by_occupancy,
    )?;
    report::write_risk_summary(create("summary_by_risk.csv")?, &aggregates.by_risk)?;
    report::write_risk_distribution(
        create("risk_distribution.csv")?,
        &aggregates.risk_distribution,
    )?;
    report::write_year_risk_pivot(
        create("pivot_year_risk.csv")?,
        &aggregates.year_by_risk,
    )?;
    report::write_year_occupancy_risk_pivot(
        create("pivot_year_occupancy_risk.csv")?,
        &aggregates.year_by_occupancy_risk,
    )?;
    serde_json::to_writer_pretty(create("diagnostics.json")?, &result.diagnostics)?;

    println!("\nRun Summary:");
    println!("  Rows read:            {}", result.diagnostics.rows_read);
    println!("  Rows rated:           {}", result.diagnostics.rows_rated);
    println!("  Dropped by filter:    {}", result.diagnostics.rows_dropped_by_filter);
    println!("  Invalid coordinates:  {}", result.diagnostics.invalid_coordinate_rows);
    println!("  Without zone match:   {}", result.diagnostics.rows_without_zone);
    println!("  Without rate:         {}", result.diagnostics.rows_without_rate);
    for (risk, count) in &aggregates.risk_distribution {
        println!("  {:10} {}", risk.as_str(), count);
    }

    println!("\nReports written to {}", cli.out_dir.display());
    println!("Total time: {:?}", start.elapsed());
    Ok(())
}
