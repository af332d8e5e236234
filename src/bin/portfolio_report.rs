//! Project every holding in an investor sheet export
//!
//! Writes month-by-month payouts for the whole book and prints portfolio totals.
//! Plan terms come from `--plan` (or the published offering) with the usual
//! environment overrides.

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use lending_returns::plan::resolve_plan;
use lending_returns::portfolio::{
    load_holdings, monthly_payouts, summarize, InvestorId, PortfolioRunner,
};

#[derive(Parser, Debug)]
#[command(name = "portfolio_report", about = "Payout report for all investor holdings")]
struct Cli {
    /// Holdings CSV (InvestorId,Name,Tier,Principal,StartDate,MonthsInvested)
    #[arg(default_value = "data/holdings.csv")]
    holdings: PathBuf,

    /// JSON plan file
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Only report this investor
    #[arg(long)]
    investor: Option<InvestorId>,

    /// Output CSV of payouts by month
    #[arg(long, default_value = "portfolio_payouts.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let start = Instant::now();

    let config = resolve_plan(cli.plan.as_deref()).context("Unable to load plan terms")?;
    let holdings = load_holdings(&cli.holdings)
        .with_context(|| format!("Failed to load holdings from {}", cli.holdings.display()))?;
    println!("Loaded {} holdings in {:?}", holdings.len(), start.elapsed());

    let runner = PortfolioRunner::new(config)?;
    let projections = match &cli.investor {
        Some(id) => runner.run_investor(&holdings, id)?,
        None => runner.run_batch(&holdings)?,
    };
    info!("Projected {} holdings", projections.len());

    let payouts = monthly_payouts(&projections);
    let mut writer = csv::Writer::from_writer(
        File::create(&cli.output)
            .with_context(|| format!("Failed to create {}", cli.output.display()))?,
    );
    writer.write_record(["Year", "Month", "Returns", "PrincipalRepaid", "Payments"])?;
    for row in &payouts {
        writer.write_record([
            row.year.to_string(),
            row.month.to_string(),
            format!("{:.2}", row.returns),
            format!("{:.2}", row.principal_repaid),
            row.payments.to_string(),
        ])?;
    }
    writer.flush()?;
    println!("Output written to {}", cli.output.display());

    let summary = summarize(&projections);
    println!("\nPortfolio Summary:");
    println!("  Holdings:            {}", summary.holdings);
    println!("  Total invested:      {:.2}", summary.total_invested);
    println!("  Monthly returns:     {:.2}", summary.total_monthly_return);
    println!("  Returns to date:     {:.2}", summary.total_returns_to_date);
    println!("  Withdrawal value:    {:.2}", summary.total_withdrawal_value);
    if let (Some(first), Some(last)) = (payouts.first(), payouts.last()) {
        println!(
            "  Payout window:       {}-{:02} to {}-{:02}",
            first.year, first.month, last.year, last.month
        );
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
