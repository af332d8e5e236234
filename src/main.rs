//! Lending Returns CLI
//!
//! Quotes returns, prints payout schedules and prices early withdrawals

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use log::warn;

use lending_returns::plan::{resolve_plan, InvestmentLimits, PlanConfig, Tier};
use lending_returns::returns::{
    self, effective_annual_yield, next_payment_start, roi_percentage,
};

#[derive(Parser, Debug)]
#[command(name = "lending_returns", version, about = "Returns calculator for the lending plan")]
struct Cli {
    /// JSON plan file; defaults to the published offering
    #[arg(long, global = true)]
    plan: Option<PathBuf>,

    /// Reject principals outside the offering limits instead of warning
    #[arg(long, global = true)]
    enforce_limits: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Investment {
    /// Amount invested
    #[arg(long)]
    principal: f64,

    /// standard, growth, emerging or premium
    #[arg(long, default_value = "standard")]
    tier: Tier,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Monthly and annual returns with effective yield
    Quote(Investment),

    /// Month-by-month payout schedule
    Schedule {
        #[command(flatten)]
        investment: Investment,

        /// First payment date (YYYY-MM-DD); defaults to the 1st of next month
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Write the schedule as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the schedule as a JSON export
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Amount received withdrawing after a number of months
    Withdraw {
        #[command(flatten)]
        investment: Investment,

        /// Whole months invested so far
        #[arg(long)]
        months: u32,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = resolve_plan(cli.plan.as_deref()).context("Unable to load plan terms")?;

    match &cli.command {
        Command::Quote(inv) => {
            check_limits(inv.principal, cli.enforce_limits)?;
            quote(inv, &config)
        }
        Command::Schedule { investment, start, csv, json } => {
            check_limits(investment.principal, cli.enforce_limits)?;
            schedule(investment, &config, *start, csv.as_ref(), json.as_ref())
        }
        Command::Withdraw { investment, months } => {
            check_limits(investment.principal, cli.enforce_limits)?;
            withdraw(investment, &config, *months)
        }
    }
}

fn check_limits(principal: f64, enforce: bool) -> Result<()> {
    if let Err(e) = InvestmentLimits::default().check(principal) {
        if enforce {
            return Err(e.into());
        }
        warn!("{}", e);
    }
    Ok(())
}

fn quote(inv: &Investment, config: &PlanConfig) -> Result<()> {
    let monthly = returns::monthly_return(inv.principal, config, inv.tier)?;
    let annual = returns::annual_return(inv.principal, config, inv.tier)?;
    let yield_rate = effective_annual_yield(inv.principal, config, inv.tier)?;

    println!("Principal:        {:>14.2}", inv.principal);
    println!("Tier:             {:>14}", inv.tier);
    println!("Monthly return:   {:>14.2}", monthly);
    println!("Annual return:    {:>14.2}", annual);
    println!("Annual ROI:       {:>13.1}%", roi_percentage(inv.principal, annual));
    match yield_rate {
        Some(y) => println!("Effective yield:  {:>13.2}%", y * 100.0),
        None => println!("Effective yield:  {:>14}", "n/a"),
    }
    Ok(())
}

fn schedule(
    inv: &Investment,
    config: &PlanConfig,
    start: Option<NaiveDate>,
    csv_path: Option<&PathBuf>,
    json_path: Option<&PathBuf>,
) -> Result<()> {
    let today = Local::now().date_naive();
    let start = match start {
        Some(date) => date,
        None => next_payment_start(today)?,
    };

    let schedule = returns::build_schedule(inv.principal, config, inv.tier, start)?;

    println!(
        "{:>5} {:>12} {:>14} {:>16} {:>16}  {}",
        "Month", "Date", "Return", "Cumulative", "Principal", "Status"
    );
    println!("{}", "-".repeat(90));
    for entry in &schedule.entries {
        println!(
            "{:>5} {:>12} {:>14.2} {:>16.2} {:>16.2}  {}",
            entry.period_index,
            entry.payment_date,
            entry.return_amount,
            entry.cumulative_return,
            entry.principal_outstanding,
            entry.period_status.label(),
        );
    }

    let summary = schedule.summary();
    println!(
        "\nTotal ({} months): returns {:.2}, principal {:.2}, payout {:.2}",
        summary.return_periods,
        summary.total_returns,
        summary.principal_repaid,
        summary.total_payout
    );

    if let Some(path) = csv_path {
        let file = File::create(path)
            .with_context(|| format!("Unable to create {}", path.display()))?;
        schedule.write_csv(file)?;
        println!("Schedule written to: {}", path.display());
    }

    if let Some(path) = json_path {
        let file = File::create(path)
            .with_context(|| format!("Unable to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &schedule.export(today))?;
        println!("Schedule export written to: {}", path.display());
    }

    Ok(())
}

fn withdraw(inv: &Investment, config: &PlanConfig, months: u32) -> Result<()> {
    let outcome = returns::early_withdrawal(inv.principal, config, inv.tier, months)?;

    println!("Months invested:  {:>14}", outcome.months_invested);
    println!("Interest earned:  {:>14.2}", outcome.interest_earned);
    println!("Penalty:          {:>14.2}", outcome.penalty);
    println!("Net amount:       {:>14.2}", outcome.net_amount);
    println!("{}", outcome.explanation.describe(config));
    Ok(())
}
