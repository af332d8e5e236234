//! Batch projections of investor holdings
//!
//! Holds one immutable plan and projects any number of holdings against it.
//! Projections share nothing, so batches run in parallel.

use std::collections::BTreeMap;

use chrono::Datelike;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Holding, InvestorId};
use crate::error::{EngineError, EngineResult};
use crate::plan::PlanConfig;
use crate::returns::{self, PeriodStatus, Schedule, WithdrawalOutcome};

/// Projection of a single holding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingProjection {
    pub investor_id: InvestorId,
    pub principal: f64,
    pub monthly_return: f64,
    pub annual_return: f64,

    /// Returns paid so far (the repayment period pays none)
    pub returns_to_date: f64,

    pub schedule: Schedule,

    /// What the investor would receive withdrawing now
    pub withdrawal_today: WithdrawalOutcome,
}

/// Totals across a set of holdings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub holdings: usize,
    pub total_invested: f64,
    pub total_monthly_return: f64,
    pub total_returns_to_date: f64,
    pub total_withdrawal_value: f64,
}

/// Payouts falling in one calendar month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPayout {
    pub year: i32,
    pub month: u32,
    pub returns: f64,
    pub principal_repaid: f64,
    pub payments: usize,
}

/// Runs projections of holdings under one plan
#[derive(Debug, Clone)]
pub struct PortfolioRunner {
    config: PlanConfig,
}

impl PortfolioRunner {
    /// Create a runner; the plan is validated once up front
    pub fn new(config: PlanConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// Project a single holding
    pub fn project(&self, holding: &Holding) -> EngineResult<HoldingProjection> {
        let config = &self.config;
        let monthly_return = returns::monthly_return(holding.principal, config, holding.tier)?;
        let annual_return = returns::annual_return(holding.principal, config, holding.tier)?;
        let schedule =
            returns::build_schedule(holding.principal, config, holding.tier, holding.start_date)?;
        let withdrawal_today = returns::early_withdrawal(
            holding.principal,
            config,
            holding.tier,
            holding.months_invested,
        )?;

        let paid_periods = holding.months_invested.min(config.return_periods());

        Ok(HoldingProjection {
            investor_id: holding.investor_id.clone(),
            principal: holding.principal,
            monthly_return,
            annual_return,
            returns_to_date: monthly_return * paid_periods as f64,
            schedule,
            withdrawal_today,
        })
    }

    /// Project many holdings in parallel, failing on the first bad holding
    pub fn run_batch(&self, holdings: &[Holding]) -> EngineResult<Vec<HoldingProjection>> {
        debug!("Projecting {} holdings", holdings.len());
        holdings
            .par_iter()
            .map(|holding| {
                self.project(holding).map_err(|EngineError::InvalidArgument(reason)| {
                    EngineError::invalid(format!("{}: {}", holding.investor_id, reason))
                })
            })
            .collect()
    }

    /// Projections for one investor only
    pub fn run_investor(
        &self,
        holdings: &[Holding],
        investor_id: &InvestorId,
    ) -> EngineResult<Vec<HoldingProjection>> {
        holdings
            .iter()
            .filter(|h| &h.investor_id == investor_id)
            .map(|h| self.project(h))
            .collect()
    }
}

/// Sum up a set of projections
pub fn summarize(projections: &[HoldingProjection]) -> PortfolioSummary {
    projections.iter().fold(
        PortfolioSummary::default(),
        |mut acc, p| {
            acc.holdings += 1;
            acc.total_invested += p.principal;
            acc.total_monthly_return += p.monthly_return;
            acc.total_returns_to_date += p.returns_to_date;
            acc.total_withdrawal_value += p.withdrawal_today.net_amount;
            acc
        },
    )
}

/// Aggregate scheduled payouts by calendar month, earliest first
pub fn monthly_payouts(projections: &[HoldingProjection]) -> Vec<MonthlyPayout> {
    let mut by_month: BTreeMap<(i32, u32), MonthlyPayout> = BTreeMap::new();

    for projection in projections {
        for entry in &projection.schedule.entries {
            let date = entry.payment_date;
            let bucket = by_month
                .entry((date.year(), date.month()))
                .or_insert_with(|| MonthlyPayout {
                    year: date.year(),
                    month: date.month(),
                    ..Default::default()
                });

            bucket.returns += entry.return_amount;
            if entry.period_status == PeriodStatus::PrincipalRepayment {
                bucket.principal_repaid += projection.principal;
            }
            bucket.payments += 1;
        }
    }

    by_month.into_values().collect()
}
