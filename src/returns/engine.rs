//! Core returns calculations: flat monthly returns, early withdrawal and
//! the month-by-month payout schedule
//!
//! Every function validates its inputs first and is otherwise pure: the same
//! inputs always give the same outputs and nothing is shared between calls.

use chrono::{Months, NaiveDate};
use log::{debug, warn};

use super::schedule::{PeriodStatus, Schedule, ScheduleEntry};
use super::withdrawal::{WithdrawalOutcome, WithdrawalReason};
use crate::error::{EngineError, EngineResult};
use crate::plan::{PlanConfig, Tier};

/// Return paid each month on `principal`
///
/// Premium investors earn `performance_bonus_rate` on top of `monthly_rate`.
pub fn monthly_return(principal: f64, config: &PlanConfig, tier: Tier) -> EngineResult<f64> {
    validate_inputs(principal, config)?;
    Ok(flat_monthly_return(principal, config, tier))
}

/// Twelve flat monthly returns; returns are never compounded
pub fn annual_return(principal: f64, config: &PlanConfig, tier: Tier) -> EngineResult<f64> {
    Ok(monthly_return(principal, config, tier)? * 12.0)
}

/// Outcome of withdrawing after `months_invested` months
pub fn early_withdrawal(
    principal: f64,
    config: &PlanConfig,
    tier: Tier,
    months_invested: u32,
) -> EngineResult<WithdrawalOutcome> {
    validate_inputs(principal, config)?;

    let monthly = flat_monthly_return(principal, config, tier);
    let interest_earned = monthly * months_invested as f64;

    let (penalty, explanation) = if months_invested >= config.term_months {
        (0.0, WithdrawalReason::FullTermCompleted)
    } else if months_invested < config.lock_in_months {
        (
            principal * config.early_withdrawal_penalty_rate,
            WithdrawalReason::LockInPenalty,
        )
    } else {
        (0.0, WithdrawalReason::LockInCompletedNoPenalty)
    };

    let gross = principal + interest_earned - penalty;
    let net_amount = if gross < 0.0 {
        warn!(
            "Penalty {:.2} exceeds principal plus interest {:.2}; net amount floored at zero",
            penalty,
            principal + interest_earned
        );
        0.0
    } else {
        gross
    };

    Ok(WithdrawalOutcome {
        months_invested,
        interest_earned,
        penalty,
        net_amount,
        explanation,
    })
}

/// Build the payout schedule, one entry per period of the term
///
/// `start_date` is the first payment date; later payments fall on the same
/// day of each following month (clamped to the month's last day).
pub fn build_schedule(
    principal: f64,
    config: &PlanConfig,
    tier: Tier,
    start_date: NaiveDate,
) -> EngineResult<Schedule> {
    validate_inputs(principal, config)?;

    let monthly = flat_monthly_return(principal, config, tier);
    let mut entries = Vec::with_capacity(config.term_months as usize);
    let mut cumulative_return = 0.0;

    for period in 1..=config.term_months {
        let is_final = period == config.term_months;
        let return_amount = if is_final { 0.0 } else { monthly };
        cumulative_return += return_amount;

        let payment_date = start_date
            .checked_add_months(Months::new(period - 1))
            .ok_or_else(|| {
                EngineError::invalid(format!(
                    "payment date for period {} is out of range from {}",
                    period, start_date
                ))
            })?;

        entries.push(ScheduleEntry {
            period_index: period,
            payment_date,
            return_amount,
            cumulative_return,
            principal_outstanding: if is_final { 0.0 } else { principal },
            period_status: PeriodStatus::for_period(period, config),
        });
    }

    Ok(Schedule {
        principal,
        tier,
        term_months: config.term_months,
        lock_in_months: config.lock_in_months,
        entries,
    })
}

pub(crate) fn flat_monthly_return(principal: f64, config: &PlanConfig, tier: Tier) -> f64 {
    let mut monthly = principal * config.monthly_rate;
    if tier.earns_bonus() {
        monthly += principal * config.performance_bonus_rate;
    }
    monthly
}

pub(crate) fn validate_inputs(principal: f64, config: &PlanConfig) -> EngineResult<()> {
    if !principal.is_finite() || principal <= 0.0 {
        debug!("Rejected principal {}", principal);
        return Err(EngineError::invalid(format!(
            "principal must be a positive amount, got {}",
            principal
        )));
    }
    config.validate().map_err(|e| {
        debug!("Rejected plan terms {:?}: {}", config, e);
        e
    })
}
