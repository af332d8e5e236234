//! Investor-facing return metrics
//!
//! The effective yield is the internal rate of return of the investor's own
//! cashflows: principal out at month 0, flat returns for every period but the
//! last, principal back at the end of the term.

use super::engine::{flat_monthly_return, validate_inputs};
use crate::error::{EngineError, EngineResult};
use crate::plan::{PlanConfig, Tier};

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 1000;

/// Returns as a percentage of the amount invested (0 when nothing is invested)
pub fn roi_percentage(invested: f64, returns: f64) -> f64 {
    if invested == 0.0 {
        return 0.0;
    }
    returns / invested * 100.0
}

/// Level monthly payment that amortizes `principal` over `years`
///
/// `annual_rate_pct` is a percentage (12.0 for 12%). A zero rate spreads
/// principal evenly.
pub fn level_monthly_payment(principal: f64, annual_rate_pct: f64, years: u32) -> EngineResult<f64> {
    if !principal.is_finite() || principal <= 0.0 {
        return Err(EngineError::invalid(format!(
            "principal must be a positive amount, got {}",
            principal
        )));
    }
    if years == 0 {
        return Err(EngineError::invalid("years must be at least 1"));
    }
    if !annual_rate_pct.is_finite() || annual_rate_pct < 0.0 {
        return Err(EngineError::invalid(format!(
            "annual rate must be non-negative, got {}",
            annual_rate_pct
        )));
    }

    let monthly_rate = annual_rate_pct / 12.0 / 100.0;
    let payments = i32::try_from(years)
        .ok()
        .and_then(|y| y.checked_mul(12))
        .ok_or_else(|| EngineError::invalid(format!("{} years is too long to amortize", years)))?;

    if monthly_rate == 0.0 {
        return Ok(principal / payments as f64);
    }

    let growth = (1.0 + monthly_rate).powi(payments);
    Ok(principal * monthly_rate * growth / (growth - 1.0))
}

/// Investor cashflows by month, month 0 being the investment
pub fn investor_cashflows(principal: f64, config: &PlanConfig, tier: Tier) -> EngineResult<Vec<f64>> {
    validate_inputs(principal, config)?;

    let monthly = flat_monthly_return(principal, config, tier);
    let mut cashflows = Vec::with_capacity(config.term_months as usize + 1);
    cashflows.push(-principal);
    cashflows.extend(std::iter::repeat(monthly).take(config.return_periods() as usize));
    cashflows.push(principal);
    Ok(cashflows)
}

/// Annualized yield of the investment with monthly compounding
///
/// `None` if no rate solves the cashflows.
pub fn effective_annual_yield(principal: f64, config: &PlanConfig, tier: Tier) -> EngineResult<Option<f64>> {
    let cashflows = investor_cashflows(principal, config, tier)?;
    Ok(periodic_irr(&cashflows).map(|monthly| (1.0 + monthly).powi(12) - 1.0))
}

/// Periodic IRR by Newton-Raphson, falling back to bisection
fn periodic_irr(cashflows: &[f64]) -> Option<f64> {
    let has_inflow = cashflows.iter().any(|&cf| cf > TOLERANCE);
    let has_outflow = cashflows.iter().any(|&cf| cf < -TOLERANCE);
    if !has_inflow || !has_outflow {
        return None;
    }

    let mut rate = 0.01;
    for _ in 0..MAX_ITERATIONS {
        let (npv, slope) = npv_and_slope(cashflows, rate);
        if slope.abs() < 1e-20 {
            break;
        }

        let next = (rate - npv / slope).clamp(-0.99, 10.0);
        if (next - rate).abs() < TOLERANCE {
            return Some(next);
        }
        rate = next;
    }

    bisect(cashflows)
}

fn npv_and_slope(cashflows: &[f64], rate: f64) -> (f64, f64) {
    cashflows
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(npv, slope), (t, &cf)| {
            let t = t as i32;
            (
                npv + cf / (1.0 + rate).powi(t),
                slope - t as f64 * cf / (1.0 + rate).powi(t + 1),
            )
        })
}

fn bisect(cashflows: &[f64]) -> Option<f64> {
    let npv = |rate: f64| npv_and_slope(cashflows, rate).0;
    let (mut low, mut high) = (-0.99_f64, 10.0_f64);
    if npv(low) * npv(high) > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let value = npv(mid);
        if value.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }
        if value * npv(low) < 0.0 {
            high = mid;
        } else {
            low = mid;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_roi_percentage() {
        assert_abs_diff_eq!(roi_percentage(100_000.0, 30_000.0), 30.0, epsilon = 1e-9);
        assert_eq!(roi_percentage(0.0, 500.0), 0.0);
    }

    #[test]
    fn test_level_payment() {
        let payment = level_monthly_payment(100_000.0, 12.0, 1).unwrap();
        assert_abs_diff_eq!(payment, 8884.88, epsilon = 0.01);

        let flat = level_monthly_payment(120_000.0, 0.0, 1).unwrap();
        assert_abs_diff_eq!(flat, 10_000.0);

        assert!(level_monthly_payment(100_000.0, 12.0, 0).is_err());
        assert!(level_monthly_payment(100_000.0, -1.0, 5).is_err());
    }

    #[test]
    fn test_level_payment_rejects_bad_principal_and_huge_terms() {
        for principal in [0.0, -5_000.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                level_monthly_payment(principal, 12.0, 1),
                Err(EngineError::InvalidArgument(_))
            ));
        }
        assert!(matches!(
            level_monthly_payment(100_000.0, 12.0, 200_000_000),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(level_monthly_payment(100_000.0, 12.0, u32::MAX).is_err());
    }

    #[test]
    fn test_investor_cashflows() {
        let cashflows =
            investor_cashflows(100_000.0, &PlanConfig::default(), Tier::Standard).unwrap();
        assert_eq!(cashflows.len(), 14);
        assert_eq!(cashflows[0], -100_000.0);
        assert_abs_diff_eq!(cashflows[1], 2500.0);
        assert_abs_diff_eq!(cashflows[12], 2500.0);
        assert_eq!(cashflows[13], 100_000.0);
    }

    #[test]
    fn test_effective_yield_below_compounded_rate() {
        let config = PlanConfig::default();
        let yield_rate = effective_annual_yield(100_000.0, &config, Tier::Standard)
            .unwrap()
            .unwrap();

        // The repayment month pays no return, so the yield sits under 2.5% compounded
        assert!(yield_rate < 1.025_f64.powi(12) - 1.0);
        assert!(yield_rate > 0.25);

        let premium = effective_annual_yield(100_000.0, &config, Tier::Premium)
            .unwrap()
            .unwrap();
        assert!(premium > yield_rate);
    }

    #[test]
    fn test_zero_rate_yield() {
        let config = PlanConfig {
            monthly_rate: 0.0,
            performance_bonus_rate: 0.0,
            ..PlanConfig::default()
        };
        let yield_rate = effective_annual_yield(50_000.0, &config, Tier::Premium)
            .unwrap()
            .unwrap();
        assert_abs_diff_eq!(yield_rate, 0.0, epsilon = 1e-8);
    }
}
