//! Plan terms: rates, term, lock-in and tier

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Longest term a plan may run (100 years)
pub const MAX_TERM_MONTHS: u32 = 1200;

/// Investor tier; only Premium earns the performance bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Growth and Emerging investors
    #[serde(alias = "growth", alias = "emerging")]
    Standard,
    Premium,
}

impl Tier {
    pub fn earns_bonus(&self) -> bool {
        matches!(self, Tier::Premium)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Standard => "standard",
            Tier::Premium => "premium",
        }
    }
}

impl Default for Tier {
    fn default() -> Self {
        Tier::Standard
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "growth" | "emerging" => Ok(Tier::Standard),
            "premium" => Ok(Tier::Premium),
            other => Err(EngineError::invalid(format!("unknown tier: {}", other))),
        }
    }
}

/// Terms of the lending product
///
/// Returns are flat on the original principal for every period except the
/// last, which repays principal only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Fixed return per month as a fraction of principal (0.025 = 2.5%)
    pub monthly_rate: f64,

    /// Total number of periods, including the principal repayment period
    pub term_months: u32,

    /// Withdrawals before this many months pay the early withdrawal penalty
    pub lock_in_months: u32,

    /// Fraction of principal charged on withdrawal inside the lock-in
    pub early_withdrawal_penalty_rate: f64,

    /// Additional monthly rate for Premium investors
    pub performance_bonus_rate: f64,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            monthly_rate: 0.025,
            term_months: 13,
            lock_in_months: 8,
            early_withdrawal_penalty_rate: 0.02,
            performance_bonus_rate: 0.005,
        }
    }
}

impl PlanConfig {
    /// Check every invariant of the plan terms
    pub fn validate(&self) -> EngineResult<()> {
        check_rate("monthly_rate", self.monthly_rate)?;
        check_rate("early_withdrawal_penalty_rate", self.early_withdrawal_penalty_rate)?;
        check_rate("performance_bonus_rate", self.performance_bonus_rate)?;

        if self.term_months == 0 {
            return Err(EngineError::invalid("term_months must be at least 1"));
        }
        if self.term_months > MAX_TERM_MONTHS {
            return Err(EngineError::invalid(format!(
                "term_months ({}) exceeds the maximum of {}",
                self.term_months, MAX_TERM_MONTHS
            )));
        }
        if self.lock_in_months > self.term_months {
            return Err(EngineError::invalid(format!(
                "lock_in_months ({}) exceeds term_months ({})",
                self.lock_in_months, self.term_months
            )));
        }
        Ok(())
    }

    /// Monthly rate applicable to a tier
    pub fn effective_monthly_rate(&self, tier: Tier) -> f64 {
        if tier.earns_bonus() {
            self.monthly_rate + self.performance_bonus_rate
        } else {
            self.monthly_rate
        }
    }

    /// Number of periods that pay a return (all but the repayment period)
    pub fn return_periods(&self) -> u32 {
        self.term_months.saturating_sub(1)
    }
}

fn check_rate(name: &str, value: f64) -> EngineResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::invalid(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Principal limits published for the offering
///
/// Enforced by the front ends; the engine itself only requires a positive principal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvestmentLimits {
    pub min_principal: f64,
    pub max_principal: f64,
}

impl Default for InvestmentLimits {
    fn default() -> Self {
        Self {
            min_principal: 25_000.0,
            max_principal: 2_500_000.0,
        }
    }
}

impl InvestmentLimits {
    pub fn check(&self, principal: f64) -> EngineResult<()> {
        if principal < self.min_principal || principal > self.max_principal {
            return Err(EngineError::invalid(format!(
                "principal {:.2} outside offering limits [{:.0}, {:.0}]",
                principal, self.min_principal, self.max_principal
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_offering_is_valid() {
        let config = PlanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.return_periods(), 12);
    }

    #[test]
    fn test_rejects_negative_and_nan_rates() {
        let mut config = PlanConfig::default();
        config.monthly_rate = -0.01;
        assert!(matches!(config.validate(), Err(EngineError::InvalidArgument(_))));

        let mut config = PlanConfig::default();
        config.early_withdrawal_penalty_rate = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = PlanConfig::default();
        config.performance_bonus_rate = -0.005;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lock_in_bounds() {
        let mut config = PlanConfig::default();
        config.lock_in_months = config.term_months;
        assert!(config.validate().is_ok());

        config.lock_in_months = config.term_months + 1;
        assert!(config.validate().is_err());

        config.term_months = 0;
        config.lock_in_months = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_term_upper_bound() {
        let mut config = PlanConfig {
            term_months: MAX_TERM_MONTHS,
            lock_in_months: 0,
            ..PlanConfig::default()
        };
        assert!(config.validate().is_ok());

        config.term_months = MAX_TERM_MONTHS + 1;
        assert!(matches!(config.validate(), Err(EngineError::InvalidArgument(_))));
    }

    #[test]
    fn test_tier_labels() {
        assert_eq!("Growth".parse::<Tier>().unwrap(), Tier::Standard);
        assert_eq!("emerging".parse::<Tier>().unwrap(), Tier::Standard);
        assert_eq!(" PREMIUM ".parse::<Tier>().unwrap(), Tier::Premium);
        assert!("platinum".parse::<Tier>().is_err());

        let tier: Tier = serde_json::from_str("\"growth\"").unwrap();
        assert_eq!(tier, Tier::Standard);
    }

    #[test]
    fn test_effective_rate_by_tier() {
        let config = PlanConfig::default();
        assert!((config.effective_monthly_rate(Tier::Standard) - 0.025).abs() < 1e-12);
        assert!((config.effective_monthly_rate(Tier::Premium) - 0.030).abs() < 1e-12);
    }

    #[test]
    fn test_investment_limits() {
        let limits = InvestmentLimits::default();
        assert!(limits.check(100_000.0).is_ok());
        assert!(limits.check(25_000.0).is_ok());
        assert!(limits.check(24_999.0).is_err());
        assert!(limits.check(2_500_001.0).is_err());
    }
}
