//! Early withdrawal outcome

use serde::{Deserialize, Serialize};

use crate::plan::PlanConfig;

/// Which withdrawal rule applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithdrawalReason {
    FullTermCompleted,
    LockInPenalty,
    LockInCompletedNoPenalty,
}

impl WithdrawalReason {
    pub fn describe(&self, config: &PlanConfig) -> String {
        match self {
            WithdrawalReason::FullTermCompleted => "Full term completed, no penalty".to_string(),
            WithdrawalReason::LockInPenalty => format!(
                "Early withdrawal penalty applied ({} month lock-in)",
                config.lock_in_months
            ),
            WithdrawalReason::LockInCompletedNoPenalty => {
                "Lock-in period completed, no penalty".to_string()
            }
        }
    }
}

/// Amount paid out when the investor withdraws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalOutcome {
    pub months_invested: u32,

    /// Flat returns accrued over the months invested
    pub interest_earned: f64,

    pub penalty: f64,

    /// Principal plus interest less penalty, never below zero
    pub net_amount: f64,

    pub explanation: WithdrawalReason,
}

impl WithdrawalOutcome {
    pub fn penalty_applied(&self) -> bool {
        self.explanation == WithdrawalReason::LockInPenalty && self.penalty > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_mentions_lock_in() {
        let config = PlanConfig::default();
        assert_eq!(
            WithdrawalReason::LockInPenalty.describe(&config),
            "Early withdrawal penalty applied (8 month lock-in)"
        );
    }

    #[test]
    fn test_penalty_applied() {
        let outcome = WithdrawalOutcome {
            months_invested: 2,
            interest_earned: 5000.0,
            penalty: 0.0,
            net_amount: 105_000.0,
            explanation: WithdrawalReason::LockInPenalty,
        };
        // A zero penalty rate still reports the lock-in rule but charges nothing
        assert!(!outcome.penalty_applied());
    }
}
