//! Lending Returns - returns engine for a fixed-income private lending product
//!
//! This library provides:
//! - Flat monthly and annual returns by investor tier
//! - Early withdrawal outcomes under lock-in penalty rules
//! - Month-by-month payout schedules with bullet principal repayment
//! - Investor holdings loading and parallel portfolio projections

pub mod error;
pub mod plan;
pub mod portfolio;
pub mod returns;

// Re-export commonly used types
pub use error::{EngineError, LoadError};
pub use plan::{InvestmentLimits, PlanConfig, Tier};
pub use portfolio::{Holding, InvestorId, PortfolioRunner};
pub use returns::{
    annual_return, build_schedule, early_withdrawal, monthly_return, Schedule, ScheduleEntry,
    WithdrawalOutcome,
};
