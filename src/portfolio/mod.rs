//! Investor holdings and batch projections

mod holding;
pub mod loader;
mod runner;

pub use holding::{Holding, InvestorId};
pub use loader::{load_holdings, load_holdings_from_reader};
pub use runner::{monthly_payouts, summarize, HoldingProjection, MonthlyPayout, PortfolioRunner, PortfolioSummary};
