//! Plan terms for the lending product and how they are loaded

mod config;
pub mod loader;

pub use config::{InvestmentLimits, PlanConfig, Tier, MAX_TERM_MONTHS};
pub use loader::{apply_env_overrides, load_plan_file, load_plan_from_reader, resolve_plan};
