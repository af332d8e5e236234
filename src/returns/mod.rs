//! Returns engine: flat monthly returns, early withdrawal and payout schedules

mod engine;
mod metrics;
mod schedule;
mod withdrawal;

pub use engine::{annual_return, build_schedule, early_withdrawal, monthly_return};
pub use metrics::{effective_annual_yield, investor_cashflows, level_monthly_payment, roi_percentage};
pub use schedule::{
    next_payment_start, ExportEntry, PeriodStatus, Schedule, ScheduleEntry, ScheduleExport,
    ScheduleSummary,
};
pub use withdrawal::{WithdrawalOutcome, WithdrawalReason};
