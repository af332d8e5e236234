//! Payout schedule output structures

use std::io::Write;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult, LoadError};
use crate::plan::{PlanConfig, Tier};

/// Status of a period as shown to the investor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodStatus {
    /// Inside the lock-in period
    Locked,
    /// The first upcoming payment
    NextPayment,
    /// Past the lock-in; withdrawable without penalty
    Available,
    /// Final period: principal is repaid, no return
    PrincipalRepayment,
}

impl PeriodStatus {
    /// Status of period `period` (1-indexed) under `config`
    ///
    /// Period 1 is always the next payment, even inside a longer lock-in.
    /// The final period is always the principal repayment.
    pub fn for_period(period: u32, config: &PlanConfig) -> Self {
        if period == config.term_months {
            PeriodStatus::PrincipalRepayment
        } else if period == 1 {
            PeriodStatus::NextPayment
        } else if period < config.lock_in_months {
            PeriodStatus::Locked
        } else {
            PeriodStatus::Available
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PeriodStatus::Locked => "Locked",
            PeriodStatus::NextPayment => "Next Payment",
            PeriodStatus::Available => "Available",
            PeriodStatus::PrincipalRepayment => "Principal Repayment",
        }
    }
}

/// A single period of the payout schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Period number (1-indexed)
    pub period_index: u32,

    pub payment_date: NaiveDate,

    /// Return paid this period (zero in the repayment period)
    pub return_amount: f64,

    /// Returns paid up to and including this period
    pub cumulative_return: f64,

    /// Principal still invested after this period
    pub principal_outstanding: f64,

    pub period_status: PeriodStatus,
}

/// Complete payout schedule for one investment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub principal: f64,
    pub tier: Tier,
    pub term_months: u32,
    pub lock_in_months: u32,
    pub entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Totals across the schedule
    pub fn summary(&self) -> ScheduleSummary {
        let return_periods = self
            .entries
            .iter()
            .filter(|e| e.period_status != PeriodStatus::PrincipalRepayment)
            .count() as u32;
        let total_returns: f64 = self.entries.iter().map(|e| e.return_amount).sum();

        ScheduleSummary {
            return_periods,
            total_returns,
            principal_repaid: self.principal,
            total_payout: self.principal + total_returns,
            first_payment_date: self.entries.first().map(|e| e.payment_date),
            maturity_date: self.entries.last().map(|e| e.payment_date),
        }
    }

    /// Write one CSV row per period
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), LoadError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for entry in &self.entries {
            csv_writer.serialize(CsvRow::from(entry))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Downloadable JSON document describing this schedule
    pub fn export(&self, generated_on: NaiveDate) -> ScheduleExport {
        ScheduleExport {
            principal: self.principal,
            tier: self.tier,
            term_months: self.term_months,
            lock_in_months: self.lock_in_months,
            generated_on,
            summary: self.summary(),
            schedule: self
                .entries
                .iter()
                .map(|entry| ExportEntry::new(entry, self.principal, self.lock_in_months))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CsvRow {
    #[serde(rename = "Month")]
    month: u32,
    #[serde(rename = "PaymentDate")]
    payment_date: NaiveDate,
    #[serde(rename = "Return")]
    return_amount: f64,
    #[serde(rename = "CumulativeReturns")]
    cumulative_return: f64,
    #[serde(rename = "PrincipalBalance")]
    principal_outstanding: f64,
    #[serde(rename = "Status")]
    status: &'static str,
}

impl From<&ScheduleEntry> for CsvRow {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            month: entry.period_index,
            payment_date: entry.payment_date,
            return_amount: entry.return_amount,
            cumulative_return: entry.cumulative_return,
            principal_outstanding: entry.principal_outstanding,
            status: entry.period_status.label(),
        }
    }
}

/// Summary statistics for a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub return_periods: u32,
    pub total_returns: f64,
    pub principal_repaid: f64,
    pub total_payout: f64,
    pub first_payment_date: Option<NaiveDate>,
    pub maturity_date: Option<NaiveDate>,
}

/// A schedule period with the fields the download adds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEntry {
    #[serde(flatten)]
    pub entry: ScheduleEntry,

    /// Principal paid out this period; non-zero only in the repayment period
    pub principal_amount: f64,

    /// Period falls inside the lock-in
    pub is_locked: bool,
}

impl ExportEntry {
    fn new(entry: &ScheduleEntry, principal: f64, lock_in_months: u32) -> Self {
        let principal_amount = if entry.period_status == PeriodStatus::PrincipalRepayment {
            principal
        } else {
            0.0
        };
        Self {
            entry: entry.clone(),
            principal_amount,
            is_locked: entry.period_index < lock_in_months,
        }
    }
}

/// Schedule as offered for download
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleExport {
    pub principal: f64,
    pub tier: Tier,
    pub term_months: u32,
    pub lock_in_months: u32,
    pub generated_on: NaiveDate,
    pub summary: ScheduleSummary,
    pub schedule: Vec<ExportEntry>,
}

/// First day of the month after `today`, the usual first payment date
pub fn next_payment_start(today: NaiveDate) -> EngineResult<NaiveDate> {
    NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .ok_or_else(|| EngineError::invalid(format!("no month follows {}", today)))
}
