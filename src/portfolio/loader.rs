//! Load investor holdings from a CSV export of the investor sheet

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{Reader, StringRecord};
use log::info;

use super::{Holding, InvestorId};
use crate::error::LoadError;
use crate::plan::Tier;

/// Raw CSV row matching the investor sheet columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "InvestorId")]
    investor_id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Tier")]
    tier: String,
    #[serde(rename = "Principal")]
    principal: f64,
    #[serde(rename = "StartDate")]
    start_date: String,
    #[serde(rename = "MonthsInvested")]
    months_invested: u32,
}

impl CsvRow {
    fn into_holding(self) -> Result<Holding, String> {
        let investor_id: InvestorId = self.investor_id.parse().map_err(|e| format!("{}", e))?;
        let tier: Tier = self.tier.parse().map_err(|e| format!("{}", e))?;

        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(format!("principal must be positive, got {}", self.principal));
        }

        let start_date = NaiveDate::parse_from_str(self.start_date.trim(), "%Y-%m-%d")
            .map_err(|e| format!("bad StartDate {:?}: {}", self.start_date, e))?;

        Ok(Holding {
            investor_id,
            name: self.name.trim().to_string(),
            tier,
            principal: self.principal,
            start_date,
            months_invested: self.months_invested,
        })
    }
}

/// Load all holdings from a CSV file
pub fn load_holdings<P: AsRef<Path>>(path: P) -> Result<Vec<Holding>, LoadError> {
    let path = path.as_ref();
    let holdings = read_holdings(Reader::from_path(path)?)?;
    info!("Loaded {} holdings from {}", holdings.len(), path.display());
    Ok(holdings)
}

/// Load holdings from any reader (e.g., string buffer, HTTP body)
pub fn load_holdings_from_reader<R: Read>(reader: R) -> Result<Vec<Holding>, LoadError> {
    read_holdings(Reader::from_reader(reader))
}

fn read_holdings<R: Read>(mut reader: Reader<R>) -> Result<Vec<Holding>, LoadError> {
    let headers = reader.headers()?.clone();
    let mut holdings = Vec::new();
    let mut record = StringRecord::new();

    while reader.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: CsvRow = record.deserialize(Some(&headers))?;
        let holding = row
            .into_holding()
            .map_err(|reason| LoadError::InvalidRecord { line, reason })?;
        holdings.push(holding);
    }

    Ok(holdings)
}
