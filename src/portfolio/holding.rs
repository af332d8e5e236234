//! Investor identifiers and holdings

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::plan::Tier;

const INVESTOR_ID_PREFIX: &str = "OE-INV-";

/// Investor identifier of the form `OE-INV-` followed by 4 or 5 digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvestorId(String);

impl InvestorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for InvestorId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let valid = s
            .strip_prefix(INVESTOR_ID_PREFIX)
            .map(|digits| (4..=5).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()))
            .unwrap_or(false);

        if valid {
            Ok(InvestorId(s.to_string()))
        } else {
            Err(EngineError::invalid(format!("malformed investor id: {:?}", s)))
        }
    }
}

impl TryFrom<String> for InvestorId {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InvestorId> for String {
    fn from(id: InvestorId) -> Self {
        id.0
    }
}

impl fmt::Display for InvestorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One investment held by an investor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub investor_id: InvestorId,

    pub name: String,

    pub tier: Tier,

    /// Amount invested
    pub principal: f64,

    /// Date of the first return payment
    pub start_date: NaiveDate,

    /// Whole months elapsed since the investment was made
    pub months_invested: u32,
}
