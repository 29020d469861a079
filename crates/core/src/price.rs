use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ValueError;

/// A shelf price read off a tag. Always non-negative, two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    pub fn from_decimal(decimal: Decimal) -> Result<Self, ValueError> {
        if decimal.is_sign_negative() && !decimal.is_zero() {
            return Err(ValueError::NegativePrice(decimal.to_string()));
        }
        Ok(Price(decimal.round_dp(2)))
    }

    pub fn from_cents(cents: i64) -> Result<Self, ValueError> {
        Self::from_decimal(Decimal::from(cents) / Decimal::from(100))
    }

    pub fn to_cents(self) -> i64 {
        (self.0 * Decimal::from(100)).to_i64().unwrap_or(i64::MAX)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = ValueError;

    /// Parses a canonical amount (`1234.56`). Locale separators must already be normalized.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dec = Decimal::from_str(s.trim()).map_err(|_| ValueError::InvalidPrice(s.to_string()))?;
        Self::from_decimal(dec)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
