//! Human-readable amount parsing.
//!
//! The wallet works in Russian roubles with kopeck precision, so a [`MoneyAmount`] is a
//! non-negative decimal with at most two fractional digits. On the wire it is a plain
//! JSON number.
//!
//! # Supported Formats
//!
//! - Plain numbers: `"100"`, `"0.01"`
//! - With currency symbols: `"₽10.50"`, `"10.50 RUB"`
//! - With thousand separators: `"1,000"`, `"1,000,000.50"`
//!
//! # Example
//!
//! ```rust
//! use qiwi_types::MoneyAmount;
//!
//! let amount = MoneyAmount::parse("1,000.50").unwrap();
//! assert_eq!(amount.scale(), 2);
//! assert_eq!(amount.to_string(), "1000.5");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;

/// A parsed monetary amount in roubles.
///
/// Deserialization goes through [`TryFrom<Decimal>`], so the sign, range and precision checks
/// apply to wire input as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct MoneyAmount(pub Decimal);

impl MoneyAmount {
    /// Number of digits after the decimal point.
    pub fn scale(&self) -> u32 {
        self.0.scale()
    }

    /// The value as an unsigned integer without the decimal point.
    ///
    /// For example, `"12.34"` returns `1234`.
    pub fn mantissa(&self) -> u128 {
        self.0.mantissa().unsigned_abs()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MoneyAmountParseError {
    #[error("Invalid number format")]
    InvalidFormat,
    #[error(
        "Amount must be between {} and {}",
        money_amount::MIN_STR,
        money_amount::MAX_STR
    )]
    OutOfRange,
    #[error("Negative value is not allowed")]
    Negative,
    #[error("Too big of a precision: {0} fractional digits, at most 2 allowed")]
    WrongPrecision(u32),
}

mod money_amount {
    use super::*;

    pub const MIN_STR: &str = "0.01";
    pub const MAX_STR: &str = "999999999";
    pub const MAX_SCALE: u32 = 2;

    pub static MIN: Lazy<Decimal> = Lazy::new(|| Decimal::new(1, 2));
    pub static MAX: Lazy<Decimal> = Lazy::new(|| Decimal::from(999_999_999u32));
    pub static NOT_A_NUMBER: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[^\d\.\-]+").expect("valid regex"));
}

impl MoneyAmount {
    pub fn parse(input: &str) -> Result<Self, MoneyAmountParseError> {
        // Remove anything that isn't digit, dot, minus
        let cleaned = money_amount::NOT_A_NUMBER.replace_all(input, "");
        let parsed =
            Decimal::from_str(&cleaned).map_err(|_| MoneyAmountParseError::InvalidFormat)?;
        Self::try_from(parsed)
    }
}

impl TryFrom<Decimal> for MoneyAmount {
    type Error = MoneyAmountParseError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.is_sign_negative() {
            return Err(MoneyAmountParseError::Negative);
        }
        if value < *money_amount::MIN || value > *money_amount::MAX {
            return Err(MoneyAmountParseError::OutOfRange);
        }
        let value = value.normalize();
        if value.scale() > money_amount::MAX_SCALE {
            return Err(MoneyAmountParseError::WrongPrecision(value.scale()));
        }
        Ok(MoneyAmount(value))
    }
}

impl FromStr for MoneyAmount {
    type Err = MoneyAmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoneyAmount::parse(s)
    }
}

impl TryFrom<&str> for MoneyAmount {
    type Error = MoneyAmountParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        MoneyAmount::from_str(value)
    }
}

impl From<MoneyAmount> for Decimal {
    fn from(value: MoneyAmount) -> Self {
        value.0
    }
}

impl From<u32> for MoneyAmount {
    fn from(value: u32) -> Self {
        MoneyAmount(Decimal::from(value))
    }
}

impl TryFrom<f64> for MoneyAmount {
    type Error = MoneyAmountParseError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let decimal = Decimal::from_f64(value).ok_or(MoneyAmountParseError::OutOfRange)?;
        Self::try_from(decimal)
    }
}

impl Display for MoneyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}
