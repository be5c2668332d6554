//! Enumerated codes of the QIWI Wallet API.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Direction of a transaction.
///
/// Webhook registration takes the numeric [`code`](TransactionType::code), while history,
/// statistics and receipt endpoints take the textual form (`"IN"`, `"OUT"`, `"ALL"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    In,
    Out,
    All,
}

impl TransactionType {
    pub fn code(&self) -> u8 {
        match self {
            TransactionType::In => 0,
            TransactionType::Out => 1,
            TransactionType::All => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::In => "IN",
            TransactionType::Out => "OUT",
            TransactionType::All => "ALL",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown {kind}: {value}")]
pub struct UnknownCodeError {
    kind: &'static str,
    value: String,
}

impl FromStr for TransactionType {
    type Err = UnknownCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IN" | "0" => Ok(TransactionType::In),
            "OUT" | "1" => Ok(TransactionType::Out),
            "ALL" | "2" => Ok(TransactionType::All),
            _ => Err(UnknownCodeError {
                kind: "transaction type",
                value: s.to_string(),
            }),
        }
    }
}

/// File format of a transaction receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReceiptFormat {
    Jpeg,
    Pdf,
}

impl ReceiptFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptFormat::Jpeg => "JPEG",
            ReceiptFormat::Pdf => "PDF",
        }
    }
}

impl Display for ReceiptFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReceiptFormat {
    type Err = UnknownCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "JPEG" | "JPG" => Ok(ReceiptFormat::Jpeg),
            "PDF" => Ok(ReceiptFormat::Pdf),
            _ => Err(UnknownCodeError {
                kind: "receipt format",
                value: s.to_string(),
            }),
        }
    }
}
