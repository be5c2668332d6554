#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Shared types for the QIWI Wallet API client.
//!
//! Everything here is process-wide, read-only data or a small value type. Nothing in this
//! crate performs I/O; the HTTP side lives in the `qiwi-wallet` crate.
//!
//! # Modules
//!
//! - [`recipients`] - Provider identifiers for banks, card networks, services and wallet transfers
//! - [`enums`] - Transaction-type and receipt-format codes
//! - [`money_amount`] - Human-readable amount parsing
//! - [`payment_id`] - Process-wide monotonic payment identifiers
//! - [`config`] - Environment variable resolution for configuration values

pub mod config;
pub mod enums;
pub mod money_amount;
pub mod payment_id;
pub mod recipients;

pub use enums::{ReceiptFormat, TransactionType};
pub use money_amount::MoneyAmount;
pub use payment_id::PaymentId;
