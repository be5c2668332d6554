#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Rust client for the [QIWI Wallet API](https://developer.qiwi.com/en/qiwi-wallet-personal/).
//!
//! The crate maps each API operation one-to-one onto an async method of [`WalletClient`]:
//! account profile and balance, payment history and statistics, transaction details and
//! receipts, transfers to wallets, phones, cards and bank accounts, commission lookups, and
//! webhook management.
//!
//! # Overview
//!
//! Every operation follows the same path:
//!
//! 1. build an [`ApiRequest`](transport::ApiRequest) (method, URL, bearer headers, query, body);
//! 2. hand it to a [`Transport`](transport::Transport), by default [`ReqwestTransport`];
//! 3. classify the outcome in [`response::normalize`];
//! 4. return a single `Result`.
//!
//! Payloads are passed through as [`serde_json::Value`]; the API's own error bodies come back as
//! [`WalletError::Api`]. There are no retries, no caching and no background tasks.
//!
//! # Modules
//!
//! - [`client`] - The [`WalletClient`] and its operations, grouped by API area.
//! - [`config`] - [`WalletConfig`] loading with environment variable references.
//! - [`error`] - The [`WalletError`] type.
//! - [`response`] - Response normalization.
//! - [`transport`] - Request descriptors and the HTTP seam.
//!
//! Provider codes and enumerations live in the `qiwi-types` crate and are re-exported here as
//! [`recipients`], [`TransactionType`] and [`ReceiptFormat`].
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables `tracing` spans around every operation.
//! - `cli` - Builds the `qiwi-wallet` command-line tool.
//!
//! # Example
//!
//! ```rust,no_run
//! use qiwi_wallet::{MoneyAmount, WalletClient, recipients};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = WalletClient::try_new("access-token")?;
//! let profile = client.get_account_info().await?;
//! let amount = MoneyAmount::parse("100")?;
//! let fee = client
//!     .check_online_commission(recipients::cards::VISA_RUS, "4111111111111111", amount)
//!     .await?;
//! println!("{profile}\n{fee}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod response;
pub mod transport;

pub use client::WalletClient;
pub use client::detect::Detection;
pub use client::history::{HistoryQuery, Receipt, StatsQuery};
pub use client::payments::{BankTransfer, PaymentRequest};
pub use config::WalletConfig;
pub use error::WalletError;
pub use transport::{ReqwestTransport, Transport, TransportError};

pub use qiwi_types::{MoneyAmount, PaymentId, ReceiptFormat, TransactionType, recipients};
