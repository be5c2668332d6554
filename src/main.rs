//! `qiwi-wallet` command-line tool.
//!
//! A thin shell over [`qiwi_wallet::WalletClient`]: every subcommand issues one operation and
//! prints the JSON payload to stdout.
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `QIWI_TOKEN` or `QIWI_CONFIG` select the credentials
//! - `RUST_LOG` controls log verbosity (logs go to stderr)

mod cli;
mod telemetry;

use clap::Parser;
use dotenvy::dotenv;

use crate::cli::Cli;
use crate::telemetry::Telemetry;

#[tokio::main]
async fn main() {
    // Load .env variables
    dotenv().ok();

    let _telemetry = Telemetry::new()
        .with_name(env!("CARGO_PKG_NAME"))
        .with_version(env!("CARGO_PKG_VERSION"))
        .register();

    let args = Cli::parse();
    if let Err(err) = cli::run(args).await {
        tracing::error!(error = %err, "Command failed");
        std::process::exit(1);
    }
}
