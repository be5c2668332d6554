//! Argument parsing and dispatch for the command-line tool.

use clap::{Parser, Subcommand};
use qiwi_wallet::config::ConfigError;
use qiwi_wallet::{
    BankTransfer, HistoryQuery, MoneyAmount, ReceiptFormat, StatsQuery, TransactionType,
    WalletClient, WalletConfig, WalletError, recipients,
};
use serde_json::{Value, json};
use std::io::Write;
use std::path::PathBuf;

/// QIWI Wallet API command-line client.
#[derive(Parser, Debug)]
#[command(name = "qiwi-wallet")]
#[command(version, about = "QIWI Wallet API command-line client")]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, short, env = "QIWI_CONFIG")]
    config: Option<PathBuf>,
    /// API access token, used when no configuration file is given
    #[arg(long, env = "QIWI_TOKEN", hide_env_values = true)]
    token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Provider identifier by name, e.g. `tinkoff` or `visa_rus`
    Recipient { name: String },
    #[command(flatten)]
    Api(ApiCommand),
}

/// Subcommands that call the API.
#[derive(Subcommand, Debug)]
enum ApiCommand {
    /// Account profile
    Profile,
    /// Balances of all wallet accounts
    Balance,
    /// Identification status of a wallet
    Identification { wallet: String },
    /// Payment history
    History {
        #[arg(long, default_value_t = 10)]
        rows: u32,
        #[arg(long)]
        operation: Option<TransactionType>,
        #[arg(long = "source")]
        sources: Vec<String>,
        #[arg(long, requires = "end")]
        start: Option<String>,
        #[arg(long, requires = "start")]
        end: Option<String>,
    },
    /// Payment totals for a period
    Stats {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        operation: Option<TransactionType>,
    },
    /// Details of one transaction
    Transaction {
        id: String,
        transaction_type: TransactionType,
    },
    /// Download a transaction receipt
    Receipt {
        id: String,
        transaction_type: TransactionType,
        #[arg(long, default_value = "PDF")]
        format: ReceiptFormat,
        /// Output file, stdout if omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Currency cross rates
    CrossRates,
    /// Commission rules of a provider
    Commission { provider: u32 },
    /// Exact commission for one payment
    OnlineCommission {
        provider: u32,
        account: String,
        amount: MoneyAmount,
    },
    /// Provider of a card number
    DetectCard { number: String },
    /// Mobile operator of a phone number
    DetectOperator { phone: String },
    /// Send money
    #[command(subcommand)]
    Pay(PayCommand),
    /// Manage the notification hook
    #[command(subcommand)]
    Webhook(WebhookCommand),
}

#[derive(Subcommand, Debug)]
enum PayCommand {
    Wallet {
        wallet: String,
        amount: MoneyAmount,
        #[arg(long, default_value = "")]
        comment: String,
    },
    Phone {
        phone: String,
        amount: MoneyAmount,
        #[arg(long, default_value = "")]
        comment: String,
    },
    Card {
        number: String,
        amount: MoneyAmount,
        #[arg(long, default_value = "")]
        comment: String,
    },
    Bank {
        /// Bank provider identifier or name
        recipient: String,
        account: String,
        #[arg(long, default_value = "1")]
        account_type: String,
        /// Card expiry, MMYY
        #[arg(long)]
        exp_date: String,
        amount: MoneyAmount,
        #[arg(long, default_value = "")]
        comment: String,
    },
}

#[derive(Subcommand, Debug)]
enum WebhookCommand {
    Active,
    Test,
    Add {
        url: String,
        #[arg(default_value = "ALL")]
        transaction_type: TransactionType,
    },
    Remove { hook_id: String },
    Secret { hook_id: String },
    RefreshSecret { hook_id: String },
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("No credentials: pass --config or --token (or set QIWI_CONFIG / QIWI_TOKEN)")]
    MissingToken,
    #[error("Unknown recipient: {0}")]
    UnknownRecipient(String),
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to format output: {0}")]
    Json(#[from] serde_json::Error),
}

fn load_config(
    config: Option<PathBuf>,
    token: Option<String>,
) -> Result<WalletConfig, CliError> {
    if let Some(path) = config {
        return Ok(WalletConfig::load(&path)?);
    }
    token
        .as_deref()
        .map(WalletConfig::from_token)
        .ok_or(CliError::MissingToken)
}

fn resolve_recipient(name_or_id: &str) -> Result<u32, CliError> {
    name_or_id
        .parse()
        .ok()
        .or_else(|| recipients::lookup(name_or_id))
        .ok_or_else(|| CliError::UnknownRecipient(name_or_id.to_string()))
}

/// Executes the parsed command and prints its result.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        config,
        token,
        command,
    } = cli;
    match command {
        Command::Recipient { name } => {
            let id = recipients::lookup(&name)
                .ok_or_else(|| CliError::UnknownRecipient(name.clone()))?;
            print_json(&json!({"name": name, "id": id}))
        }
        Command::Api(command) => {
            let config = load_config(config, token)?;
            let client = WalletClient::from_config(&config)?;
            tracing::debug!(api_url = %client.api_url(), "Client ready");
            match execute(&client, command).await? {
                Some(output) => print_json(&output),
                None => Ok(()),
            }
        }
    }
}

/// Runs one API command. Returns `None` when the output was already written.
async fn execute(client: &WalletClient, command: ApiCommand) -> Result<Option<Value>, CliError> {
    let output: Value = match command {
        ApiCommand::Profile => client.get_account_info().await?,
        ApiCommand::Balance => client.get_balance().await?,
        ApiCommand::Identification { wallet } => client.get_identification(&wallet).await?,
        ApiCommand::History {
            rows,
            operation,
            sources,
            start,
            end,
        } => {
            let mut query = HistoryQuery::new(rows);
            query.operation = operation;
            query.sources = sources;
            if let (Some(start), Some(end)) = (start, end) {
                query = query.with_period(start, end);
            }
            client.get_operation_history(&query).await?
        }
        ApiCommand::Stats {
            start,
            end,
            operation,
        } => {
            let mut query = StatsQuery::new(start, end);
            query.operation = operation;
            client.get_operation_stats(&query).await?
        }
        ApiCommand::Transaction {
            id,
            transaction_type,
        } => client.get_transaction_info(&id, transaction_type).await?,
        ApiCommand::Receipt {
            id,
            transaction_type,
            format,
            output,
        } => {
            let receipt = client.get_receipt(&id, transaction_type, format).await?;
            match output {
                Some(path) => std::fs::write(&path, &receipt.bytes)?,
                None => std::io::stdout().write_all(&receipt.bytes)?,
            }
            tracing::info!(bytes = receipt.bytes.len(), %format, "Receipt downloaded");
            return Ok(None);
        }
        ApiCommand::CrossRates => client.get_cross_rates().await?,
        ApiCommand::Commission { provider } => client.check_commission(provider).await?,
        ApiCommand::OnlineCommission {
            provider,
            account,
            amount,
        } => {
            client
                .check_online_commission(provider, &account, amount)
                .await?
        }
        ApiCommand::DetectCard { number } => {
            serde_json::to_value(client.detect_card(&number).await?)?
        }
        ApiCommand::DetectOperator { phone } => {
            serde_json::to_value(client.detect_operator(&phone).await?)?
        }
        ApiCommand::Pay(pay) => match pay {
            PayCommand::Wallet {
                wallet,
                amount,
                comment,
            } => client.send_to_wallet(&wallet, amount, &comment).await?,
            PayCommand::Phone {
                phone,
                amount,
                comment,
            } => client.send_to_mobile_phone(&phone, amount, &comment).await?,
            PayCommand::Card {
                number,
                amount,
                comment,
            } => client.send_to_card(&number, amount, &comment).await?,
            PayCommand::Bank {
                recipient,
                account,
                account_type,
                exp_date,
                amount,
                comment,
            } => {
                let transfer = BankTransfer {
                    recipient: resolve_recipient(&recipient)?,
                    account,
                    account_type,
                    exp_date,
                };
                client.send_to_bank_account(&transfer, amount, &comment).await?
            }
        },
        ApiCommand::Webhook(webhook) => match webhook {
            WebhookCommand::Active => client.get_active_webhook().await?,
            WebhookCommand::Test => client.test_active_webhook().await?,
            WebhookCommand::Add {
                url,
                transaction_type,
            } => client.add_webhook(&url, transaction_type).await?,
            WebhookCommand::Remove { hook_id } => client.remove_webhook(&hook_id).await?,
            WebhookCommand::Secret { hook_id } => client.get_webhook_secret(&hook_id).await?,
            WebhookCommand::RefreshSecret { hook_id } => {
                client.refresh_webhook_secret(&hook_id).await?
            }
        },
    };
    Ok(Some(output))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_history() {
        let cli = Cli::try_parse_from([
            "qiwi-wallet",
            "--token",
            "abc",
            "history",
            "--rows",
            "5",
            "--operation",
            "in",
            "--source",
            "QW_RUB",
        ])
        .unwrap();
        match cli.command {
            Command::Api(ApiCommand::History {
                rows,
                operation,
                sources,
                ..
            }) => {
                assert_eq!(rows, 5);
                assert_eq!(operation, Some(TransactionType::In));
                assert_eq!(sources, vec!["QW_RUB".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_pay_wallet_amount() {
        let args = ["qiwi-wallet", "pay", "wallet", "79990000000", "1,000.50"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Api(ApiCommand::Pay(PayCommand::Wallet { amount, .. })) => {
                assert_eq!(amount, MoneyAmount::parse("1000.5").unwrap())
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_recipient_needs_no_credentials() {
        let cli = Cli::try_parse_from(["qiwi-wallet", "recipient", "sberbank"]).unwrap();
        match cli.command {
            Command::Recipient { name } => assert_eq!(name, "sberbank"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_missing_credentials() {
        assert!(matches!(load_config(None, None), Err(CliError::MissingToken)));
        let config = load_config(None, Some("abc".into())).unwrap();
        assert_eq!(config.token(), "abc");
    }

    #[test]
    fn test_resolve_recipient() {
        assert_eq!(resolve_recipient("tinkoff").unwrap(), 466);
        assert_eq!(resolve_recipient("816").unwrap(), 816);
        assert!(resolve_recipient("nobank").is_err());
    }
}
