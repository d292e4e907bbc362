//! SugarBounce token / BuyCredit relay CLI.
//!
//! ```text
//!   config.toml + RELAY_* env
//!        │
//!        ▼
//!   Session::connect ──► node RPC (reads, direct submission)
//!        │           └─► relay RPC (meta-transaction submission)
//!        ▼
//!   flows::{deploy, token, permit, relay, buy_credit}
//!        │
//!        ▼
//!   Confirmed / Pending → exit 0      Failed / error → exit 1
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use buycredit_relay::blockchain::SubmitOutcome;
use buycredit_relay::config::load_config;
use buycredit_relay::flows::{
    buy_credit, deploy, parse_address, permit, relay, token, FlowOutcome, FlowResult,
    Session,
};
use buycredit_relay::observability::logging;

#[derive(Parser)]
#[command(name = "buycredit-relay")]
#[command(about = "Sign and submit SugarBounce permits, meta-transactions and BuyCredit transfers", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, env = "RELAY_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Build and sign, print the result, do not submit
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a contract from compiled artifacts
    Deploy {
        #[command(subcommand)]
        target: DeployTarget,
    },
    /// Mint tokens (amount in whole tokens)
    Mint {
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
    },
    /// Show token, relay and BuyCredit nonces for an account
    Nonces {
        /// Defaults to the signer
        #[arg(long)]
        account: Option<String>,
    },
    /// Sign a permit for BuyCredit and submit permitSBToken
    Permit {
        #[arg(long)]
        amount: String,
    },
    /// Sign a permit, wrap it in a meta-transaction and submit via the relay
    RelayPermit {
        #[arg(long)]
        amount: String,
    },
    /// Sign a BuyCredit transfer and submit it
    BuyCredit {
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
    },
    /// Print an unsigned typed-data payload
    Payload {
        #[command(subcommand)]
        kind: PayloadKind,
    },
}

#[derive(Subcommand)]
enum DeployTarget {
    /// SugarBounceToken
    Token,
    /// BuyCredit(sbToken)
    BuyCredit {
        /// Defaults to the recorded or configured token
        #[arg(long)]
        token: Option<String>,
    },
}

#[derive(Subcommand)]
enum PayloadKind {
    Permit {
        #[arg(long)]
        amount: String,
        /// Defaults to the signer
        #[arg(long)]
        owner: Option<String>,
    },
    BuyCredit {
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
        /// Defaults to the signer
        #[arg(long)]
        from: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            logging::init("info");
            tracing::error!(error = %e, path = %cli.config.display(), "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.observability.log_level);

    match run(cli, config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

/// Run one command. `Ok(false)` means a transaction ended in `Failed`.
async fn run(cli: Cli, config: buycredit_relay::AppConfig) -> FlowResult<bool> {
    let session = Session::connect(config, cli.dry_run).await?;

    let outcome = match cli.command {
        Commands::Deploy { target } => match target {
            DeployTarget::Token => deploy::deploy_token(&session).await?,
            DeployTarget::BuyCredit { token } => {
                let token = token.map(|t| parse_address("--token", &t)).transpose()?;
                deploy::deploy_buy_credit(&session, token).await?
            }
        },
        Commands::Mint { to, amount } => {
            let to = parse_address("--to", &to)?;
            token::mint(&session, to, session.token_amount(&amount)?).await?
        }
        Commands::Nonces { account } => {
            let account = account.map(|a| parse_address("--account", &a)).transpose()?;
            println!("{}", token::nonces(&session, account).await?);
            return Ok(true);
        }
        Commands::Permit { amount } => {
            permit::permit(&session, session.token_amount(&amount)?).await?
        }
        Commands::RelayPermit { amount } => {
            relay::relay_permit(&session, session.token_amount(&amount)?).await?
        }
        Commands::BuyCredit { to, amount } => {
            let to = parse_address("--to", &to)?;
            buy_credit::buy_credit(&session, to, session.token_amount(&amount)?).await?
        }
        Commands::Payload { kind } => {
            let json = match kind {
                PayloadKind::Permit { amount, owner } => {
                    let owner = owner.map(|o| parse_address("--owner", &o)).transpose()?;
                    let owner = session.account_or_signer(owner)?;
                    permit::build_permit(&session, owner, session.token_amount(&amount)?)
                        .await?
                        .to_json()
                }
                PayloadKind::BuyCredit { to, amount, from } => {
                    let from = from.map(|f| parse_address("--from", &f)).transpose()?;
                    let from = session.account_or_signer(from)?;
                    let to = parse_address("--to", &to)?;
                    buy_credit::build_buy_credit(&session, from, to, session.token_amount(&amount)?)
                        .await?
                        .to_json()
                }
            };
            print_json(&json);
            return Ok(true);
        }
    };

    Ok(report(&outcome))
}

fn report(outcome: &FlowOutcome) -> bool {
    match outcome {
        FlowOutcome::DryRun(dry) => {
            for payload in &dry.payloads {
                print_json(payload);
            }
            match dry.to {
                Some(to) => println!("to:       {}", to),
                None => println!("to:       (contract creation)"),
            }
            println!("calldata: {}", dry.calldata);
            true
        }
        FlowOutcome::Submitted(SubmitOutcome::Confirmed {
            tx_hash,
            block_number,
            contract_address,
        }) => {
            println!("Confirmed {} in block {}", tx_hash, block_number);
            if let Some(address) = contract_address {
                println!("Contract address: {}", address);
            }
            true
        }
        FlowOutcome::Submitted(SubmitOutcome::Pending(tx_hash)) => {
            println!("Pending {} (no receipt yet)", tx_hash);
            true
        }
        FlowOutcome::Submitted(SubmitOutcome::Failed(cause)) => {
            eprintln!("Failed: {}", cause);
            false
        }
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::error!(error = %e, "Failed to render JSON"),
    }
}
