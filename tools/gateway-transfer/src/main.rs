use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gateway_api::{GatewayClient, GatewayConfig};
use gateway_intent_types::Network;
use tracing_subscriber::EnvFilter;

mod commands;
mod credentials;
mod onchain;
mod receipts;

use commands::TransferArgs;
use credentials::{Credential, CredentialArgs};
use gateway_intent_encoder::LocalKeySigner;
use onchain::{DepositArgs, MintArgs};

/// Move USDC across chains through Circle Gateway.
///
/// Signs EIP-712 burn intents locally (or through a wallet) and submits them to the Gateway
/// API. Keys and the API key are read from flags or the environment (`.env` is loaded).
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Gateway network: testnet or mainnet.
    #[arg(long, env = "GATEWAY_NETWORK", default_value = "testnet", value_parser = parse_network)]
    network: Network,

    /// Override the Gateway API root (defaults to the network's).
    #[arg(long, env = "GATEWAY_API_URL")]
    api_url: Option<String>,

    /// Gateway API key, sent as a bearer token.
    #[arg(long, env = "GATEWAY_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// HTTP timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    #[command(flatten)]
    credentials: CredentialArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show deposited USDC per domain and the unified total.
    Balance {
        /// Depositor to query (defaults to the signer's address).
        #[arg(long)]
        depositor: Option<String>,
    },
    /// Burn on one source chain and mint on one or more destinations.
    Transfer(TransferArgs),
    /// Approve and deposit wallet USDC into the Gateway Wallet on one chain.
    Deposit(DepositArgs),
    /// Call `gatewayMint` on a destination chain for accepted transfers.
    Mint(MintArgs),
}

fn parse_network(value: &str) -> Result<Network, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "testnet" => Ok(Network::Testnet),
        "mainnet" => Ok(Network::Mainnet),
        other => Err(format!("unknown network {other:?}, expected testnet or mainnet")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let client = GatewayClient::new(gateway_config(&cli)).context("invalid Gateway configuration")?;

    match &cli.command {
        Command::Balance { depositor } => {
            let depositor = match depositor {
                Some(d) => d.clone(),
                None => cli
                    .credentials
                    .resolve()
                    .await
                    .context("no --depositor given and no signer configured")?
                    .address()
                    .to_string(),
            };
            commands::balance(&client, cli.network, &depositor).await
        }
        Command::Transfer(args) => {
            let credential = cli.credentials.resolve().await?;
            match credential {
                Credential::Local(signer) => {
                    commands::transfer(&client, cli.network, &signer, args).await
                }
                Credential::Wallet(wallet) => {
                    commands::transfer(&client, cli.network, &wallet, args).await
                }
            }
        }
        Command::Deposit(args) => {
            let signer = local_signer(&cli.credentials).await?;
            onchain::deposit(cli.network, &signer, args).await
        }
        Command::Mint(args) => {
            let signer = local_signer(&cli.credentials).await?;
            onchain::mint(cli.network, &signer, args).await
        }
    }
}

/// Transactions are signed in process, so on-chain commands need a private key.
async fn local_signer(credentials: &CredentialArgs) -> Result<LocalKeySigner> {
    match credentials.resolve().await? {
        Credential::Local(signer) => Ok(signer),
        Credential::Wallet(_) => {
            bail!("on-chain commands need --private-key or --private-key-path, not --wallet-rpc")
        }
    }
}

fn gateway_config(cli: &Cli) -> GatewayConfig {
    let config = match &cli.api_url {
        Some(url) => GatewayConfig::new(url.clone()),
        None => GatewayConfig::for_network(cli.network),
    };
    config
        .with_api_key(cli.api_key.clone())
        .with_timeout(Duration::from_secs(cli.timeout_secs))
}
