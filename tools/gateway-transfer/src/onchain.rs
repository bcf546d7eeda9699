//! On-chain steps around a Gateway transfer: depositing USDC into the Gateway Wallet on a
//! source chain, and calling `gatewayMint` with an attestation on a destination chain.

use std::path::PathBuf;

use alloy_primitives::{Address, Bytes, U256};
use anyhow::{bail, Context, Result};
use clap::Args;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{transaction::eip2718::TypedTransaction, TransactionRequest, H160, U64},
};
use gateway_api::{
    allowance_calldata, approve_calldata, balance_of_calldata, decode_uint256, deposit_calldata,
    gateway_mint_calldata,
};
use gateway_intent_encoder::{encoding::format_usdc, parse_usdc_amount, IntentSigner, LocalKeySigner};
use gateway_intent_types::{Chain, Network};
use serde_json::json;
use tracing::info;

use crate::commands::{lookup_chain, network_name};
use crate::receipts::{self, now_rfc3339, Receipt, DEPOSITS, TRANSFERS};

#[derive(Args, Debug)]
pub struct DepositArgs {
    /// Chain to deposit on (slug or Gateway domain).
    #[arg(long)]
    pub chain: String,

    /// JSON-RPC endpoint for that chain.
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: String,

    /// USDC to deposit (defaults to the whole wallet balance).
    #[arg(long)]
    pub amount: Option<String>,

    /// Receipts file (defaults to transfers.<network>.json).
    #[arg(long)]
    pub receipts_path: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct MintArgs {
    /// Destination chain to mint on (slug or Gateway domain).
    #[arg(long)]
    pub chain: String,

    /// JSON-RPC endpoint for that chain.
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: String,

    /// Attestation payload (hex). Without it, pending entries from the receipts file are minted.
    #[arg(long, requires = "signature")]
    pub attestation: Option<String>,

    /// Attestation signature (hex).
    #[arg(long, requires = "attestation")]
    pub signature: Option<String>,

    /// Receipts file (defaults to transfers.<network>.json).
    #[arg(long)]
    pub receipts_path: Option<PathBuf>,
}

/// What a deposit has to do given the wallet's USDC state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepositPlan {
    pub amount: U256,
    pub needs_approval: bool,
}

/// `amount = None` deposits the whole wallet balance.
pub fn plan_deposit(wallet_balance: U256, allowance: U256, amount: Option<U256>) -> Result<DepositPlan> {
    if wallet_balance.is_zero() {
        bail!("wallet holds no USDC");
    }
    let amount = amount.unwrap_or(wallet_balance);
    if amount.is_zero() {
        bail!("deposit amount must be positive");
    }
    if amount > wallet_balance {
        bail!(
            "wallet holds {} USDC, cannot deposit {}",
            format_usdc(wallet_balance),
            format_usdc(amount)
        );
    }
    Ok(DepositPlan {
        amount,
        needs_approval: allowance < amount,
    })
}

/// A mined transaction.
#[derive(Clone, Debug)]
pub struct SentTx {
    pub hash: String,
    pub success: bool,
    pub explorer: String,
}

/// Signing RPC client bound to one chain.
pub struct ChainClient {
    client: SignerMiddleware<Provider<Http>, LocalWallet>,
    chain: &'static Chain,
}

impl ChainClient {
    /// Connect and check that the endpoint serves `chain`.
    pub async fn connect(rpc_url: &str, chain: &'static Chain, signer: &LocalKeySigner) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .with_context(|| format!("invalid RPC url {rpc_url}"))?;
        let remote = provider
            .get_chainid()
            .await
            .with_context(|| format!("failed querying chain id from {rpc_url}"))?;
        if remote.as_u64() != chain.chain_id {
            bail!(
                "RPC endpoint serves chain {remote}, but {} is chain {}",
                chain.slug,
                chain.chain_id
            );
        }

        let wallet = LocalWallet::from_bytes(signer.signing_key().to_bytes().as_slice())
            .context("failed loading transaction key")?
            .with_chain_id(chain.chain_id);
        Ok(Self {
            client: SignerMiddleware::new(provider, wallet),
            chain,
        })
    }

    fn request(&self, to: Address, data: Bytes) -> TransactionRequest {
        TransactionRequest::new()
            .from(self.client.address())
            .to(H160::from_slice(to.as_slice()))
            .data(data.to_vec())
    }

    pub async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx: TypedTransaction = self.request(to, data).into();
        let out = self.client.call(&tx, None).await.context("eth_call failed")?;
        Ok(Bytes::from(out.to_vec()))
    }

    async fn read_uint(&self, to: Address, data: Bytes) -> Result<U256> {
        let out = self.call(to, data).await?;
        decode_uint256(&out).context("unexpected return data")
    }

    /// Send a transaction and wait for it to be mined.
    pub async fn send(&self, to: Address, data: Bytes, what: &str) -> Result<SentTx> {
        let pending = self
            .client
            .send_transaction(self.request(to, data), None)
            .await
            .with_context(|| format!("failed sending {what}"))?;
        let hash = format!("{:?}", *pending);
        info!(chain = self.chain.slug, tx = %hash, "{what} sent");

        let receipt = pending
            .await
            .with_context(|| format!("failed waiting for {what}"))?
            .with_context(|| format!("{what} {hash} dropped from the mempool"))?;
        Ok(SentTx {
            success: receipt.status == Some(U64::from(1)),
            explorer: self.chain.tx_url(&hash),
            hash,
        })
    }
}

fn receipts_path(explicit: &Option<PathBuf>, network: Network) -> PathBuf {
    explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("transfers.{}.json", network_name(network))))
}

pub async fn deposit(network: Network, signer: &LocalKeySigner, args: &DepositArgs) -> Result<()> {
    let chain = lookup_chain(network, &args.chain)?;
    let amount = args.amount.as_deref().map(parse_usdc_amount).transpose()?;
    let rpc = ChainClient::connect(&args.rpc_url, chain, signer).await?;
    let owner = signer.address();
    let gateway_wallet = network.gateway_wallet();

    let held = rpc.read_uint(chain.usdc, balance_of_calldata(owner)).await?;
    let allowance = rpc
        .read_uint(chain.usdc, allowance_calldata(owner, gateway_wallet))
        .await?;
    let plan = plan_deposit(held, allowance, amount)?;
    println!(
        "Depositing {} USDC on {} (wallet holds {})",
        format_usdc(plan.amount),
        chain.name,
        format_usdc(held)
    );

    let mut approval = None;
    if plan.needs_approval {
        let tx = rpc
            .send(chain.usdc, approve_calldata(gateway_wallet, plan.amount), "approve")
            .await?;
        println!("  approve: {} ({})", tx.hash, tx.explorer);
        if !tx.success {
            bail!("approve transaction {} reverted", tx.hash);
        }
        approval = Some(tx.hash);
    }

    let tx = rpc
        .send(gateway_wallet, deposit_calldata(chain.usdc, plan.amount), "deposit")
        .await?;
    println!("  deposit: {} ({})", tx.hash, tx.explorer);

    let path = receipts_path(&args.receipts_path, network);
    let entry = json!({
        "depositor": owner.to_string(),
        "amount": format_usdc(plan.amount),
        "approve_tx": approval,
        "status": if tx.success { "success" } else { "reverted" },
        "explorer": tx.explorer,
        "deposited_at": now_rfc3339(),
    });
    receipts::record(
        &path,
        network_name(network),
        DEPOSITS,
        vec![Receipt::new(chain.slug, tx.hash.clone(), entry)],
    )?;
    println!("Receipts written to {}", path.display());

    if !tx.success {
        bail!("deposit transaction {} reverted", tx.hash);
    }
    Ok(())
}

pub async fn mint(network: Network, signer: &LocalKeySigner, args: &MintArgs) -> Result<()> {
    let chain = lookup_chain(network, &args.chain)?;
    let path = receipts_path(&args.receipts_path, network);

    let explicit = match (&args.attestation, &args.signature) {
        (Some(attestation), Some(signature)) => {
            let attestation: Bytes = attestation.trim().parse().context("attestation is not hex")?;
            let signature: Bytes = signature.trim().parse().context("signature is not hex")?;
            Some(gateway_mint_calldata(&attestation, &signature))
        }
        _ => None,
    };
    let work: Vec<(Option<String>, Bytes)> = match explicit {
        Some(calldata) => vec![(None, calldata)],
        None => {
            let root = receipts::load(&path)?;
            let mut work = Vec::new();
            for (key, calldata) in receipts::pending_mints(&root, chain.slug) {
                let calldata: Bytes = calldata
                    .parse()
                    .with_context(|| format!("bad mint calldata for {key}"))?;
                work.push((Some(key), calldata));
            }
            work
        }
    };
    if work.is_empty() {
        println!("Nothing to mint on {} in {}", chain.name, path.display());
        return Ok(());
    }

    let rpc = ChainClient::connect(&args.rpc_url, chain, signer).await?;
    let minter = network.gateway_minter();
    let mut minted = Vec::new();
    let mut failed = 0usize;
    for (key, calldata) in work {
        let tx = rpc.send(minter, calldata, "gatewayMint").await?;
        println!(
            "  mint on {}: {} {} ({})",
            chain.slug,
            if tx.success { "success" } else { "reverted" },
            tx.hash,
            tx.explorer
        );
        if !tx.success {
            failed += 1;
        }
        if let Some(key) = key {
            let fields = json!({
                "mint_tx": tx.hash,
                "mint_status": if tx.success { "success" } else { "reverted" },
                "mint_explorer": tx.explorer,
                "minted_at": now_rfc3339(),
            });
            minted.push(Receipt::new(chain.slug, key, fields));
        }
    }

    if !minted.is_empty() {
        receipts::record(&path, network_name(network), TRANSFERS, minted)?;
        println!("Receipts written to {}", path.display());
    }
    if failed > 0 {
        bail!("{failed} mint transaction(s) reverted");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usdc(units: u64) -> U256 {
        U256::from(units)
    }

    #[test]
    fn whole_balance_by_default() {
        let plan = plan_deposit(usdc(5_000_000), U256::ZERO, None).unwrap();
        assert_eq!(plan.amount, usdc(5_000_000));
        assert!(plan.needs_approval);
    }

    #[test]
    fn existing_allowance_skips_approve() {
        let plan = plan_deposit(usdc(5_000_000), usdc(2_000_000), Some(usdc(2_000_000))).unwrap();
        assert_eq!(
            plan,
            DepositPlan {
                amount: usdc(2_000_000),
                needs_approval: false
            }
        );
        assert!(
            plan_deposit(usdc(5_000_000), usdc(1_999_999), Some(usdc(2_000_000)))
                .unwrap()
                .needs_approval
        );
    }

    #[test]
    fn refuses_what_the_wallet_cannot_cover() {
        assert!(plan_deposit(U256::ZERO, U256::MAX, None).is_err());
        assert!(plan_deposit(usdc(1), U256::MAX, Some(U256::ZERO)).is_err());
        let err = plan_deposit(usdc(1_000_000), U256::MAX, Some(usdc(1_000_001))).unwrap_err();
        assert!(err.to_string().contains("1.000001"));
    }

    #[test]
    fn default_receipts_path_follows_network() {
        assert_eq!(
            receipts_path(&None, Network::Mainnet),
            PathBuf::from("transfers.mainnet.json")
        );
        let explicit = Some(PathBuf::from("out/r.json"));
        assert_eq!(receipts_path(&explicit, Network::Testnet), PathBuf::from("out/r.json"));
    }

    #[tokio::test]
    async fn unreachable_rpc_is_an_error() {
        let chain = lookup_chain(Network::Testnet, "base-sepolia").unwrap();
        let signer = LocalKeySigner::random();
        assert!(ChainClient::connect("http://127.0.0.1:1", chain, &signer).await.is_err());
        assert!(ChainClient::connect("not a url", chain, &signer).await.is_err());
    }
}
