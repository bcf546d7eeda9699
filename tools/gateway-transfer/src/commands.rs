use std::{collections::BTreeMap, path::PathBuf};

use alloy_primitives::U256;
use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use gateway_api::{BalanceSource, GatewayClient, SubmitOutcome};
use gateway_intent_encoder::{
    encoding::{format_usdc, parse_base_units},
    parse_usdc_amount, sign_burn_intent, BurnIntentBuilder, DestinationCaller, IntentSigner,
    DEFAULT_MAX_FEE,
};
use gateway_intent_types::{Chain, Eip712Domain, Network, USDC};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::receipts::{self, now_rfc3339, Receipt, TRANSFERS};

#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Amount of USDC to send to each destination (eg 0.01).
    #[arg(long)]
    pub amount: String,

    /// Source chain (slug such as `ethereum-sepolia`, or Gateway domain number).
    #[arg(long)]
    pub source: String,

    /// Destination chains, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    pub to: Vec<String>,

    /// Recipient on the destination chains (defaults to the signer).
    #[arg(long)]
    pub recipient: Option<String>,

    /// Who may mint on the destination: `anyone`, `signer`, or an address.
    #[arg(long, default_value = "anyone")]
    pub destination_caller: String,

    /// Maximum fee in USDC base units.
    #[arg(long)]
    pub max_fee: Option<String>,

    /// Sign and print the intents without contacting Gateway (no balance check, no submit).
    #[arg(long)]
    pub dry_run: bool,

    /// Receipts file (defaults to transfers.<network>.json).
    #[arg(long)]
    pub receipts_path: Option<PathBuf>,
}

pub fn network_name(network: Network) -> &'static str {
    match network {
        Network::Testnet => "testnet",
        Network::Mainnet => "mainnet",
    }
}

/// Resolve a chain by slug or by domain number.
pub fn lookup_chain(network: Network, name: &str) -> Result<&'static Chain> {
    let found = match name.trim().parse::<u32>() {
        Ok(domain) => network.by_domain(domain),
        Err(_) => network.by_slug(name),
    };
    found.ok_or_else(|| {
        let known: Vec<&str> = network.chains().iter().map(|c| c.slug).collect();
        anyhow!(
            "unknown chain {name:?} on {}; known: {}",
            network_name(network),
            known.join(", ")
        )
    })
}

pub fn parse_destination_caller(value: &str) -> DestinationCaller {
    match value.trim().to_ascii_lowercase().as_str() {
        "anyone" | "" => DestinationCaller::Anyone,
        "signer" => DestinationCaller::Signer,
        _ => DestinationCaller::Address(value.trim().to_string()),
    }
}

pub async fn balance(client: &GatewayClient, network: Network, depositor: &str) -> Result<()> {
    let sources: Vec<BalanceSource> = network
        .chains()
        .iter()
        .map(|c| BalanceSource {
            domain: c.domain,
            depositor: depositor.to_string(),
        })
        .collect();
    let balances = client
        .balances(USDC, &sources)
        .await
        .context("failed fetching balances")?;

    println!("Gateway balances for {depositor} ({}):", network_name(network));
    for chain in network.chains() {
        println!(
            "  {:<18} domain {:>2}: {} USDC",
            chain.name,
            chain.domain,
            balances.for_domain(chain.domain)
        );
    }
    println!("  unified: {} USDC", balances.unified());
    Ok(())
}

pub async fn transfer<S: IntentSigner>(
    client: &GatewayClient,
    network: Network,
    signer: &S,
    args: &TransferArgs,
) -> Result<()> {
    let source = lookup_chain(network, &args.source)?;
    let mut destinations: Vec<&'static Chain> = Vec::with_capacity(args.to.len());
    for name in &args.to {
        let chain = lookup_chain(network, name)?;
        if destinations.iter().any(|d| d.domain == chain.domain) {
            bail!("destination {} listed twice", chain.slug);
        }
        destinations.push(chain);
    }

    let value = parse_usdc_amount(&args.amount)?;
    let max_fee = match &args.max_fee {
        Some(fee) => parse_base_units(fee)?,
        None => U256::from(DEFAULT_MAX_FEE),
    };
    let owner = signer.address().to_string();
    let recipient = args.recipient.clone().unwrap_or_else(|| owner.clone());
    let caller = parse_destination_caller(&args.destination_caller);

    if !args.dry_run {
        check_affordable(client, source, &owner, value, max_fee, destinations.len()).await;
    }

    let domain = Eip712Domain::gateway_wallet();
    let mut signed = Vec::with_capacity(destinations.len());
    for destination in &destinations {
        let intent = BurnIntentBuilder::for_route(network, source.domain, destination.domain)?
            .owner(&owner)
            .recipient(&recipient)
            .value_units(value)
            .destination_caller(caller.clone())
            .max_fee(max_fee)
            .build()
            .with_context(|| format!("failed building intent for {}", destination.slug))?;
        let intent = sign_burn_intent(signer, &domain, intent)
            .await
            .with_context(|| format!("failed signing intent for {}", destination.slug))?;
        info!(destination = destination.slug, salt = %intent.burn_intent.spec.salt, "signed burn intent");
        signed.push(intent);
    }

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&signed)?);
        return Ok(());
    }

    let salts: BTreeMap<u32, String> = signed
        .iter()
        .map(|s| (s.burn_intent.destination_domain(), s.burn_intent.spec.salt.to_string()))
        .collect();
    let outcomes = client.submit_each(signed).await;
    let submitted_at = now_rfc3339();
    let mut entries = Vec::with_capacity(outcomes.len());
    let mut failed = 0usize;

    for outcome in outcomes {
        let destination = lookup_chain(network, &outcome.destination_domain.to_string())?;
        let salt = salts
            .get(&destination.domain)
            .cloned()
            .unwrap_or_default();
        let mut entry = json!({
            "salt": salt,
            "source": source.slug,
            "destination_domain": destination.domain,
            "amount": format_usdc(value),
            "max_fee": max_fee.to_string(),
            "recipient": recipient,
            "submitted_at": submitted_at,
        });
        match outcome.result {
            Ok(SubmitOutcome::Accepted(accepted)) => {
                println!(
                    "{} -> {}: accepted (transfer {})",
                    source.slug,
                    destination.slug,
                    accepted.transfer_id.as_deref().unwrap_or("?")
                );
                entry["outcome"] = json!("accepted");
                entry["transfer_id"] = json!(accepted.transfer_id);
                if let Some(calldata) = accepted.mint_calldata() {
                    entry["minter"] = json!(network.gateway_minter().to_string());
                    entry["mint_calldata"] = json!(calldata.to_string());
                }
            }
            Ok(SubmitOutcome::Rejected(rejection)) => {
                failed += 1;
                println!(
                    "{} -> {}: rejected ({:?}): {}",
                    source.slug, destination.slug, rejection.kind, rejection.message
                );
                entry["outcome"] = json!("rejected");
                entry["rejection"] = serde_json::to_value(&rejection)?;
            }
            Err(err) => {
                failed += 1;
                println!("{} -> {}: error: {err}", source.slug, destination.slug);
                entry["outcome"] = json!("error");
                entry["error"] = Value::String(err.to_string());
            }
        }
        entries.push(Receipt::new(destination.slug, salt, entry));
    }

    let total = entries.len();
    let path = args
        .receipts_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("transfers.{}.json", network_name(network))));
    receipts::record(&path, network_name(network), TRANSFERS, entries)?;
    println!("Receipts written to {}", path.display());

    if failed > 0 {
        bail!("{failed} of {total} destinations did not go through");
    }
    Ok(())
}

/// Warn when the source balance looks too small. Balances lag deposits, so never block.
async fn check_affordable(
    client: &GatewayClient,
    source: &Chain,
    depositor: &str,
    value: U256,
    max_fee: U256,
    count: usize,
) {
    let count = U256::from(count);
    let sources = [BalanceSource {
        domain: source.domain,
        depositor: depositor.to_string(),
    }];
    match client.balances(USDC, &sources).await {
        Ok(balances) => {
            if !balances.covers(
                source.domain,
                value.saturating_mul(count),
                max_fee.saturating_mul(count),
            ) {
                warn!(
                    source = source.slug,
                    available = %balances.for_domain(source.domain),
                    needed = %format_usdc(value.saturating_add(max_fee).saturating_mul(count)),
                    "balance may not cover this transfer"
                );
            }
        }
        Err(err) => warn!(error = %err, "could not check balance before submitting"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use axum::{extract::State, routing::post, Json, Router};
    use gateway_api::GatewayConfig;
    use gateway_intent_encoder::LocalKeySigner;
    use tokio::net::TcpListener;

    use super::*;

    async fn balances(State(hits): State<Arc<AtomicUsize>>, Json(_): Json<Value>) -> Json<Value> {
        hits.fetch_add(1, Ordering::SeqCst);
        Json(json!({ "token": "USDC", "balances": [{ "domain": 0, "balance": "5.00" }] }))
    }

    async fn accept(State(hits): State<Arc<AtomicUsize>>, Json(_): Json<Value>) -> Json<Value> {
        let n = hits.fetch_add(1, Ordering::SeqCst);
        Json(json!([{
            "transferId": format!("tr_{n}"),
            "attestation": "0xabcd",
            "signature": "0x1234",
        }]))
    }

    async fn mock_gateway() -> (GatewayClient, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route("/v1/balances", post(balances))
            .route("/v1/transfer", post(accept))
            .with_state(hits.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        let client = GatewayClient::new(GatewayConfig::new(format!("http://{addr}"))).unwrap();
        (client, hits)
    }

    fn transfer_args(dry_run: bool, receipts_path: PathBuf) -> TransferArgs {
        TransferArgs {
            amount: "0.01".into(),
            source: "ethereum-sepolia".into(),
            to: vec!["base-sepolia".into()],
            recipient: None,
            destination_caller: "anyone".into(),
            max_fee: None,
            dry_run,
            receipts_path: Some(receipts_path),
        }
    }

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("gateway-transfer-cmd-{}-{name}", std::process::id()))
            .join("transfers.testnet.json")
    }

    #[tokio::test]
    async fn dry_run_stays_offline() {
        let (client, hits) = mock_gateway().await;
        let signer = LocalKeySigner::random();
        let path = scratch("dry-run");

        transfer(&client, Network::Testnet, &signer, &transfer_args(true, path.clone()))
            .await
            .unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn repeated_transfers_keep_every_receipt() {
        let (client, _hits) = mock_gateway().await;
        let signer = LocalKeySigner::random();
        let path = scratch("repeat");
        let _ = std::fs::remove_file(&path);

        let args = transfer_args(false, path.clone());
        transfer(&client, Network::Testnet, &signer, &args).await.unwrap();
        transfer(&client, Network::Testnet, &signer, &args).await.unwrap();

        let root = receipts::load(&path).unwrap();
        let entries = root[TRANSFERS]["base-sepolia"].as_object().unwrap();
        assert_eq!(entries.len(), 2);
        for (salt, entry) in entries {
            assert_eq!(entry["salt"], salt.as_str());
            assert_eq!(entry["outcome"], "accepted");
            assert!(entry["transfer_id"].as_str().unwrap().starts_with("tr_"));
            assert!(entry["mint_calldata"].as_str().unwrap().starts_with("0x"));
        }
        assert_eq!(receipts::pending_mints(&root, "base-sepolia").len(), 2);

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn chains_by_slug_or_domain() {
        assert_eq!(lookup_chain(Network::Testnet, "base-sepolia").unwrap().domain, 6);
        assert_eq!(lookup_chain(Network::Testnet, "1").unwrap().slug, "avalanche-fuji");
        assert_eq!(lookup_chain(Network::Mainnet, "Base").unwrap().chain_id, 8_453);
        let err = lookup_chain(Network::Testnet, "solana").unwrap_err();
        assert!(err.to_string().contains("ethereum-sepolia"));
    }

    #[test]
    fn destination_caller_modes() {
        assert_eq!(parse_destination_caller("anyone"), DestinationCaller::Anyone);
        assert_eq!(parse_destination_caller("Signer"), DestinationCaller::Signer);
        assert_eq!(
            parse_destination_caller("0x742d35Cc6634C0532925a3b8D402b1DeF8d87d87"),
            DestinationCaller::Address("0x742d35Cc6634C0532925a3b8D402b1DeF8d87d87".into())
        );
    }
}
