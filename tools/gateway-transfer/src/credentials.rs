use std::path::PathBuf;

use alloy_primitives::Address;
use clap::Args;
use gateway_api::JsonRpcWallet;
use gateway_intent_encoder::{IntentSigner, LocalKeySigner, SignError};

/// Where the signing key comes from. Exactly one source is used.
#[derive(Args, Debug)]
pub struct CredentialArgs {
    /// Private key (hex string, 0x...).
    #[arg(long, env = "PKEY", hide_env_values = true, conflicts_with_all = ["private_key_path", "wallet_rpc"])]
    pub private_key: Option<String>,

    /// Path to a file containing the private key.
    #[arg(long, env = "PRIV_KEY_PATH", conflicts_with = "wallet_rpc")]
    pub private_key_path: Option<PathBuf>,

    /// JSON-RPC endpoint of a wallet that supports `eth_signTypedData_v4`.
    #[arg(long, env = "WALLET_RPC_URL")]
    pub wallet_rpc: Option<String>,

    /// Account to sign with at the wallet (defaults to the wallet's first account).
    #[arg(long, env = "WALLET_ACCOUNT", requires = "wallet_rpc")]
    pub wallet_account: Option<String>,
}

pub enum Credential {
    Local(LocalKeySigner),
    Wallet(JsonRpcWallet),
}

impl Credential {
    pub fn address(&self) -> Address {
        match self {
            Credential::Local(signer) => signer.address(),
            Credential::Wallet(wallet) => wallet.address(),
        }
    }
}

impl CredentialArgs {
    pub async fn resolve(&self) -> Result<Credential, SignError> {
        if let Some(key) = &self.private_key {
            return LocalKeySigner::from_hex(key).map(Credential::Local);
        }
        if let Some(path) = &self.private_key_path {
            return LocalKeySigner::from_key_file(path).map(Credential::Local);
        }
        if let Some(url) = &self.wallet_rpc {
            let wallet = match &self.wallet_account {
                Some(account) => {
                    let account = account.trim().parse::<Address>().map_err(|e| {
                        SignError::CredentialUnavailable(format!("bad --wallet-account: {e}"))
                    })?;
                    JsonRpcWallet::new(url.clone(), account)
                }
                None => JsonRpcWallet::connect(url.clone()).await?,
            };
            return Ok(Credential::Wallet(wallet));
        }
        Err(SignError::CredentialUnavailable(
            "missing signer: provide --private-key, --private-key-path or --wallet-rpc \
             (or set PKEY/PRIV_KEY_PATH/WALLET_RPC_URL)"
                .into(),
        ))
    }
}
