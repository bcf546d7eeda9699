//! Signing through an external wallet over JSON-RPC (`eth_signTypedData_v4`).
//!
//! The wallet may hold the request until a human approves it; callers that need bounded
//! latency should wrap `sign_typed_data` in a timeout.

use std::future::Future;

use alloy_primitives::{Address, Bytes};
use gateway_intent_encoder::{typed_data_json, IntentSigner, SignError};
use gateway_intent_types::{BurnIntent, Eip712Domain};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// EIP-1193 "user rejected request".
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Clone, Debug)]
pub struct JsonRpcWallet {
    http: Client,
    url: String,
    account: Address,
}

impl JsonRpcWallet {
    pub fn new(url: impl Into<String>, account: Address) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
            account,
        }
    }

    /// Connect and use the first account the wallet exposes (`eth_accounts`).
    pub async fn connect(url: impl Into<String>) -> Result<Self, SignError> {
        let url = url.into();
        let http = Client::new();
        let result = call(&http, &url, "eth_accounts", json!([])).await?;
        let account = result
            .as_array()
            .and_then(|accounts| accounts.first())
            .and_then(Value::as_str)
            .ok_or_else(|| SignError::CredentialUnavailable("wallet exposes no accounts".into()))?
            .parse::<Address>()
            .map_err(|e| SignError::Wallet(format!("bad account from wallet: {e}")))?;
        Ok(Self { http, url, account })
    }
}

async fn call(http: &Client, url: &str, method: &str, params: Value) -> Result<Value, SignError> {
    let request = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });
    debug!(method, "wallet rpc");
    let response = http
        .post(url)
        .json(&request)
        .send()
        .await
        .map_err(|e| SignError::CredentialUnavailable(format!("wallet unreachable: {e}")))?;
    let body: RpcResponse = response
        .json()
        .await
        .map_err(|e| SignError::Wallet(format!("invalid wallet response: {e}")))?;

    if let Some(error) = body.error {
        if error.code == USER_REJECTED_CODE {
            return Err(SignError::UserRejected);
        }
        return Err(SignError::Wallet(format!("{} (code {})", error.message, error.code)));
    }
    body.result
        .ok_or_else(|| SignError::Wallet("wallet returned neither result nor error".into()))
}

impl IntentSigner for JsonRpcWallet {
    fn address(&self) -> Address {
        self.account
    }

    fn sign_typed_data(
        &self,
        domain: &Eip712Domain,
        intent: &BurnIntent,
    ) -> impl Future<Output = Result<Bytes, SignError>> + Send {
        // v4 takes the typed data as a JSON string.
        let params = json!([self.account.to_string(), typed_data_json(domain, intent).to_string()]);
        let http = self.http.clone();
        let url = self.url.clone();
        async move {
            let result = call(&http, &url, "eth_signTypedData_v4", params).await?;
            result
                .as_str()
                .ok_or_else(|| SignError::MalformedSignature("signature is not a string".into()))?
                .parse::<Bytes>()
                .map_err(|e| SignError::MalformedSignature(e.to_string()))
        }
    }
}
