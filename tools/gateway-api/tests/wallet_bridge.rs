use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use gateway_api::JsonRpcWallet;
use gateway_intent_encoder::{
    eip712::signing_digest, sign_burn_intent, BurnIntentBuilder, IntentSigner, LocalKeySigner,
    SignError,
};
use gateway_intent_types::{BurnIntent, Eip712Domain, Network};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone)]
struct MockWallet {
    key: Arc<LocalKeySigner>,
    refuse: bool,
}

// Minimal EIP-1193 provider: hands out one account and signs v4 typed data.
async fn rpc(State(wallet): State<MockWallet>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let reply = match request["method"].as_str() {
        Some("eth_accounts") => json!({ "result": [wallet.key.address().to_string()] }),
        Some("eth_signTypedData_v4") if wallet.refuse => {
            json!({ "error": { "code": 4001, "message": "User rejected the request." } })
        }
        Some("eth_signTypedData_v4") => {
            let typed: Value = serde_json::from_str(request["params"][1].as_str().unwrap()).unwrap();
            let domain: Eip712Domain = serde_json::from_value(typed["domain"].clone()).unwrap();
            let intent: BurnIntent = serde_json::from_value(typed["message"].clone()).unwrap();
            let sig = wallet.key.sign_digest(&signing_digest(&domain, &intent)).unwrap();
            json!({ "result": format!("0x{}", hex::encode(sig)) })
        }
        _ => json!({ "error": { "code": -32601, "message": "method not found" } }),
    };
    let mut reply = reply;
    reply["jsonrpc"] = json!("2.0");
    reply["id"] = id;
    Json(reply)
}

async fn spawn_wallet(refuse: bool) -> (String, Arc<LocalKeySigner>) {
    let key = Arc::new(LocalKeySigner::random());
    let router = Router::new().route("/", post(rpc)).with_state(MockWallet {
        key: key.clone(),
        refuse,
    });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    (format!("http://{addr}/"), key)
}

fn intent_for(owner: &str) -> BurnIntent {
    BurnIntentBuilder::for_route(Network::Testnet, 0, 6)
        .unwrap()
        .owner(owner)
        .recipient("0x742d35Cc6634C0532925a3b8D402b1DeF8d87d87")
        .value("10000")
        .hook_data("0xbeef")
        .build()
        .unwrap()
}

#[tokio::test]
async fn wallet_signature_verifies() {
    let (url, key) = spawn_wallet(false).await;
    let wallet = JsonRpcWallet::connect(url).await.unwrap();
    assert_eq!(wallet.address(), key.address());

    let intent = intent_for(&wallet.address().to_string());
    let signed = sign_burn_intent(&wallet, &Eip712Domain::gateway_wallet(), intent)
        .await
        .unwrap();
    assert_eq!(signed.signature.len(), 65);
}

#[tokio::test]
async fn user_rejection_is_distinguished() {
    let (url, key) = spawn_wallet(true).await;
    let wallet = JsonRpcWallet::new(url, key.address());
    let intent = intent_for(&key.address().to_string());
    let err = sign_burn_intent(&wallet, &Eip712Domain::gateway_wallet(), intent)
        .await
        .unwrap_err();
    assert_eq!(err, SignError::UserRejected);
}

#[tokio::test]
async fn unreachable_wallet_means_no_credential() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = JsonRpcWallet::connect(format!("http://{addr}/")).await.unwrap_err();
    assert!(matches!(err, SignError::CredentialUnavailable(_)));
}
