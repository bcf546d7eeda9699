//! HTTP client for the Gateway REST API.

use std::{collections::BTreeMap, fmt, time::Duration};

use alloy_primitives::Bytes;
use futures::future::join_all;
use gateway_intent_encoder::{check_wire_fields, verify_signed};
use gateway_intent_types::{Eip712Domain, Network, SignedBurnIntent};
use reqwest::{header, Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::balances::{BalanceSource, Balances, BalancesRequest};
use crate::error::{GatewayError, GatewayResult};
use crate::contracts::gateway_mint_calldata;
use crate::rejection::{body_has_error, classify_rejection, Rejection};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct GatewayConfig {
    /// Service root, without the `/v1` path.
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    /// Domain used for the local signature check before submission.
    pub domain: Eip712Domain,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("domain", &self.domain)
            .finish()
    }
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            domain: Eip712Domain::gateway_wallet(),
        }
    }

    pub fn for_network(network: Network) -> Self {
        Self::new(network.api_base_url())
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Fields Gateway returns for an accepted transfer. Any of them may be absent.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferAccepted {
    pub transfer_id: Option<String>,
    pub attestation: Option<Bytes>,
    pub signature: Option<Bytes>,
    pub raw: Value,
}

impl TransferAccepted {
    fn from_body(raw: Value) -> Self {
        let carries_transfer = |item: &&Value| {
            ["transferId", "id", "attestation"]
                .iter()
                .any(|key| item.get(key).is_some_and(|v| !v.is_null()))
        };
        let first = match &raw {
            Value::Array(items) => items
                .iter()
                .find(carries_transfer)
                .or(items.first())
                .cloned()
                .unwrap_or(Value::Null),
            other => other.clone(),
        };
        let text = |key: &str| first.get(key).and_then(Value::as_str).map(str::to_string);
        let hex = |key: &str| text(key).and_then(|s| s.parse::<Bytes>().ok());
        Self {
            transfer_id: text("transferId").or_else(|| text("id")),
            attestation: hex("attestation"),
            signature: hex("signature"),
            raw,
        }
    }

    /// `gatewayMint` calldata, when both the attestation and its signature came back.
    pub fn mint_calldata(&self) -> Option<Bytes> {
        match (&self.attestation, &self.signature) {
            (Some(attestation), Some(signature)) => {
                Some(gateway_mint_calldata(attestation, signature))
            }
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Accepted(TransferAccepted),
    Rejected(Rejection),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }
}

/// Result of one per-destination request issued by `submit_each`.
#[derive(Debug)]
pub struct DestinationOutcome {
    pub destination_domain: u32,
    pub result: GatewayResult<SubmitOutcome>,
}

#[derive(Clone, Debug)]
pub struct GatewayClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    domain: Eip712Domain,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(GatewayError::Config(format!(
                "base url must be http(s), got {:?}",
                config.base_url
            )));
        }
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url,
            api_key: config.api_key,
            domain: config.domain,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let request = self
            .http
            .post(format!("{}/v1/{}", self.base_url, path))
            .header(header::ACCEPT, "application/json");
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Deposited balances for `token` across `sources`.
    pub async fn balances(&self, token: &str, sources: &[BalanceSource]) -> GatewayResult<Balances> {
        debug!(token, sources = sources.len(), "querying balances");
        let response = self
            .post("balances")
            .json(&BalancesRequest { token, sources })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        let json = serde_json::from_str::<Value>(&body).ok();
        if !status.is_success() || json.as_ref().is_some_and(body_has_error) {
            return Err(GatewayError::UnexpectedResponse {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Checks a batch without touching the network.
    pub fn check_batch(&self, batch: &[SignedBurnIntent]) -> GatewayResult<()> {
        let first = batch.first().ok_or(GatewayError::EmptyBatch)?;
        let destination = first.burn_intent.destination_domain();
        for signed in batch {
            let other = signed.burn_intent.destination_domain();
            if other != destination {
                return Err(GatewayError::MixedDestinations {
                    first: destination,
                    other,
                });
            }
            verify_signed(&self.domain, signed)?;
        }
        check_wire_fields(&serde_json::to_value(batch)?)?;
        Ok(())
    }

    /// Submit one batch of signed intents sharing a destination domain.
    ///
    /// Remote rejections come back as `SubmitOutcome::Rejected`; only local check and
    /// transport failures are errors. Nothing is retried.
    pub async fn submit(&self, batch: &[SignedBurnIntent]) -> GatewayResult<SubmitOutcome> {
        self.check_batch(batch)?;
        let destination = batch[0].burn_intent.destination_domain();
        info!(destination, intents = batch.len(), "submitting transfer");

        let response = self.post("transfer").json(batch).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let json = serde_json::from_str::<Value>(&body).ok();

        let accepted = status.is_success() && !json.as_ref().is_some_and(body_has_error);
        if accepted {
            let outcome = TransferAccepted::from_body(json.unwrap_or(Value::String(body)));
            info!(destination, transfer_id = ?outcome.transfer_id, "transfer accepted");
            Ok(SubmitOutcome::Accepted(outcome))
        } else {
            let rejection = classify_rejection(status.as_u16(), &body);
            warn!(
                destination,
                status = rejection.status,
                kind = ?rejection.kind,
                message = %rejection.message,
                "transfer rejected"
            );
            Ok(SubmitOutcome::Rejected(rejection))
        }
    }

    /// Split intents by destination domain and submit each group concurrently.
    ///
    /// Outcomes are ordered by destination domain. One group failing does not affect the
    /// others.
    pub async fn submit_each(&self, intents: Vec<SignedBurnIntent>) -> Vec<DestinationOutcome> {
        let mut groups: BTreeMap<u32, Vec<SignedBurnIntent>> = BTreeMap::new();
        for signed in intents {
            groups
                .entry(signed.burn_intent.destination_domain())
                .or_default()
                .push(signed);
        }
        join_all(groups.into_iter().map(|(destination_domain, batch)| async move {
            DestinationOutcome {
                destination_domain,
                result: self.submit(&batch).await,
            }
        }))
        .await
    }
}
