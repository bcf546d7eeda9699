use gateway_intent_encoder::{EncodingError, SignError};
use thiserror::Error;

/// Errors that stop a call before (or instead of) a classified API answer.
///
/// Remote rejections are not errors: they come back as `SubmitOutcome::Rejected`.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("empty transfer batch")]
    EmptyBatch,
    #[error("batch mixes destination domains {first} and {other}; submit one batch per destination")]
    MixedDestinations { first: u32, other: u32 },
    #[error(transparent)]
    Signature(#[from] SignError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response ({status}): {body}")]
    UnexpectedResponse { status: u16, body: String },
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;
