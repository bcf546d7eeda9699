use alloy_primitives::Address;
use thiserror::Error;

/// Malformed builder input. Fatal: the caller has to fix what it passes in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("{field}: not a 20-byte hex address: {value}")]
    InvalidAddress { field: &'static str, value: String },
    #[error("{field}: not a 0x-prefixed 32-byte hex value: {value}")]
    NotBytes32 { field: String, value: String },
    #[error("hookData must be 0x-prefixed, byte-aligned hex: {0}")]
    InvalidHookData(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("no Gateway deployment known for domain {0}")]
    UnknownDomain(u32),
    #[error("missing required field {0}")]
    MissingField(&'static str),
    #[error("sourceDepositor {depositor} differs from sourceSigner {signer}")]
    DepositorSignerMismatch { depositor: Address, signer: Address },
}

/// Failures while producing or checking a burn-intent signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignError {
    /// The recovered (or credential) address is not the intent's `sourceSigner`.
    #[error("signature mismatch: intent expects signer {expected}, got {recovered}")]
    SignatureMismatch { expected: Address, recovered: Address },
    #[error("no signing credential available: {0}")]
    CredentialUnavailable(String),
    #[error("signature request rejected by the wallet user")]
    UserRejected,
    #[error("wallet error: {0}")]
    Wallet(String),
    #[error("malformed signature: {0}")]
    MalformedSignature(String),
}
