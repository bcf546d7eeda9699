//! EIP-712 signing and signer recovery for burn intents.
//!
//! Gateway rejects an intent unless the address recovered from its signature equals
//! `spec.sourceSigner`. `sign_burn_intent` checks that invariant before signing (credential
//! vs intent) and again after (recovered vs intent), so a doomed intent never reaches the API.

use std::{fmt, future::Future, path::Path};

use alloy_primitives::{Address, Bytes, B256};
use gateway_intent_types::{intent::bytes32_to_address, BurnIntent, Eip712Domain, SignedBurnIntent};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;

use crate::eip712::{keccak256_bytes, signing_digest};
use crate::errors::SignError;

/// Anything that can produce an EIP-712 signature over a burn intent.
///
/// Implemented by an in-process key (`LocalKeySigner`) and by external wallet bridges.
/// Wallet-backed implementations may wait indefinitely for a human; wrap the future in a
/// timeout if bounded latency matters.
pub trait IntentSigner {
    /// Address the credential signs as. Must populate `sourceSigner`/`sourceDepositor`.
    fn address(&self) -> Address;

    /// Return a 65-byte `r || s || v` signature over the intent's EIP-712 digest.
    fn sign_typed_data(
        &self,
        domain: &Eip712Domain,
        intent: &BurnIntent,
    ) -> impl Future<Output = Result<Bytes, SignError>> + Send;
}

/// A secp256k1 key held in process memory.
#[derive(Clone)]
pub struct LocalKeySigner {
    key: SigningKey,
    address: Address,
}

impl fmt::Debug for LocalKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalKeySigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl LocalKeySigner {
    pub fn new(key: SigningKey) -> Self {
        let address = address_of(key.verifying_key());
        Self { key, address }
    }

    /// Fresh random key (tests, throwaway accounts).
    pub fn random() -> Self {
        Self::new(SigningKey::random(&mut OsRng))
    }

    /// Parse a 32-byte hex private key, with or without `0x`.
    pub fn from_hex(private_key: &str) -> Result<Self, SignError> {
        let trimmed = private_key.trim();
        let raw = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(raw)
            .map_err(|_| SignError::CredentialUnavailable("private key is not hex".into()))?;
        if bytes.len() != 32 {
            return Err(SignError::CredentialUnavailable(format!(
                "private key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let key = SigningKey::from_slice(&bytes).map_err(|_| {
            SignError::CredentialUnavailable("private key is not a valid secp256k1 scalar".into())
        })?;
        Ok(Self::new(key))
    }

    /// Read a hex private key from a file (first non-empty line).
    pub fn from_key_file(path: &Path) -> Result<Self, SignError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SignError::CredentialUnavailable(format!("cannot read {}: {e}", path.display()))
        })?;
        let line = contents
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .ok_or_else(|| {
                SignError::CredentialUnavailable(format!("{} is empty", path.display()))
            })?;
        Self::from_hex(line)
    }

    /// The underlying key, for handing to a transaction signer.
    pub fn signing_key(&self) -> &SigningKey {
        &self.key
    }

    /// Sign a prehashed 32-byte digest; `v` is 27 or 28.
    pub fn sign_digest(&self, digest: &B256) -> Result<[u8; 65], SignError> {
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(digest.as_slice())
            .map_err(|e| SignError::Wallet(e.to_string()))?;
        let (r, s) = signature.split_bytes();

        let mut out = [0u8; 65];
        out[0..32].copy_from_slice(r.as_slice());
        out[32..64].copy_from_slice(s.as_slice());
        out[64] = 27 + recovery_id.to_byte();
        Ok(out)
    }
}

impl IntentSigner for LocalKeySigner {
    fn address(&self) -> Address {
        self.address
    }

    fn sign_typed_data(
        &self,
        domain: &Eip712Domain,
        intent: &BurnIntent,
    ) -> impl Future<Output = Result<Bytes, SignError>> + Send {
        let digest = signing_digest(domain, intent);
        let result = self.sign_digest(&digest).map(|sig| Bytes::from(sig.to_vec()));
        std::future::ready(result)
    }
}

/// Ethereum address of a secp256k1 public key: low 20 bytes of keccak256(X || Y).
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256_bytes(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..32])
}

/// Recover the signer of a 32-byte digest.
///
/// Accepts `v` in {0, 1, 27, 28}.
pub fn recover_digest_signer(digest: &B256, signature: &[u8]) -> Result<Address, SignError> {
    if signature.len() != 65 {
        return Err(SignError::MalformedSignature(format!(
            "expected 65 bytes, got {}",
            signature.len()
        )));
    }
    let v = match signature[64] {
        v @ (0 | 1) => v,
        v @ (27 | 28) => v - 27,
        other => {
            return Err(SignError::MalformedSignature(format!("unsupported v = {other}")))
        }
    };
    let sig = Signature::from_slice(&signature[0..64])
        .map_err(|e| SignError::MalformedSignature(e.to_string()))?;
    let recovery_id = RecoveryId::from_byte(v)
        .ok_or_else(|| SignError::MalformedSignature(format!("bad recovery id {v}")))?;
    let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &sig, recovery_id)
        .map_err(|e| SignError::MalformedSignature(e.to_string()))?;
    Ok(address_of(&key))
}

/// Recover the address that signed `intent` under `domain`.
pub fn recover_signer(
    domain: &Eip712Domain,
    intent: &BurnIntent,
    signature: &[u8],
) -> Result<Address, SignError> {
    recover_digest_signer(&signing_digest(domain, intent), signature)
}

/// Check that a signed intent recovers to its own `sourceSigner`.
pub fn verify_signed(domain: &Eip712Domain, signed: &SignedBurnIntent) -> Result<Address, SignError> {
    let expected = signed.burn_intent.spec.signer_address();
    let recovered = recover_signer(domain, &signed.burn_intent, &signed.signature)?;
    if recovered != expected {
        return Err(SignError::SignatureMismatch {
            expected,
            recovered,
        });
    }
    Ok(recovered)
}

/// Sign `intent` and confirm the signature recovers to `sourceSigner`.
pub async fn sign_burn_intent<S: IntentSigner>(
    signer: &S,
    domain: &Eip712Domain,
    intent: BurnIntent,
) -> Result<SignedBurnIntent, SignError> {
    let expected = intent.spec.signer_address();
    let credential = signer.address();
    if credential != expected {
        return Err(SignError::SignatureMismatch {
            expected,
            recovered: credential,
        });
    }
    let depositor = bytes32_to_address(&intent.spec.source_depositor);
    if depositor != expected {
        return Err(SignError::SignatureMismatch {
            expected: depositor,
            recovered: credential,
        });
    }

    let signature = signer.sign_typed_data(domain, &intent).await?;
    let signed = SignedBurnIntent {
        burn_intent: intent,
        signature,
    };
    verify_signed(domain, &signed)?;
    Ok(signed)
}
