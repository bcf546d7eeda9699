//! EIP-712 hashing for Gateway burn intents.
//!
//! The digest must match what Gateway Wallet recomputes when it verifies an intent:
//! `keccak256("\x19\x01" || domainSeparator || hashStruct(BurnIntent))`.

use alloy_primitives::{FixedBytes, B256};
use gateway_intent_types::{BurnIntent, Eip712Domain, TransferSpec};
use serde_json::{json, Value};
use sha3::{Digest, Keccak256};

pub const EIP712_DOMAIN_TYPE: &str = "EIP712Domain(string name,string version)";

pub const TRANSFER_SPEC_TYPE: &str = "TransferSpec(uint32 version,uint32 sourceDomain,uint32 destinationDomain,bytes32 sourceContract,bytes32 destinationContract,bytes32 sourceToken,bytes32 destinationToken,bytes32 sourceDepositor,bytes32 destinationRecipient,bytes32 sourceSigner,bytes32 destinationCaller,uint256 value,bytes32 salt,bytes hookData)";

/// `BurnIntent` encodeType: primary type followed by referenced types (sorted by name).
pub const BURN_INTENT_TYPE: &str = concat!(
    "BurnIntent(uint256 maxBlockHeight,uint256 maxFee,TransferSpec spec)",
    "TransferSpec(uint32 version,uint32 sourceDomain,uint32 destinationDomain,bytes32 sourceContract,bytes32 destinationContract,bytes32 sourceToken,bytes32 destinationToken,bytes32 sourceDepositor,bytes32 destinationRecipient,bytes32 sourceSigner,bytes32 destinationCaller,uint256 value,bytes32 salt,bytes hookData)",
);

pub const PRIMARY_TYPE: &str = "BurnIntent";

pub(crate) fn keccak256_bytes(bytes: &[u8]) -> FixedBytes<32> {
    let mut h = Keccak256::new();
    h.update(bytes);
    let out = h.finalize();
    let mut b = [0u8; 32];
    b.copy_from_slice(out.as_slice());
    FixedBytes(b)
}

fn u32_word(v: u32) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[28..32].copy_from_slice(&v.to_be_bytes());
    word
}

/// `hashStruct(EIP712Domain)` for the name+version-only domain.
pub fn domain_separator(domain: &Eip712Domain) -> B256 {
    let mut buf = Vec::with_capacity(32 * 3);
    buf.extend_from_slice(keccak256_bytes(EIP712_DOMAIN_TYPE.as_bytes()).as_slice());
    buf.extend_from_slice(keccak256_bytes(domain.name.as_bytes()).as_slice());
    buf.extend_from_slice(keccak256_bytes(domain.version.as_bytes()).as_slice());
    keccak256_bytes(&buf)
}

pub fn transfer_spec_hash(spec: &TransferSpec) -> B256 {
    let mut buf = Vec::with_capacity(32 * 15);
    buf.extend_from_slice(keccak256_bytes(TRANSFER_SPEC_TYPE.as_bytes()).as_slice());
    buf.extend_from_slice(&u32_word(spec.version));
    buf.extend_from_slice(&u32_word(spec.source_domain));
    buf.extend_from_slice(&u32_word(spec.destination_domain));
    buf.extend_from_slice(spec.source_contract.as_slice());
    buf.extend_from_slice(spec.destination_contract.as_slice());
    buf.extend_from_slice(spec.source_token.as_slice());
    buf.extend_from_slice(spec.destination_token.as_slice());
    buf.extend_from_slice(spec.source_depositor.as_slice());
    buf.extend_from_slice(spec.destination_recipient.as_slice());
    buf.extend_from_slice(spec.source_signer.as_slice());
    buf.extend_from_slice(spec.destination_caller.as_slice());
    buf.extend_from_slice(&spec.value.to_be_bytes::<32>());
    buf.extend_from_slice(spec.salt.as_slice());
    // Dynamic `bytes` are hashed in place.
    buf.extend_from_slice(keccak256_bytes(&spec.hook_data).as_slice());
    keccak256_bytes(&buf)
}

pub fn burn_intent_hash(intent: &BurnIntent) -> B256 {
    let mut buf = Vec::with_capacity(32 * 4);
    buf.extend_from_slice(keccak256_bytes(BURN_INTENT_TYPE.as_bytes()).as_slice());
    buf.extend_from_slice(&intent.max_block_height.to_be_bytes::<32>());
    buf.extend_from_slice(&intent.max_fee.to_be_bytes::<32>());
    buf.extend_from_slice(transfer_spec_hash(&intent.spec).as_slice());
    keccak256_bytes(&buf)
}

/// The 32-byte digest an EIP-712 signer signs for this intent.
pub fn signing_digest(domain: &Eip712Domain, intent: &BurnIntent) -> B256 {
    let mut final_buf = Vec::with_capacity(2 + 32 + 32);
    final_buf.extend_from_slice(b"\x19\x01");
    final_buf.extend_from_slice(domain_separator(domain).as_slice());
    final_buf.extend_from_slice(burn_intent_hash(intent).as_slice());
    keccak256_bytes(&final_buf)
}

fn field(name: &str, ty: &str) -> Value {
    json!({ "name": name, "type": ty })
}

/// `eth_signTypedData_v4` payload for a wallet bridge.
///
/// Numeric `uint256` values are decimal strings, so the payload survives any JSON hop.
pub fn typed_data_json(domain: &Eip712Domain, intent: &BurnIntent) -> Value {
    json!({
        "types": {
            "EIP712Domain": [
                field("name", "string"),
                field("version", "string"),
            ],
            "TransferSpec": [
                field("version", "uint32"),
                field("sourceDomain", "uint32"),
                field("destinationDomain", "uint32"),
                field("sourceContract", "bytes32"),
                field("destinationContract", "bytes32"),
                field("sourceToken", "bytes32"),
                field("destinationToken", "bytes32"),
                field("sourceDepositor", "bytes32"),
                field("destinationRecipient", "bytes32"),
                field("sourceSigner", "bytes32"),
                field("destinationCaller", "bytes32"),
                field("value", "uint256"),
                field("salt", "bytes32"),
                field("hookData", "bytes"),
            ],
            "BurnIntent": [
                field("maxBlockHeight", "uint256"),
                field("maxFee", "uint256"),
                field("spec", "TransferSpec"),
            ],
        },
        "primaryType": PRIMARY_TYPE,
        "domain": { "name": domain.name, "version": domain.version },
        "message": message_json(intent),
    })
}

fn message_json(intent: &BurnIntent) -> Value {
    let spec = &intent.spec;
    json!({
        "maxBlockHeight": intent.max_block_height.to_string(),
        "maxFee": intent.max_fee.to_string(),
        "spec": {
            "version": spec.version,
            "sourceDomain": spec.source_domain,
            "destinationDomain": spec.destination_domain,
            "sourceContract": spec.source_contract,
            "destinationContract": spec.destination_contract,
            "sourceToken": spec.source_token,
            "destinationToken": spec.destination_token,
            "sourceDepositor": spec.source_depositor,
            "destinationRecipient": spec.destination_recipient,
            "sourceSigner": spec.source_signer,
            "destinationCaller": spec.destination_caller,
            "value": spec.value.to_string(),
            "salt": spec.salt,
            "hookData": spec.hook_data,
        },
    })
}
