use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// One cross-domain transfer leg, exactly as Gateway hashes and verifies it.
///
/// All address-like fields are 32-byte left-zero-padded values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferSpec {
    pub version: u32,
    pub source_domain: u32,
    pub destination_domain: u32,
    pub source_contract: B256,
    pub destination_contract: B256,
    pub source_token: B256,
    pub destination_token: B256,
    pub source_depositor: B256,
    pub destination_recipient: B256,
    pub source_signer: B256,
    /// Zero means anyone may call `gatewayMint` on the destination chain.
    pub destination_caller: B256,
    /// Amount in token base units.
    #[serde(with = "crate::uint")]
    pub value: U256,
    /// Per-intent random nonce; Gateway dedups on salt + spec.
    pub salt: B256,
    pub hook_data: Bytes,
}

/// A transfer spec with its validity and fee bounds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnIntent {
    #[serde(with = "crate::uint")]
    pub max_block_height: U256,
    #[serde(with = "crate::uint")]
    pub max_fee: U256,
    pub spec: TransferSpec,
}

/// A burn intent plus its detached 65-byte `r || s || v` signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedBurnIntent {
    pub burn_intent: BurnIntent,
    pub signature: Bytes,
}

impl TransferSpec {
    /// The 20-byte address held in the low bytes of `sourceSigner`.
    pub fn signer_address(&self) -> Address {
        bytes32_to_address(&self.source_signer)
    }
}

impl BurnIntent {
    pub fn destination_domain(&self) -> u32 {
        self.spec.destination_domain
    }
}

impl SignedBurnIntent {
    pub fn destination_domain(&self) -> u32 {
        self.burn_intent.spec.destination_domain
    }
}

/// Left-pad a 20-byte address into a bytes32 word.
pub fn address_to_bytes32(address: Address) -> B256 {
    let mut word = [0u8; 32];
    word[12..32].copy_from_slice(address.as_slice());
    B256::from(word)
}

/// Take the low 20 bytes of a bytes32 word.
pub fn bytes32_to_address(word: &B256) -> Address {
    Address::from_slice(&word[12..32])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BurnIntent {
        let signer: Address = "0xe616b2ec620621797030e0ab1ba38da68d78351c".parse().unwrap();
        BurnIntent {
            max_block_height: U256::MAX,
            max_fee: U256::from(2_000_001u64),
            spec: TransferSpec {
                version: 1,
                source_domain: 0,
                destination_domain: 6,
                source_contract: B256::ZERO,
                destination_contract: B256::ZERO,
                source_token: B256::ZERO,
                destination_token: B256::ZERO,
                source_depositor: address_to_bytes32(signer),
                destination_recipient: address_to_bytes32(signer),
                source_signer: address_to_bytes32(signer),
                destination_caller: B256::ZERO,
                value: U256::from(10_000u64),
                salt: B256::repeat_byte(0xab),
                hook_data: Bytes::new(),
            },
        }
    }

    #[test]
    fn uint256_fields_serialise_as_decimal_strings() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["maxFee"], "2000001");
        assert_eq!(
            json["maxBlockHeight"],
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
        );
        assert_eq!(json["spec"]["value"], "10000");
        assert_eq!(json["spec"]["destinationDomain"], 6);
        assert_eq!(json["spec"]["hookData"], "0x");
        assert_eq!(
            json["spec"]["sourceSigner"],
            "0x000000000000000000000000e616b2ec620621797030e0ab1ba38da68d78351c"
        );
    }

    #[test]
    fn accepts_numeric_and_hex_amounts_on_input() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["maxFee"] = serde_json::json!(2000001);
        json["spec"]["value"] = serde_json::json!("0x2710");
        let parsed: BurnIntent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn signer_address_reads_low_bytes() {
        let intent = sample();
        assert_eq!(
            intent.spec.signer_address(),
            "0xe616b2ec620621797030e0ab1ba38da68d78351c".parse::<Address>().unwrap()
        );
    }
}
