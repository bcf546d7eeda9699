//! Burn-intent construction.
//!
//! The builder takes caller-supplied strings (addresses as 20-byte hex, amounts in base
//! units), validates every field, pads addresses into bytes32 words and draws a fresh
//! random salt on every `build()`.

use alloy_primitives::{Address, Bytes, B256, U256};
use gateway_intent_types::{
    intent::address_to_bytes32, BurnIntent, Network, TransferSpec, TRANSFER_SPEC_VERSION,
};
use rand::{rngs::OsRng, CryptoRng, RngCore};

use crate::encoding::{parse_address, parse_base_units, parse_hook_data, parse_usdc_amount};
use crate::errors::EncodingError;

/// 2.000001 USDC: the lowest fee Gateway accepted for Ethereum-sourced burns.
pub const DEFAULT_MAX_FEE: u64 = 2_000_001;

/// Who may call `gatewayMint` on the destination chain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DestinationCaller {
    /// Zero address: anyone holding the attestation may mint.
    #[default]
    Anyone,
    /// Only the intent's signer may mint.
    Signer,
    /// A specific caller (20-byte hex).
    Address(String),
}

#[derive(Clone, Debug, Default)]
pub struct BurnIntentBuilder {
    source_domain: Option<u32>,
    destination_domain: Option<u32>,
    source_contract: Option<String>,
    destination_contract: Option<String>,
    source_token: Option<String>,
    destination_token: Option<String>,
    depositor: Option<String>,
    signer: Option<String>,
    recipient: Option<String>,
    value: Option<Result<U256, EncodingError>>,
    destination_caller: DestinationCaller,
    max_fee: Option<U256>,
    max_block_height: Option<U256>,
    hook_data: Option<String>,
}

impl BurnIntentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fill domains, Gateway contracts and USDC addresses for a route on `network`.
    pub fn for_route(
        network: Network,
        source_domain: u32,
        destination_domain: u32,
    ) -> Result<Self, EncodingError> {
        let source = network
            .by_domain(source_domain)
            .ok_or(EncodingError::UnknownDomain(source_domain))?;
        let destination = network
            .by_domain(destination_domain)
            .ok_or(EncodingError::UnknownDomain(destination_domain))?;

        Ok(Self::new()
            .source_domain(source.domain)
            .destination_domain(destination.domain)
            .source_contract(&network.gateway_wallet().to_string())
            .destination_contract(&network.gateway_minter().to_string())
            .source_token(&source.usdc.to_string())
            .destination_token(&destination.usdc.to_string()))
    }

    pub fn source_domain(mut self, domain: u32) -> Self {
        self.source_domain = Some(domain);
        self
    }

    pub fn destination_domain(mut self, domain: u32) -> Self {
        self.destination_domain = Some(domain);
        self
    }

    pub fn source_contract(mut self, address: &str) -> Self {
        self.source_contract = Some(address.to_string());
        self
    }

    pub fn destination_contract(mut self, address: &str) -> Self {
        self.destination_contract = Some(address.to_string());
        self
    }

    pub fn source_token(mut self, address: &str) -> Self {
        self.source_token = Some(address.to_string());
        self
    }

    pub fn destination_token(mut self, address: &str) -> Self {
        self.destination_token = Some(address.to_string());
        self
    }

    pub fn depositor(mut self, address: &str) -> Self {
        self.depositor = Some(address.to_string());
        self
    }

    pub fn signer(mut self, address: &str) -> Self {
        self.signer = Some(address.to_string());
        self
    }

    /// Set depositor and signer to the same address (the usual case).
    pub fn owner(self, address: &str) -> Self {
        self.depositor(address).signer(address)
    }

    pub fn recipient(mut self, address: &str) -> Self {
        self.recipient = Some(address.to_string());
        self
    }

    /// Amount in token base units, as a decimal integer string (eg `"10000"`).
    pub fn value(mut self, base_units: &str) -> Self {
        self.value = Some(parse_base_units(base_units));
        self
    }

    pub fn value_units(mut self, base_units: U256) -> Self {
        self.value = Some(Ok(base_units));
        self
    }

    /// Amount in whole USDC (eg `"0.01"`).
    pub fn value_usdc(mut self, amount: &str) -> Self {
        self.value = Some(parse_usdc_amount(amount));
        self
    }

    pub fn destination_caller(mut self, caller: DestinationCaller) -> Self {
        self.destination_caller = caller;
        self
    }

    pub fn max_fee(mut self, base_units: U256) -> Self {
        self.max_fee = Some(base_units);
        self
    }

    pub fn max_block_height(mut self, height: U256) -> Self {
        self.max_block_height = Some(height);
        self
    }

    pub fn hook_data(mut self, hex: &str) -> Self {
        self.hook_data = Some(hex.to_string());
        self
    }

    /// Validate and build with a salt from the OS CSPRNG.
    pub fn build(&self) -> Result<BurnIntent, EncodingError> {
        self.build_with_rng(&mut OsRng)
    }

    /// Validate and build, drawing the salt from `rng`.
    pub fn build_with_rng<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<BurnIntent, EncodingError> {
        let source_domain = self
            .source_domain
            .ok_or(EncodingError::MissingField("sourceDomain"))?;
        let destination_domain = self
            .destination_domain
            .ok_or(EncodingError::MissingField("destinationDomain"))?;

        let source_contract = required("sourceContract", &self.source_contract)?;
        let destination_contract = required("destinationContract", &self.destination_contract)?;
        let source_token = required("sourceToken", &self.source_token)?;
        let destination_token = required("destinationToken", &self.destination_token)?;
        let depositor = required("sourceDepositor", &self.depositor)?;
        let signer = required("sourceSigner", &self.signer)?;
        let recipient = required("destinationRecipient", &self.recipient)?;

        if depositor != signer {
            return Err(EncodingError::DepositorSignerMismatch { depositor, signer });
        }

        let value = self
            .value
            .clone()
            .ok_or(EncodingError::MissingField("value"))??;
        if value.is_zero() {
            return Err(EncodingError::InvalidAmount("value must be greater than zero".into()));
        }

        let destination_caller = match &self.destination_caller {
            DestinationCaller::Anyone => Address::ZERO,
            DestinationCaller::Signer => signer,
            DestinationCaller::Address(a) => parse_address("destinationCaller", a)?,
        };

        let hook_data = match &self.hook_data {
            Some(h) => parse_hook_data(h)?,
            None => Bytes::new(),
        };

        let mut salt = [0u8; 32];
        rng.fill_bytes(&mut salt);

        Ok(BurnIntent {
            max_block_height: self.max_block_height.unwrap_or(U256::MAX),
            max_fee: self.max_fee.unwrap_or(U256::from(DEFAULT_MAX_FEE)),
            spec: TransferSpec {
                version: TRANSFER_SPEC_VERSION,
                source_domain,
                destination_domain,
                source_contract: address_to_bytes32(source_contract),
                destination_contract: address_to_bytes32(destination_contract),
                source_token: address_to_bytes32(source_token),
                destination_token: address_to_bytes32(destination_token),
                source_depositor: address_to_bytes32(depositor),
                destination_recipient: address_to_bytes32(recipient),
                source_signer: address_to_bytes32(signer),
                destination_caller: address_to_bytes32(destination_caller),
                value,
                salt: B256::from(salt),
                hook_data,
            },
        })
    }
}

fn required(field: &'static str, value: &Option<String>) -> Result<Address, EncodingError> {
    let value = value.as_deref().ok_or(EncodingError::MissingField(field))?;
    parse_address(field, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{check_wire_fields, is_bytes32};
    use gateway_intent_types::intent::bytes32_to_address;

    const OWNER: &str = "0xE616B2eC620621797030E0AB1BA38DA68D78351C";
    const RECIPIENT: &str = "0x742d35Cc6634C0532925a3b8D402b1DeF8d87d87";

    fn route() -> BurnIntentBuilder {
        BurnIntentBuilder::for_route(Network::Testnet, 0, 6)
            .unwrap()
            .owner(OWNER)
            .recipient(RECIPIENT)
            .value("10000")
    }

    #[test]
    fn builds_testnet_route() {
        let intent = route().build().unwrap();
        let spec = &intent.spec;
        assert_eq!(spec.version, 1);
        assert_eq!(spec.source_domain, 0);
        assert_eq!(spec.destination_domain, 6);
        assert_eq!(
            bytes32_to_address(&spec.source_contract),
            Network::Testnet.gateway_wallet()
        );
        assert_eq!(
            bytes32_to_address(&spec.destination_token),
            Network::Testnet.by_domain(6).unwrap().usdc
        );
        assert_eq!(spec.source_signer, spec.source_depositor);
        assert_eq!(spec.destination_caller, B256::ZERO);
        assert_eq!(spec.value, U256::from(10_000u64));
        assert_eq!(intent.max_block_height, U256::MAX);
        assert_eq!(intent.max_fee, U256::from(DEFAULT_MAX_FEE));
        assert!(spec.hook_data.is_empty());
    }

    #[test]
    fn every_bytes32_field_is_well_formed_on_the_wire() {
        let intent = route().hook_data("0xcafe").build().unwrap();
        let json = serde_json::to_value(&intent).unwrap();
        check_wire_fields(&json).unwrap();
        for field in crate::encoding::BYTES32_FIELDS {
            let v = json["spec"][field].as_str().unwrap();
            assert!(is_bytes32(v), "{field}={v}");
        }
        assert_eq!(json["spec"]["hookData"], "0xcafe");
    }

    #[test]
    fn salts_differ_between_identical_builds() {
        let builder = route();
        let a = builder.build().unwrap();
        let b = builder.build().unwrap();
        assert_ne!(a.spec.salt, b.spec.salt);
        assert_ne!(a.spec.salt, B256::ZERO);
    }

    #[test]
    fn destination_caller_modes() {
        let signer_only = route()
            .destination_caller(DestinationCaller::Signer)
            .build()
            .unwrap();
        assert_eq!(signer_only.spec.destination_caller, signer_only.spec.source_signer);

        let explicit = route()
            .destination_caller(DestinationCaller::Address(RECIPIENT.into()))
            .build()
            .unwrap();
        assert_eq!(
            explicit.spec.destination_caller,
            explicit.spec.destination_recipient
        );

        let bad = route()
            .destination_caller(DestinationCaller::Address("0x1234".into()))
            .build();
        assert!(matches!(bad, Err(EncodingError::InvalidAddress { .. })));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            route().recipient("0x742d35Cc").build(),
            Err(EncodingError::InvalidAddress { field: "destinationRecipient", .. })
        ));
        assert!(matches!(
            route().hook_data("0x123").build(),
            Err(EncodingError::InvalidHookData(_))
        ));
        assert!(matches!(
            route().value("0.01").build(),
            Err(EncodingError::InvalidAmount(_))
        ));
        assert!(matches!(
            route().value("0").build(),
            Err(EncodingError::InvalidAmount(_))
        ));
        assert!(matches!(
            route().signer(RECIPIENT).build(),
            Err(EncodingError::DepositorSignerMismatch { .. })
        ));
        assert!(matches!(
            BurnIntentBuilder::new().build(),
            Err(EncodingError::MissingField("sourceDomain"))
        ));
        assert!(matches!(
            BurnIntentBuilder::for_route(Network::Testnet, 0, 99),
            Err(EncodingError::UnknownDomain(99))
        ));
    }

    #[test]
    fn usdc_amount_and_fee_override() {
        let intent = route()
            .value_usdc("0.5")
            .max_fee(U256::from(10_000u64))
            .build()
            .unwrap();
        assert_eq!(intent.spec.value, U256::from(500_000u64));
        assert_eq!(intent.max_fee, U256::from(10_000u64));
    }
}
