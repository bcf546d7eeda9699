//! Hex, bytes32 and amount encoding helpers.
//!
//! Everything here is pure: string in, typed value (or `EncodingError`) out.

use std::str::FromStr;
use std::sync::OnceLock;

use alloy_primitives::{Address, Bytes, U256};
use gateway_intent_types::{intent::address_to_bytes32, USDC_DECIMALS};
use regex::Regex;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde_json::Value;

use crate::errors::EncodingError;

/// Wire fields that must be exactly 32 bytes of hex.
pub const BYTES32_FIELDS: [&str; 9] = [
    "sourceContract",
    "destinationContract",
    "sourceToken",
    "destinationToken",
    "sourceDepositor",
    "destinationRecipient",
    "sourceSigner",
    "destinationCaller",
    "salt",
];

/// Wire fields typed `uint256`; transmitted as decimal strings only.
pub const UINT256_FIELDS: [&str; 3] = ["maxBlockHeight", "maxFee", "value"];

fn address_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("static address regex"))
}

fn bytes32_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]{64}$").expect("static bytes32 regex"))
}

fn decimal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+$").expect("static decimal regex"))
}

pub fn is_bytes32(value: &str) -> bool {
    bytes32_re().is_match(value)
}

/// Parse a `0x`-prefixed 20-byte hex address (any letter case, checksum not enforced).
pub fn parse_address(field: &'static str, value: &str) -> Result<Address, EncodingError> {
    let value = value.trim();
    if !address_re().is_match(value) {
        return Err(EncodingError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
    Address::from_str(value).map_err(|_| EncodingError::InvalidAddress {
        field,
        value: value.to_string(),
    })
}

/// Left-pad a 20-byte hex address to a lowercase bytes32 hex string.
pub fn pad_to_32(address: &str) -> Result<String, EncodingError> {
    let parsed = parse_address("address", address)?;
    let padded = format!("0x{}", hex::encode(address_to_bytes32(parsed)));
    if !is_bytes32(&padded) {
        return Err(EncodingError::NotBytes32 {
            field: "address".into(),
            value: padded,
        });
    }
    Ok(padded)
}

/// Parse `hookData`: `0x` (empty) or `0x`-prefixed even-length hex.
pub fn parse_hook_data(value: &str) -> Result<Bytes, EncodingError> {
    let invalid = || EncodingError::InvalidHookData(value.to_string());
    let raw = value.trim().strip_prefix("0x").ok_or_else(invalid)?;
    if raw.len() % 2 != 0 {
        return Err(invalid());
    }
    let bytes = hex::decode(raw).map_err(|_| invalid())?;
    Ok(Bytes::from(bytes))
}

/// Parse an amount already expressed in token base units (decimal integer string).
pub fn parse_base_units(value: &str) -> Result<U256, EncodingError> {
    let value = value.trim();
    if !decimal_re().is_match(value) {
        return Err(EncodingError::InvalidAmount(format!(
            "expected a base-10 integer in base units, got {value:?}"
        )));
    }
    U256::from_str_radix(value, 10)
        .map_err(|e| EncodingError::InvalidAmount(format!("{value}: {e}")))
}

/// Convert a human USDC amount (eg `"0.01"`) into 6-decimal base units (eg `10000`).
pub fn parse_usdc_amount(value: &str) -> Result<U256, EncodingError> {
    let invalid = |why: &str| EncodingError::InvalidAmount(format!("{value:?}: {why}"));
    let amount = Decimal::from_str(value.trim()).map_err(|_| invalid("not a decimal number"))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(invalid("negative"));
    }
    if amount.normalize().scale() > USDC_DECIMALS {
        return Err(invalid("more than 6 fractional digits"));
    }
    let units = amount
        .checked_mul(Decimal::from(10u64.pow(USDC_DECIMALS)))
        .ok_or_else(|| invalid("overflow"))?;
    let units = units.to_u128().ok_or_else(|| invalid("out of range"))?;
    Ok(U256::from(units))
}

/// Render base units as a USDC decimal (eg `10000` -> `0.010000`).
pub fn format_usdc(units: U256) -> String {
    let scale = U256::from(10u64.pow(USDC_DECIMALS));
    let whole = units / scale;
    let frac = units % scale;
    format!("{whole}.{:0>6}", frac.to_string())
}

/// Validate the JSON wire form of an intent (or a signed intent, or a typed-data payload).
///
/// Walks every object and checks bytes32 fields, `hookData`, and that `uint256` fields
/// are plain decimal strings.
pub fn check_wire_fields(value: &Value) -> Result<(), EncodingError> {
    match value {
        Value::Array(items) => items.iter().try_for_each(check_wire_fields),
        Value::Object(map) => {
            for (key, v) in map {
                let key = key.as_str();
                if BYTES32_FIELDS.contains(&key) {
                    match v.as_str() {
                        Some(s) if is_bytes32(s) => {}
                        _ => {
                            return Err(EncodingError::NotBytes32 {
                                field: key.to_string(),
                                value: v.to_string(),
                            })
                        }
                    }
                } else if key == "hookData" {
                    let s = v
                        .as_str()
                        .ok_or_else(|| EncodingError::InvalidHookData(v.to_string()))?;
                    parse_hook_data(s)?;
                } else if UINT256_FIELDS.contains(&key) {
                    match v.as_str() {
                        Some(s) if decimal_re().is_match(s) => {}
                        _ => {
                            return Err(EncodingError::InvalidAmount(format!(
                                "{key} must be a decimal string, got {v}"
                            )))
                        }
                    }
                } else {
                    check_wire_fields(v)?;
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
