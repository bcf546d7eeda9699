//! Decimal-string serde for `uint256` fields.
//!
//! Amounts and block-height bounds cross the JSON boundary as base-10 strings so that
//! no consumer ever sees a float or a big-integer artefact. Deserialisation is lenient
//! (decimal string, `0x` hex string, or a plain JSON integer).

use alloy_primitives::U256;
use serde::{de, Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(U256::from(n)),
        Raw::Str(s) => parse_u256(&s).map_err(de::Error::custom),
    }
}

/// Parse a base-10 (or `0x`-prefixed base-16) unsigned integer.
pub fn parse_u256(s: &str) -> Result<U256, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty integer".into());
    }
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => U256::from_str_radix(hex, 16),
        None => {
            if !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(format!("not a base-10 integer: {s}"));
            }
            U256::from_str_radix(s, 10)
        }
    };
    parsed.map_err(|e| format!("invalid uint256 {s}: {e}"))
}
