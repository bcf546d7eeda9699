//! Off-chain tooling for Circle Gateway burn intents: build, hash, sign, verify.

pub mod builder;
pub mod eip712;
pub mod encoding;
pub mod errors;
pub mod signer;


pub use builder::{BurnIntentBuilder, DestinationCaller, DEFAULT_MAX_FEE};
pub use eip712::{signing_digest, typed_data_json};
pub use encoding::{check_wire_fields, pad_to_32, parse_usdc_amount};
pub use errors::{EncodingError, SignError};
pub use signer::{
    recover_signer, sign_burn_intent, verify_signed, IntentSigner, LocalKeySigner,
};

pub use gateway_intent_types as types;
