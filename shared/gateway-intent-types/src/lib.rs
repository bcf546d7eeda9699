//! Shared types for Gateway burn intents, the EIP-712 domain, and the chain table.

pub mod chains;
pub mod intent;
pub mod uint;

pub use chains::{Chain, Network};
pub use intent::{BurnIntent, SignedBurnIntent, TransferSpec};

use serde::{Deserialize, Serialize};

/// `TransferSpec.version` understood by the Gateway API.
pub const TRANSFER_SPEC_VERSION: u32 = 1;

/// Token symbol used by the balances endpoint.
pub const USDC: &str = "USDC";

/// USDC has six decimals on every supported chain.
pub const USDC_DECIMALS: u32 = 6;

/// EIP-712 domain descriptor.
///
/// Gateway uses a minimal domain: no `chainId`, no `verifyingContract`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eip712Domain {
    pub name: String,
    pub version: String,
}

impl Eip712Domain {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// The domain Gateway Wallet verifies burn intents against.
    pub fn gateway_wallet() -> Self {
        Self::new("GatewayWallet", "1")
    }
}

impl Default for Eip712Domain {
    fn default() -> Self {
        Self::gateway_wallet()
    }
}
