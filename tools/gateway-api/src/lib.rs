//! Circle Gateway client: transfer submission, balances, wallet-bridge signing, contract calldata.

pub mod balances;
pub mod client;
pub mod contracts;
pub mod error;
pub mod rejection;
pub mod wallet;

pub use balances::{BalanceSource, Balances, DomainBalance};
pub use client::{
    DestinationOutcome, GatewayClient, GatewayConfig, SubmitOutcome, TransferAccepted,
};
pub use contracts::{
    allowance_calldata, approve_calldata, balance_of_calldata, decode_uint256, deposit_calldata,
    gateway_mint_calldata,
};
pub use error::{GatewayError, GatewayResult};
pub use rejection::{classify_rejection, Rejection, RejectionKind};
pub use wallet::JsonRpcWallet;
