//! ABI for the on-chain side of Gateway: USDC, Gateway Wallet (deposit) and Gateway Minter.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};

sol! {
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    interface IGatewayWallet {
        function deposit(address token, uint256 value) external;
    }

    interface IGatewayMinter {
        function gatewayMint(bytes attestationPayload, bytes signature) external;
    }
}

/// Calldata for `GatewayMinter.gatewayMint` on the destination chain.
pub fn gateway_mint_calldata(attestation: &Bytes, signature: &Bytes) -> Bytes {
    IGatewayMinter::gatewayMintCall {
        attestationPayload: attestation.clone(),
        signature: signature.clone(),
    }
    .abi_encode()
    .into()
}

/// Calldata for `GatewayWallet.deposit(token, value)`.
pub fn deposit_calldata(token: Address, value: U256) -> Bytes {
    IGatewayWallet::depositCall { token, value }.abi_encode().into()
}

pub fn approve_calldata(spender: Address, amount: U256) -> Bytes {
    IERC20::approveCall { spender, amount }.abi_encode().into()
}

pub fn balance_of_calldata(owner: Address) -> Bytes {
    IERC20::balanceOfCall { owner }.abi_encode().into()
}

pub fn allowance_calldata(owner: Address, spender: Address) -> Bytes {
    IERC20::allowanceCall { owner, spender }.abi_encode().into()
}

/// Decode the single `uint256` returned by `balanceOf` / `allowance`.
pub fn decode_uint256(data: &[u8]) -> Result<U256, alloy_sol_types::Error> {
    IERC20::allowanceCall::abi_decode_returns(data, true).map(|ret| ret._0)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, keccak256};

    use super::*;

    #[test]
    fn selector_and_layout() {
        let attestation = Bytes::from(vec![0xaa, 0xbb, 0xcc]);
        let signature = Bytes::from(vec![0x11; 65]);
        let data = gateway_mint_calldata(&attestation, &signature);

        let hash = keccak256("gatewayMint(bytes,bytes)");
        assert_eq!(&data[..4], &hash[..4]);
        assert_eq!(&data[..4], IGatewayMinter::gatewayMintCall::SELECTOR.as_slice());
        // selector + 2 offsets + (len + 1 word) + (len + 3 words)
        assert_eq!(data.len(), 4 + 64 + 64 + 128);
        // first tail starts right after the two head words
        assert_eq!(data[4 + 31], 0x40);
    }

    #[test]
    fn deposit_and_approve_layout() {
        let usdc = address!("1c7D4B196Cb0C7B01d743Fbc6116a902379C7238");
        let wallet = address!("0077777d7EBA4688BDeF3E311b846F25870A19B9");

        let deposit = deposit_calldata(usdc, U256::from(5_000_000u64));
        assert_eq!(&deposit[..4], &keccak256("deposit(address,uint256)")[..4]);
        assert_eq!(deposit.len(), 4 + 64);
        assert_eq!(&deposit[4 + 12..4 + 32], usdc.as_slice());
        assert_eq!(U256::from_be_slice(&deposit[36..68]), U256::from(5_000_000u64));

        let approve = approve_calldata(wallet, U256::MAX);
        assert_eq!(&approve[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(&approve[4 + 12..4 + 32], wallet.as_slice());
        assert_eq!(&balance_of_calldata(wallet)[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(&allowance_calldata(wallet, usdc)[..4], &[0xdd, 0x62, 0xed, 0x3e]);
    }

    #[test]
    fn uint_return_decoding() {
        let word = U256::from(1_234_567u64).to_be_bytes::<32>();
        assert_eq!(decode_uint256(&word).unwrap(), U256::from(1_234_567u64));
        assert!(decode_uint256(&word[..31]).is_err());
    }
}
