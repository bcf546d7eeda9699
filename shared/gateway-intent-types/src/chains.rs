//! Gateway domain numbering and per-network deployment addresses.
//!
//! Domains are Gateway's own chain identifiers, not EVM chain ids.

use alloy_primitives::{address, Address};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Network {
    Testnet,
    Mainnet,
}

/// A chain reachable through Gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chain {
    pub domain: u32,
    pub name: &'static str,
    pub slug: &'static str,
    pub chain_id: u64,
    pub usdc: Address,
    pub explorer: &'static str,
}

const TESTNET_CHAINS: &[Chain] = &[
    Chain {
        domain: 0,
        name: "Ethereum Sepolia",
        slug: "ethereum-sepolia",
        chain_id: 11_155_111,
        usdc: address!("1c7D4B196Cb0C7B01d743Fbc6116a902379C7238"),
        explorer: "https://sepolia.etherscan.io",
    },
    Chain {
        domain: 1,
        name: "Avalanche Fuji",
        slug: "avalanche-fuji",
        chain_id: 43_113,
        usdc: address!("5425890298aed601595a70AB815c96711a31Bc65"),
        explorer: "https://testnet.snowtrace.io",
    },
    Chain {
        domain: 3,
        name: "Arbitrum Sepolia",
        slug: "arbitrum-sepolia",
        chain_id: 421_614,
        usdc: address!("75faf114eafb1BDbe2F0316DF893fd58CE46AA4d"),
        explorer: "https://sepolia.arbiscan.io",
    },
    Chain {
        domain: 6,
        name: "Base Sepolia",
        slug: "base-sepolia",
        chain_id: 84_532,
        usdc: address!("036CbD53842c5426634e7929541eC2318f3dCF7e"),
        explorer: "https://sepolia.basescan.org",
    },
];

const MAINNET_CHAINS: &[Chain] = &[
    Chain {
        domain: 0,
        name: "Ethereum",
        slug: "ethereum",
        chain_id: 1,
        usdc: address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
        explorer: "https://etherscan.io",
    },
    Chain {
        domain: 1,
        name: "Avalanche",
        slug: "avalanche",
        chain_id: 43_114,
        usdc: address!("B97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E"),
        explorer: "https://snowtrace.io",
    },
    Chain {
        domain: 6,
        name: "Base",
        slug: "base",
        chain_id: 8_453,
        usdc: address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
        explorer: "https://basescan.org",
    },
];

impl Network {
    pub fn chains(self) -> &'static [Chain] {
        match self {
            Network::Testnet => TESTNET_CHAINS,
            Network::Mainnet => MAINNET_CHAINS,
        }
    }

    /// Gateway Wallet: the escrow contract on the source side (`sourceContract`).
    pub fn gateway_wallet(self) -> Address {
        match self {
            Network::Testnet => address!("0077777d7EBA4688BDeF3E311b846F25870A19B9"),
            Network::Mainnet => address!("77777777Dcc4d5A8B6E418Fd04D8997ef11000eE"),
        }
    }

    /// Gateway Minter: the contract that redeems attestations (`destinationContract`).
    pub fn gateway_minter(self) -> Address {
        match self {
            Network::Testnet => address!("0022222ABE238Cc2C7Bb1f21003F0a260052475B"),
            Network::Mainnet => address!("2222222d7164433c4C09B0b0D809a9b52C04C205"),
        }
    }

    pub fn api_base_url(self) -> &'static str {
        match self {
            Network::Testnet => "https://gateway-api-testnet.circle.com",
            Network::Mainnet => "https://gateway-api.circle.com",
        }
    }

    pub fn by_domain(self, domain: u32) -> Option<&'static Chain> {
        self.chains().iter().find(|c| c.domain == domain)
    }

    /// Case-insensitive slug lookup (eg `base-sepolia`).
    pub fn by_slug(self, slug: &str) -> Option<&'static Chain> {
        let slug = slug.trim();
        self.chains().iter().find(|c| c.slug.eq_ignore_ascii_case(slug))
    }
}

impl Chain {
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer, tx_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domains_are_unique_per_network() {
        for network in [Network::Testnet, Network::Mainnet] {
            let mut domains: Vec<u32> = network.chains().iter().map(|c| c.domain).collect();
            domains.sort_unstable();
            domains.dedup();
            assert_eq!(domains.len(), network.chains().len());
        }
    }

    #[test]
    fn lookups() {
        let base = Network::Testnet.by_slug("Base-Sepolia").unwrap();
        assert_eq!(base.domain, 6);
        assert_eq!(base.chain_id, 84_532);
        assert_eq!(Network::Testnet.by_domain(0).unwrap().slug, "ethereum-sepolia");
        assert!(Network::Testnet.by_domain(42).is_none());
        assert!(Network::Mainnet.by_slug("base-sepolia").is_none());
    }

    #[test]
    fn explorer_links() {
        let fuji = Network::Testnet.by_slug("avalanche-fuji").unwrap();
        assert_eq!(fuji.tx_url("0xabc"), "https://testnet.snowtrace.io/tx/0xabc");
    }
}
