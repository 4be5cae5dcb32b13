//! Supported blockchain networks
//!
//! Every chain belongs to exactly one of the MAINNET or TESTNET sets and has a
//! counterpart in the other set. The counterpart table drives the "please
//! connect to the X network" guidance when a wallet is on the wrong side.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Chain {
    Ethereum,
    Polygon,
    Klaytn,
    Arbitrum,
    Optimism,
    Avalanche,
    Bsc,
    Base,
    Solana,
    Sepolia,
    Amoy,
    Baobab,
    ArbitrumSepolia,
    OptimismSepolia,
    Fuji,
    BscTestnet,
    BaseSepolia,
    SolanaDevnet,
}

/// Native asset description, shaped for `wallet_addEthereumChain`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

/// Static description of a chain
#[derive(Debug, Clone, Copy)]
pub struct ChainMetadata {
    pub display_name: &'static str,
    /// EVM network id; `None` for non-EVM chains
    pub network_id: Option<u64>,
    /// Public RPC endpoint (rate limited, overridable through `RpcConfig`)
    pub rpc_url: &'static str,
    pub native_currency: NativeCurrency,
    pub explorer_url: &'static str,
}

const ETH: NativeCurrency = NativeCurrency {
    name: "Ether",
    symbol: "ETH",
    decimals: 18,
};

const POL: NativeCurrency = NativeCurrency {
    name: "POL",
    symbol: "POL",
    decimals: 18,
};

const KLAY: NativeCurrency = NativeCurrency {
    name: "KLAY",
    symbol: "KLAY",
    decimals: 18,
};

const AVAX: NativeCurrency = NativeCurrency {
    name: "Avalanche",
    symbol: "AVAX",
    decimals: 18,
};

const BNB: NativeCurrency = NativeCurrency {
    name: "BNB",
    symbol: "BNB",
    decimals: 18,
};

const SOL: NativeCurrency = NativeCurrency {
    name: "Solana",
    symbol: "SOL",
    decimals: 9,
};

impl Chain {
    pub const MAINNETS: [Chain; 9] = [
        Chain::Ethereum,
        Chain::Polygon,
        Chain::Klaytn,
        Chain::Arbitrum,
        Chain::Optimism,
        Chain::Avalanche,
        Chain::Bsc,
        Chain::Base,
        Chain::Solana,
    ];

    pub const TESTNETS: [Chain; 9] = [
        Chain::Sepolia,
        Chain::Amoy,
        Chain::Baobab,
        Chain::ArbitrumSepolia,
        Chain::OptimismSepolia,
        Chain::Fuji,
        Chain::BscTestnet,
        Chain::BaseSepolia,
        Chain::SolanaDevnet,
    ];

    /// All chains, mainnets first
    pub fn all() -> impl Iterator<Item = Chain> {
        Self::MAINNETS.into_iter().chain(Self::TESTNETS)
    }

    pub fn is_mainnet(&self) -> bool {
        Self::MAINNETS.contains(self)
    }

    pub fn is_testnet(&self) -> bool {
        !self.is_mainnet()
    }

    /// The corresponding chain on the other side of the mainnet/testnet split
    pub fn counterpart(&self) -> Option<Chain> {
        Self::MAINNETS
            .iter()
            .position(|c| c == self)
            .map(|i| Self::TESTNETS[i])
            .or_else(|| {
                Self::TESTNETS
                    .iter()
                    .position(|c| c == self)
                    .map(|i| Self::MAINNETS[i])
            })
    }

    pub fn network_id(&self) -> Option<u64> {
        self.metadata().network_id
    }

    pub fn display_name(&self) -> &'static str {
        self.metadata().display_name
    }

    /// Resolve an EVM network id to a chain
    pub fn from_network_id(network_id: u64) -> Option<Chain> {
        Self::all().find(|c| c.network_id() == Some(network_id))
    }

    /// Prefix used for per-chain environment variables (`<PREFIX>_RPC_URL`)
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ETH",
            Chain::Polygon => "POLYGON",
            Chain::Klaytn => "KLAYTN",
            Chain::Arbitrum => "ARBITRUM",
            Chain::Optimism => "OPTIMISM",
            Chain::Avalanche => "AVALANCHE",
            Chain::Bsc => "BSC",
            Chain::Base => "BASE",
            Chain::Solana => "SOLANA",
            Chain::Sepolia => "SEPOLIA",
            Chain::Amoy => "AMOY",
            Chain::Baobab => "BAOBAB",
            Chain::ArbitrumSepolia => "ARBITRUM_SEPOLIA",
            Chain::OptimismSepolia => "OPTIMISM_SEPOLIA",
            Chain::Fuji => "FUJI",
            Chain::BscTestnet => "BSC_TESTNET",
            Chain::BaseSepolia => "BASE_SEPOLIA",
            Chain::SolanaDevnet => "SOLANA_DEVNET",
        }
    }

    pub fn metadata(&self) -> ChainMetadata {
        match self {
            Chain::Ethereum => ChainMetadata {
                display_name: "Ethereum",
                network_id: Some(1),
                rpc_url: "https://eth.llamarpc.com",
                native_currency: ETH,
                explorer_url: "https://etherscan.io",
            },
            Chain::Polygon => ChainMetadata {
                display_name: "Polygon",
                network_id: Some(137),
                rpc_url: "https://polygon-rpc.com",
                native_currency: POL,
                explorer_url: "https://polygonscan.com",
            },
            Chain::Klaytn => ChainMetadata {
                display_name: "Klaytn",
                network_id: Some(8217),
                rpc_url: "https://public-en-cypress.klaytn.net",
                native_currency: KLAY,
                explorer_url: "https://scope.klaytn.com",
            },
            Chain::Arbitrum => ChainMetadata {
                display_name: "Arbitrum",
                network_id: Some(42161),
                rpc_url: "https://arb1.arbitrum.io/rpc",
                native_currency: ETH,
                explorer_url: "https://arbiscan.io",
            },
            Chain::Optimism => ChainMetadata {
                display_name: "Optimism",
                network_id: Some(10),
                rpc_url: "https://mainnet.optimism.io",
                native_currency: ETH,
                explorer_url: "https://optimistic.etherscan.io",
            },
            Chain::Avalanche => ChainMetadata {
                display_name: "Avalanche",
                network_id: Some(43114),
                rpc_url: "https://api.avax.network/ext/bc/C/rpc",
                native_currency: AVAX,
                explorer_url: "https://snowtrace.io",
            },
            Chain::Bsc => ChainMetadata {
                display_name: "BNB Chain",
                network_id: Some(56),
                rpc_url: "https://bsc-dataseed.binance.org",
                native_currency: BNB,
                explorer_url: "https://bscscan.com",
            },
            Chain::Base => ChainMetadata {
                display_name: "Base",
                network_id: Some(8453),
                rpc_url: "https://mainnet.base.org",
                native_currency: ETH,
                explorer_url: "https://basescan.org",
            },
            Chain::Solana => ChainMetadata {
                display_name: "Solana",
                network_id: None,
                rpc_url: "https://api.mainnet-beta.solana.com",
                native_currency: SOL,
                explorer_url: "https://explorer.solana.com",
            },
            Chain::Sepolia => ChainMetadata {
                display_name: "Sepolia",
                network_id: Some(11_155_111),
                rpc_url: "https://rpc.sepolia.org",
                native_currency: ETH,
                explorer_url: "https://sepolia.etherscan.io",
            },
            Chain::Amoy => ChainMetadata {
                display_name: "Polygon Amoy",
                network_id: Some(80_002),
                rpc_url: "https://rpc-amoy.polygon.technology",
                native_currency: POL,
                explorer_url: "https://amoy.polygonscan.com",
            },
            Chain::Baobab => ChainMetadata {
                display_name: "Baobab",
                network_id: Some(1001),
                rpc_url: "https://public-en-baobab.klaytn.net",
                native_currency: KLAY,
                explorer_url: "https://baobab.scope.klaytn.com",
            },
            Chain::ArbitrumSepolia => ChainMetadata {
                display_name: "Arbitrum Sepolia",
                network_id: Some(421_614),
                rpc_url: "https://sepolia-rollup.arbitrum.io/rpc",
                native_currency: ETH,
                explorer_url: "https://sepolia.arbiscan.io",
            },
            Chain::OptimismSepolia => ChainMetadata {
                display_name: "Optimism Sepolia",
                network_id: Some(11_155_420),
                rpc_url: "https://sepolia.optimism.io",
                native_currency: ETH,
                explorer_url: "https://sepolia-optimism.etherscan.io",
            },
            Chain::Fuji => ChainMetadata {
                display_name: "Avalanche Fuji",
                network_id: Some(43113),
                rpc_url: "https://api.avax-test.network/ext/bc/C/rpc",
                native_currency: AVAX,
                explorer_url: "https://testnet.snowtrace.io",
            },
            Chain::BscTestnet => ChainMetadata {
                display_name: "BNB Chain Testnet",
                network_id: Some(97),
                rpc_url: "https://data-seed-prebsc-1-s1.binance.org:8545",
                native_currency: BNB,
                explorer_url: "https://testnet.bscscan.com",
            },
            Chain::BaseSepolia => ChainMetadata {
                display_name: "Base Sepolia",
                network_id: Some(84_532),
                rpc_url: "https://sepolia.base.org",
                native_currency: ETH,
                explorer_url: "https://sepolia.basescan.org",
            },
            Chain::SolanaDevnet => ChainMetadata {
                display_name: "Solana Devnet",
                network_id: None,
                rpc_url: "https://api.devnet.solana.com",
                native_currency: SOL,
                explorer_url: "https://explorer.solana.com/?cluster=devnet",
            },
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_and_testnet_sets_are_disjoint() {
        for chain in Chain::MAINNETS {
            assert!(!Chain::TESTNETS.contains(&chain), "{chain:?} in both sets");
            assert!(chain.is_mainnet());
        }
        for chain in Chain::TESTNETS {
            assert!(chain.is_testnet());
        }
    }

    #[test]
    fn counterparts_are_symmetric() {
        for chain in Chain::all() {
            let other = chain.counterpart().unwrap();
            assert_ne!(chain.is_mainnet(), other.is_mainnet());
            assert_eq!(other.counterpart(), Some(chain));
        }
        assert_eq!(Chain::Ethereum.counterpart(), Some(Chain::Sepolia));
        assert_eq!(Chain::Amoy.counterpart(), Some(Chain::Polygon));
    }

    #[test]
    fn network_ids_resolve_back_to_chains() {
        assert_eq!(Chain::from_network_id(1), Some(Chain::Ethereum));
        assert_eq!(Chain::from_network_id(137), Some(Chain::Polygon));
        assert_eq!(Chain::from_network_id(11_155_111), Some(Chain::Sepolia));
        assert_eq!(Chain::from_network_id(999_999), None);
        for chain in Chain::all() {
            if let Some(id) = chain.network_id() {
                assert_eq!(Chain::from_network_id(id), Some(chain));
            }
        }
    }

    #[test]
    fn non_evm_chains_have_no_network_id() {
        assert_eq!(Chain::Solana.network_id(), None);
        assert_eq!(Chain::SolanaDevnet.network_id(), None);
    }

    #[test]
    fn serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&Chain::BscTestnet).unwrap();
        assert_eq!(json, "\"BSC_TESTNET\"");
        let parsed: Chain = serde_json::from_str("\"ETHEREUM\"").unwrap();
        assert_eq!(parsed, Chain::Ethereum);
    }
}
