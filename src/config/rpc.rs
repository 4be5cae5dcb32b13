//! RPC endpoint configuration
//!
//! The URLs end up in `wallet_addEthereumChain` requests, so a wallet that has
//! never seen a chain gets a working endpoint. Resolution order:
//! 1. Per-chain env vars (ETH_RPC_URL, POLYGON_RPC_URL, ...) - highest priority
//! 2. ALCHEMY_API_KEY - builds URLs for the chains Alchemy serves
//! 3. Public RPC endpoints from the chain table - rate limited
//!
//! # Examples
//!
//! ```bash
//! export ETH_RPC_URL="https://eth-mainnet.g.alchemy.com/v2/YOUR_KEY"
//! export BASE_SEPOLIA_RPC_URL="https://base-sepolia.g.alchemy.com/v2/YOUR_KEY"
//! ```

use crate::chain::Chain;
use std::collections::HashMap;

/// Environment variable names
mod env_vars {
    pub const ALCHEMY_API_KEY: &str = "ALCHEMY_API_KEY";
    pub const RPC_URL_SUFFIX: &str = "_RPC_URL";
}

/// RPC URLs for EVM chains
#[derive(Debug, Clone)]
pub struct RpcConfig {
    urls: HashMap<Chain, String>,
}

impl RpcConfig {
    /// Create RPC config from environment variables
    pub fn from_env() -> Self {
        let mut urls = HashMap::new();

        for chain in Chain::all().filter(|c| c.network_id().is_some()) {
            let var = format!("{}{}", chain.env_prefix(), env_vars::RPC_URL_SUFFIX);
            if let Ok(url) = std::env::var(&var) {
                if is_valid_url(&url) {
                    tracing::debug!(chain = ?chain, "Using {} for RPC", var);
                    urls.insert(chain, url);
                } else {
                    tracing::warn!(chain = ?chain, "Ignoring invalid URL in {}", var);
                }
            }
        }

        if let Ok(key) = std::env::var(env_vars::ALCHEMY_API_KEY) {
            tracing::info!("Building RPC URLs from ALCHEMY_API_KEY");
            for chain in Chain::all() {
                if let Some(host) = alchemy_host(chain) {
                    urls.entry(chain)
                        .or_insert_with(|| format!("https://{}.g.alchemy.com/v2/{}", host, key));
                }
            }
        }

        for chain in Chain::all().filter(|c| c.network_id().is_some()) {
            urls.entry(chain)
                .or_insert_with(|| chain.metadata().rpc_url.to_string());
        }

        Self { urls }
    }

    /// Create with explicit RPC URLs
    pub fn with_urls(urls: HashMap<Chain, String>) -> Self {
        Self { urls }
    }

    /// Get RPC URL for a chain
    pub fn get(&self, chain: Chain) -> Option<&str> {
        self.urls.get(&chain).map(|s| s.as_str())
    }

    pub fn has_chain(&self, chain: Chain) -> bool {
        self.urls.contains_key(&chain)
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn alchemy_host(chain: Chain) -> Option<&'static str> {
    match chain {
        Chain::Ethereum => Some("eth-mainnet"),
        Chain::Polygon => Some("polygon-mainnet"),
        Chain::Arbitrum => Some("arb-mainnet"),
        Chain::Optimism => Some("opt-mainnet"),
        Chain::Base => Some("base-mainnet"),
        Chain::Sepolia => Some("eth-sepolia"),
        Chain::Amoy => Some("polygon-amoy"),
        Chain::ArbitrumSepolia => Some("arb-sepolia"),
        Chain::OptimismSepolia => Some("opt-sepolia"),
        Chain::BaseSepolia => Some("base-sepolia"),
        _ => None,
    }
}

fn is_valid_url(candidate: &str) -> bool {
    url::Url::parse(candidate)
        .map(|u| matches!(u.scheme(), "http" | "https" | "ws" | "wss"))
        .unwrap_or(false)
}
