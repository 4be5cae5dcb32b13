//! Configuration for the marketplace wallet

pub mod rpc;

use crate::chain::Chain;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

// Re-export RPC config
pub use rpc::RpcConfig;

/// Selects mainnet or testnet mode ("mainnet" / "testnet")
pub const NETWORK_MODE_ENV: &str = "WALLET_NETWORK_MODE";

/// API key sent to the account source
pub const ACCOUNT_API_KEY_ENV: &str = "ACCOUNT_API_KEY";

/// Which side of the mainnet/testnet split the wallet operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    #[default]
    Mainnet,
    Testnet,
}

impl NetworkMode {
    /// Whether accounts on `chain` may be registered in this mode
    pub fn accepts(&self, chain: Chain) -> bool {
        match self {
            NetworkMode::Mainnet => chain.is_mainnet(),
            NetworkMode::Testnet => chain.is_testnet(),
        }
    }

    /// Key of the persisted session blob; each mode keeps its own session
    pub fn session_key(&self) -> &'static str {
        match self {
            NetworkMode::Mainnet => "wallet",
            NetworkMode::Testnet => "wallet-testnet",
        }
    }

    pub fn chains(&self) -> &'static [Chain] {
        match self {
            NetworkMode::Mainnet => &Chain::MAINNETS,
            NetworkMode::Testnet => &Chain::TESTNETS,
        }
    }
}

impl FromStr for NetworkMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(NetworkMode::Mainnet),
            "testnet" => Ok(NetworkMode::Testnet),
            other => Err(Error::Config(format!("Unknown network mode: {}", other))),
        }
    }
}

/// Remote account source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSourceConfig {
    /// GraphQL endpoint
    pub endpoint: String,
    /// Request timeout (milliseconds)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for AccountSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.opensea.io/graphql/".to_string(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network_mode: NetworkMode,
    /// Directory holding persisted session blobs
    pub session_dir: PathBuf,
    #[serde(default)]
    pub account_source: AccountSourceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network_mode: NetworkMode::default(),
            session_dir: PathBuf::from(".wallet-session"),
            account_source: AccountSourceConfig::default(),
        }
    }
}

impl Config {
    /// Load a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Apply environment overrides on top of file/default values
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(mode) = std::env::var(NETWORK_MODE_ENV) {
            self.network_mode = mode.parse()?;
            tracing::debug!(mode = ?self.network_mode, "Network mode from {}", NETWORK_MODE_ENV);
        }
        if url::Url::parse(&self.account_source.endpoint).is_err() {
            return Err(Error::Config(format!(
                "Invalid account source endpoint: {}",
                self.account_source.endpoint
            )));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_deserialize_defaults() {
        let value = serde_json::json!({
            "session_dir": "/tmp/sessions"
        });
        let parsed: Config = serde_json::from_value(value).expect("parse config");
        assert_eq!(parsed.network_mode, NetworkMode::Mainnet);
        assert_eq!(parsed.account_source.timeout_ms, 10_000);
        assert_eq!(parsed.session_dir, PathBuf::from("/tmp/sessions"));
    }

    #[test]
    fn config_deserialize_explicit() {
        let value = serde_json::json!({
            "network_mode": "testnet",
            "session_dir": "/tmp/sessions",
            "account_source": {
                "endpoint": "https://accounts.example/graphql",
                "timeout_ms": 2500
            }
        });
        let parsed: Config = serde_json::from_value(value).expect("parse config");
        assert_eq!(parsed.network_mode, NetworkMode::Testnet);
        assert_eq!(parsed.account_source.endpoint, "https://accounts.example/graphql");
        assert_eq!(parsed.account_source.timeout_ms, 2500);
    }

    #[test]
    fn network_mode_accepts_its_own_side_only() {
        assert!(NetworkMode::Mainnet.accepts(Chain::Ethereum));
        assert!(!NetworkMode::Mainnet.accepts(Chain::Sepolia));
        assert!(NetworkMode::Testnet.accepts(Chain::Amoy));
        assert!(!NetworkMode::Testnet.accepts(Chain::Polygon));
    }

    #[test]
    fn network_mode_parses() {
        assert_eq!("TESTNET".parse::<NetworkMode>().unwrap(), NetworkMode::Testnet);
        assert!("devnet".parse::<NetworkMode>().is_err());
        assert_ne!(
            NetworkMode::Mainnet.session_key(),
            NetworkMode::Testnet.session_key()
        );
    }
}
