//! Marketplace Wallet
//!
//! Multi-chain wallet session layer for a marketplace client:
//! - Tracks the accounts a user has connected and which one is active
//! - Installs wallet provider backends and reconnects them on startup
//! - Routes signing, transactions and chain switches to the provider that
//!   holds the active account
//!
//! # Network mode
//!
//! A wallet runs in either mainnet or testnet mode. Accounts on the other
//! side of the split are never registered, and each mode persists its own
//! session.

pub mod account;
pub mod account_source;
pub mod chain;
pub mod config;
pub mod provider;
pub mod registry;
pub mod session;
pub mod signature;
pub mod wallet;

mod error;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use account::{Account, AccountKey, Address};
pub use chain::Chain;
pub use config::{Config, NetworkMode, RpcConfig};
pub use error::{Error, ErrorKind, Result};
pub use registry::AccountRegistry;
pub use signature::{SignOptions, SignatureStandard};
pub use wallet::{Wallet, WalletEvent};
