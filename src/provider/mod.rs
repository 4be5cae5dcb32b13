//! Wallet provider abstraction
//!
//! Every wallet backend (injected browser wallet, WalletConnect, custodial
//! SDK, ...) implements [`WalletProvider`]. EVM backends share one
//! implementation, [`EvmProvider`], driven through a [`JsonRpcTransport`].
//! Non-EVM families implement the trait directly.

mod evm;
mod factory;
mod transport;

pub use evm::{EvmBackend, EvmProvider};
pub use factory::{EvmProviderFactory, ProviderFactory};
pub use transport::{codes, EventHandler, JsonRpcTransport, RpcError, Subscription};

use crate::account::{AccountKey, Address};
use crate::chain::Chain;
use crate::signature::SignOptions;
use crate::Result;
use alloy::primitives::{Bytes, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Transaction or read-call forwarded to a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sending account; must be connected to the provider
    pub source: Address,
    pub destination: Option<Address>,
    pub value: Option<U256>,
    pub data: Option<Bytes>,
}

impl Transaction {
    pub fn new(source: impl Into<Address>) -> Self {
        Self {
            source: source.into(),
            destination: None,
            value: None,
            data: None,
        }
    }

    pub fn to(mut self, destination: impl Into<Address>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    pub fn data(mut self, data: Bytes) -> Self {
        self.data = Some(data);
        self
    }
}

pub type AccountsChangeHandler = Arc<dyn Fn(Vec<Address>) + Send + Sync>;

/// Receives the new chain, or `Error::UnexpectedChainId` for unmapped ids
pub type ChainChangeHandler = Arc<dyn Fn(Result<Chain>) + Send + Sync>;

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Backend identifier, e.g. "MetaMask" or "WalletConnect"
    fn name(&self) -> &str;

    /// Request account access. Backends without an explicit connect step
    /// succeed without doing anything.
    async fn connect(&self) -> Result<()>;

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }

    /// Accounts currently visible to this backend, tagged with its chain
    async fn get_accounts(&self) -> Result<Vec<AccountKey>>;

    async fn get_balance(&self, address: &Address) -> Result<U256>;

    async fn sign(&self, message: &str, address: &Address, options: SignOptions)
        -> Result<String>;

    async fn sign_typed_data(
        &self,
        message: &str,
        address: &Address,
        options: SignOptions,
    ) -> Result<String>;

    /// Submit a transaction; returns the transaction hash
    async fn transact(&self, transaction: &Transaction) -> Result<String>;

    /// Execute a read-only call
    async fn call(&self, transaction: &Transaction) -> Result<Bytes>;

    fn on_accounts_change(&self, handler: AccountsChangeHandler) -> Subscription;

    fn on_chain_change(&self, handler: ChainChangeHandler) -> Subscription;

    async fn switch_chain(&self, chain: Chain) -> Result<()>;

    /// Currently connected chain, `None` when it cannot be determined
    async fn get_chain(&self) -> Option<Chain>;
}
